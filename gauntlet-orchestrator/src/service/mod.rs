//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the API handlers and the run store.

pub mod artifact;
pub mod competition;
pub mod file;
pub mod run;

// Re-export for convenience
pub use competition as competition_service;
pub use file as file_service;
pub use run as run_service;
