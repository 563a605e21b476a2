//! Data Transfer Objects for the orchestrator API
//!
//! Response bodies that are derived from run records rather than stored.

pub mod artifact;
pub mod run;
pub mod technique;
