//! Core domain types
//!
//! These types are owned by the orchestrator (which mutates run records) and
//! read by the client and CLI (which only ever observe snapshots).

pub mod grade;
pub mod log;
pub mod run;
