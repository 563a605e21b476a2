//! Scheduler layer for the orchestrator
//!
//! Hands accepted runs to background workers and owns the worker boundary:
//! whatever a pipeline returns or panics with ends up as a status transition.

pub mod dispatcher;

pub use dispatcher::RunScheduler;
