//! Gauntlet Core
//!
//! Core types shared by the Gauntlet orchestrator, client and CLI.
//!
//! This crate contains:
//! - Domain types: run requests, run records, log entries, technique grades
//! - DTOs: response bodies exchanged over the orchestrator HTTP API

pub mod domain;
pub mod dto;
