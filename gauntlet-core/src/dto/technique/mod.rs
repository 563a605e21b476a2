//! Technique-task catalog DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Technique tasks the agent can be asked to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueCatalog {
    pub available: Vec<String>,
    pub descriptions: BTreeMap<String, String>,
}
