//! Common types used across CLI modules

use uuid::Uuid;

/// A run given on the command line: a full UUID or an unambiguous prefix
#[derive(Debug, Clone, PartialEq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    /// Parse as a full UUID first, otherwise keep the input as a prefix
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input.trim()) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            IdOrPrefix::Full(uuid) => Some(*uuid),
            IdOrPrefix::Prefix(_) => None,
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            IdOrPrefix::Full(uuid) => uuid.to_string(),
            IdOrPrefix::Prefix(prefix) => prefix.clone(),
        }
    }
}

impl From<&str> for IdOrPrefix {
    fn from(s: &str) -> Self {
        IdOrPrefix::parse(s)
    }
}
