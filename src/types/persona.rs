//! Persona records as served by the settings service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named system prompt the assistant can operate under.
///
/// Read-only from this crate's point of view, except that the rotation
/// scheduler decides which persona should carry `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub is_active: bool,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system_prompt: String::new(),
            is_active: false,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Find a persona by id, preserving server order semantics
pub fn find_persona<'a>(personas: &'a [Persona], id: &str) -> Option<&'a Persona> {
    personas.iter().find(|p| p.id == id)
}
