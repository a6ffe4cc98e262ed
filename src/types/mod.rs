//! Type definitions for persona-settings
//!
//! The wire records exchanged with the settings service (personas and the
//! settings singleton) and the model catalog the model selector offers.

mod model;
mod persona;
mod settings;

pub use model::*;
pub use persona::*;
pub use settings::*;

use std::fmt;

/// The two resources the settings form fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Personas,
    Settings,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Personas => write!(f, "personas"),
            Resource::Settings => write!(f, "settings"),
        }
    }
}
