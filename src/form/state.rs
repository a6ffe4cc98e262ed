//! Form state
//!
//! Readiness is tracked per resource; the coarse loading flag the view
//! gates on is derived from both.

use crate::types::{Persona, Resource, Settings};

/// Readiness of one fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Request outstanding, or never issued
    Loading,
    /// Last request succeeded and was applied
    Ready,
    /// Last request failed; stays not-ready until a later load succeeds
    Failed,
}

impl Default for ResourceState {
    fn default() -> Self {
        ResourceState::Loading
    }
}

/// Everything the settings form holds
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Editable copy, always a complete record
    pub settings: Settings,

    /// Personas in server order
    pub personas: Vec<Persona>,

    pub personas_state: ResourceState,
    pub settings_state: ResourceState,

    /// A save request is outstanding
    pub saving: bool,

    /// The owner is gone; results arriving now are dropped
    pub torn_down: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            personas: Vec::new(),
            personas_state: ResourceState::Loading,
            settings_state: ResourceState::Loading,
            saving: false,
            torn_down: false,
        }
    }
}

impl FormState {
    pub(crate) fn set_resource_state(&mut self, resource: Resource, state: ResourceState) {
        match resource {
            Resource::Personas => self.personas_state = state,
            Resource::Settings => self.settings_state = state,
        }
    }

    /// True until both resources are ready
    pub fn is_loading(&self) -> bool {
        self.personas_state != ResourceState::Ready || self.settings_state != ResourceState::Ready
    }

    /// Whether the submit action is enabled
    pub fn can_save(&self) -> bool {
        !self.torn_down && !self.is_loading() && !self.saving
    }
}
