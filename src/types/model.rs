//! Model catalog
//!
//! The closed set of model identifiers the model selector offers. The
//! settings service may still hand back a name outside this set; that is
//! reported by [`Settings::policy_violations`](super::Settings::policy_violations)
//! rather than rejected at deserialization.

/// One entry of the model selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    /// Identifier persisted in `Settings.modelName`
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
}

/// Models offered by the selector, in display order
pub const MODEL_CATALOG: &[ModelOption] = &[
    ModelOption { id: "gpt-4-0125-preview", name: "GPT-4 Turbo" },
    ModelOption { id: "gpt-4", name: "GPT-4" },
    ModelOption { id: "gpt-3.5-turbo", name: "GPT-3.5 Turbo" },
    ModelOption { id: "gpt-4o", name: "GPT-4o" },
    ModelOption { id: "gpt-4o-mini", name: "GPT-4o Mini" },
];

/// Look up a catalog entry by id
pub fn find_model(id: &str) -> Option<&'static ModelOption> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}

/// Whether `id` is one of the catalog models
pub fn is_known_model(id: &str) -> bool {
    find_model(id).is_some()
}

/// Catalog ids, for CLI value validation
pub fn model_ids() -> Vec<&'static str> {
    MODEL_CATALOG.iter().map(|m| m.id).collect()
}
