//! The settings singleton
//!
//! One record per deployment. It is read whole and written whole: there is
//! no partial update and no revision token, so the last save wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::is_known_model;

// ─────────────────────────────────────────────────────────────────
// Defaults and Ranges
// ─────────────────────────────────────────────────────────────────

/// Id the client seeds the editable copy with before anything loads
pub const DEFAULT_SETTINGS_ID: &str = "1";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: i64 = 1000;
/// Minutes between persona switches
pub const DEFAULT_ROTATION_INTERVAL: i64 = 360;
pub const DEFAULT_MODEL_NAME: &str = "gpt-4-0125-preview";

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 2.0;
pub const TEMPERATURE_STEP: f64 = 0.1;
pub const MAX_TOKENS_MIN: i64 = 1;
pub const MAX_TOKENS_MAX: i64 = 4000;
pub const ROTATION_INTERVAL_MIN: i64 = 1;

// ─────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────

/// Model and persona configuration for the deployment.
///
/// `max_tokens` and `rotation_interval` are signed so that values produced
/// by the editor's parse fallbacks (a `0` token limit, a negative interval
/// typed by the operator) survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub temperature: f64,
    pub max_tokens: i64,
    pub rotation_interval: i64,
    pub selected_persona_id: Option<String>,
    pub model_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: DEFAULT_SETTINGS_ID.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            selected_persona_id: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Every field whose value lies outside its declared range.
    ///
    /// Nothing is corrected here; callers decide whether to warn or block.
    pub fn policy_violations(&self) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();

        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.temperature) {
            violations.push(PolicyViolation::TemperatureOutOfRange(self.temperature));
        }
        if !(MAX_TOKENS_MIN..=MAX_TOKENS_MAX).contains(&self.max_tokens) {
            violations.push(PolicyViolation::MaxTokensOutOfRange(self.max_tokens));
        }
        if self.rotation_interval < ROTATION_INTERVAL_MIN {
            violations.push(PolicyViolation::RotationIntervalTooShort(self.rotation_interval));
        }
        if !is_known_model(&self.model_name) {
            violations.push(PolicyViolation::UnknownModel(self.model_name.clone()));
        }

        violations
    }
}

/// A settings field outside its declared range
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyViolation {
    TemperatureOutOfRange(f64),
    MaxTokensOutOfRange(i64),
    RotationIntervalTooShort(i64),
    UnknownModel(String),
}

impl PolicyViolation {
    /// Wire name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            PolicyViolation::TemperatureOutOfRange(_) => "temperature",
            PolicyViolation::MaxTokensOutOfRange(_) => "maxTokens",
            PolicyViolation::RotationIntervalTooShort(_) => "rotationInterval",
            PolicyViolation::UnknownModel(_) => "modelName",
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyViolation::TemperatureOutOfRange(v) => write!(
                f,
                "temperature {} outside [{}, {}]",
                v, TEMPERATURE_MIN, TEMPERATURE_MAX
            ),
            PolicyViolation::MaxTokensOutOfRange(v) => write!(
                f,
                "maxTokens {} outside [{}, {}]",
                v, MAX_TOKENS_MIN, MAX_TOKENS_MAX
            ),
            PolicyViolation::RotationIntervalTooShort(v) => write!(
                f,
                "rotationInterval {} below minimum {}",
                v, ROTATION_INTERVAL_MIN
            ),
            PolicyViolation::UnknownModel(name) => write!(f, "modelName '{}' is not in the catalog", name),
        }
    }
}
