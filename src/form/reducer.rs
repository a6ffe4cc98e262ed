//! Editable settings reducer
//!
//! Pure per-field updates over the editable copy. Each edit writes exactly
//! one field, so edits to different fields commute.
//!
//! Integer inputs are parsed leniently (leading integer, rest ignored) and
//! fall back to a fixed value when no number can be read:
//! - rotation interval falls back to 360 minutes, and so does a parsed 0
//! - max tokens falls back to 0, below the declared minimum of 1

use crate::types::{
    Settings, DEFAULT_ROTATION_INTERVAL, TEMPERATURE_MAX, TEMPERATURE_MIN, TEMPERATURE_STEP,
};

/// Value used when the max tokens input holds no number
const MAX_TOKENS_FALLBACK: i64 = 0;

/// One field change coming from the editor
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Persona selector; the id is trusted to come from the loaded list
    ActivePersona(String),
    /// Raw text of the rotation interval input
    RotationInterval(String),
    /// Model selector; one of the catalog ids
    ModelName(String),
    /// Slider value, already on the slider grid
    Temperature(f64),
    /// Raw text of the max tokens input
    MaxTokens(String),
}

impl FieldEdit {
    /// Wire name of the field this edit writes
    pub fn field(&self) -> &'static str {
        match self {
            FieldEdit::ActivePersona(_) => "selectedPersonaId",
            FieldEdit::RotationInterval(_) => "rotationInterval",
            FieldEdit::ModelName(_) => "modelName",
            FieldEdit::Temperature(_) => "temperature",
            FieldEdit::MaxTokens(_) => "maxTokens",
        }
    }
}

/// Apply one edit, returning the new editable copy
pub fn reduce(settings: &Settings, edit: FieldEdit) -> Settings {
    let mut next = settings.clone();
    match edit {
        FieldEdit::ActivePersona(id) => next.selected_persona_id = Some(id),
        FieldEdit::RotationInterval(raw) => next.rotation_interval = parse_rotation_interval(&raw),
        FieldEdit::ModelName(id) => next.model_name = id,
        FieldEdit::Temperature(value) => next.temperature = value,
        FieldEdit::MaxTokens(raw) => next.max_tokens = parse_max_tokens(&raw),
    }
    next
}

/// Rotation interval minutes from raw input; no number or 0 gives 360
fn parse_rotation_interval(raw: &str) -> i64 {
    match parse_leading_int(raw) {
        Some(n) if n != 0 => n,
        _ => DEFAULT_ROTATION_INTERVAL,
    }
}

/// Max tokens from raw input; no number gives 0
fn parse_max_tokens(raw: &str) -> i64 {
    parse_leading_int(raw).unwrap_or(MAX_TOKENS_FALLBACK)
}

/// Read the integer at the start of `raw`.
///
/// Leading whitespace and one sign are accepted, then the longest run of
/// ASCII digits; anything after it is ignored. Values beyond `i64` saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let value = match digits.parse::<i64>() {
        Ok(v) => v,
        Err(_) => i64::MAX,
    };

    Some(if negative { -value } else { value })
}

// ─────────────────────────────────────────────────────────────────
// Temperature Slider
// ─────────────────────────────────────────────────────────────────

/// The bounded input surface for temperature: 0 to 2 in steps of 0.1.
///
/// The reducer trusts whatever the slider hands it; snapping happens here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSlider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for TemperatureSlider {
    fn default() -> Self {
        Self {
            min: TEMPERATURE_MIN,
            max: TEMPERATURE_MAX,
            step: TEMPERATURE_STEP,
        }
    }
}

impl TemperatureSlider {
    /// Clamp into range and round to the nearest step; NaN goes to `min`
    pub fn snap(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return self.min;
        }
        let clamped = raw.clamp(self.min, self.max);
        let steps_per_unit = (1.0 / self.step).round();
        (clamped * steps_per_unit).round() / steps_per_unit
    }

    /// Edit for the slider moved to `raw`
    pub fn edit(&self, raw: f64) -> FieldEdit {
        FieldEdit::Temperature(self.snap(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_interval_non_numeric_resets_to_default() {
        let settings = Settings {
            rotation_interval: 45,
            ..Default::default()
        };
        let next = reduce(&settings, FieldEdit::RotationInterval("abc".to_string()));
        assert_eq!(next.rotation_interval, 360);
    }

    #[test]
    fn test_rotation_interval_zero_resets_to_default() {
        let next = reduce(&Settings::default(), FieldEdit::RotationInterval("0".to_string()));
        assert_eq!(next.rotation_interval, 360);
    }

    #[test]
    fn test_rotation_interval_parses_leading_integer() {
        assert_eq!(parse_rotation_interval("90"), 90);
        assert_eq!(parse_rotation_interval("  15min"), 15);
        assert_eq!(parse_rotation_interval("7.9"), 7);
        assert_eq!(parse_rotation_interval("-5"), -5);
    }

    #[test]
    fn test_max_tokens_empty_resets_to_zero() {
        let next = reduce(&Settings::default(), FieldEdit::MaxTokens(String::new()));
        assert_eq!(next.max_tokens, 0);
    }

    #[test]
    fn test_max_tokens_non_numeric_is_not_raised_to_minimum() {
        let next = reduce(&Settings::default(), FieldEdit::MaxTokens("lots".to_string()));
        assert_eq!(next.max_tokens, 0);
        assert!(!next.policy_violations().is_empty());
    }

    #[test]
    fn test_max_tokens_parses() {
        assert_eq!(parse_max_tokens("2048"), 2048);
        assert_eq!(parse_max_tokens("0"), 0);
        assert_eq!(parse_max_tokens("+12"), 12);
    }

    #[test]
    fn test_leading_int_edge_cases() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("abc12"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_persona_and_model_replace() {
        let settings = Settings::default();
        let next = reduce(&settings, FieldEdit::ActivePersona("p9".to_string()));
        assert_eq!(next.selected_persona_id.as_deref(), Some("p9"));

        let next = reduce(&next, FieldEdit::ModelName("gpt-4o".to_string()));
        assert_eq!(next.model_name, "gpt-4o");
    }

    #[test]
    fn test_each_edit_touches_only_its_field() {
        let base = Settings::default();
        let edits = vec![
            FieldEdit::ActivePersona("p1".to_string()),
            FieldEdit::RotationInterval("30".to_string()),
            FieldEdit::ModelName("gpt-4".to_string()),
            FieldEdit::Temperature(1.5),
            FieldEdit::MaxTokens("500".to_string()),
        ];

        for edit in edits {
            let field = edit.field();
            let next = reduce(&base, edit);
            let before = serde_json::to_value(&base).unwrap();
            let after = serde_json::to_value(&next).unwrap();
            for (key, value) in before.as_object().unwrap() {
                if key != field {
                    assert_eq!(&after[key], value, "{} changed by {} edit", key, field);
                }
            }
        }
    }

    #[test]
    fn test_edits_commute() {
        let a = FieldEdit::Temperature(0.3);
        let b = FieldEdit::MaxTokens("64".to_string());
        let base = Settings::default();

        let ab = reduce(&reduce(&base, a.clone()), b.clone());
        let ba = reduce(&reduce(&base, b), a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_slider_snaps_to_grid() {
        let slider = TemperatureSlider::default();
        assert_eq!(slider.snap(1.3), 1.3);
        assert_eq!(slider.snap(1.26), 1.3);
        assert_eq!(slider.snap(-1.0), 0.0);
        assert_eq!(slider.snap(7.0), 2.0);
        assert_eq!(slider.edit(0.74), FieldEdit::Temperature(0.7));
    }

    #[test]
    fn test_slider_keeps_temperature_numeric() {
        let slider = TemperatureSlider::default();
        assert_eq!(slider.snap(f64::NAN), 0.0);
        assert_eq!(slider.snap(f64::INFINITY), 2.0);
        assert_eq!(slider.snap(f64::NEG_INFINITY), 0.0);

        let next = reduce(&Settings::default(), slider.edit(f64::NAN));
        let body = serde_json::to_value(&next).unwrap();
        assert_eq!(body["temperature"].as_f64(), Some(0.0));

        let back: Settings = serde_json::from_value(body).unwrap();
        assert_eq!(back, next);
    }
}
