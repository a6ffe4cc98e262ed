//! Plain-text view of the settings form, as printed by `show`.

use std::fmt::Write;

use crate::types::{find_model, MAX_TOKENS_MAX, MAX_TOKENS_MIN, MODEL_CATALOG};

use super::FormState;

/// Label above the temperature slider, e.g. `Temperature (1.3)`
pub fn temperature_label(temperature: f64) -> String {
    format!("Temperature ({})", temperature)
}

/// Text of the submit button
pub fn save_button_label(saving: bool) -> &'static str {
    if saving {
        "Saving..."
    } else {
        "Save Changes"
    }
}

/// Render the whole form
pub fn render(state: &FormState) -> String {
    let mut out = String::new();

    if state.is_loading() {
        let _ = writeln!(out, "Loading settings...");
        let _ = writeln!(out, "  personas: {:?}", state.personas_state);
        let _ = writeln!(out, "  settings: {:?}", state.settings_state);
        return out;
    }

    let settings = &state.settings;
    let selected = settings.selected_persona_id.as_deref().unwrap_or("");

    let _ = writeln!(out, "Persona Settings");
    let _ = writeln!(out, "  Active Persona");
    if state.personas.is_empty() {
        let _ = writeln!(out, "    (no personas)");
    }
    for persona in &state.personas {
        let marker = if persona.id == selected { "(*)" } else { "( )" };
        let _ = writeln!(out, "    {} {} [{}]", marker, persona.name, persona.id);
    }
    if selected.is_empty() {
        let _ = writeln!(out, "    Select a persona");
    }
    let _ = writeln!(out, "  Rotation Interval (minutes): {}", settings.rotation_interval);
    let _ = writeln!(out);

    let model_label = find_model(&settings.model_name)
        .map(|m| m.name)
        .unwrap_or(settings.model_name.as_str());

    let _ = writeln!(out, "Model Settings");
    let _ = writeln!(out, "  Model: {} [{}]", model_label, settings.model_name);
    let _ = writeln!(out, "  {}", temperature_label(settings.temperature));
    let _ = writeln!(
        out,
        "  Max Tokens: {} (allowed {}-{})",
        settings.max_tokens, MAX_TOKENS_MIN, MAX_TOKENS_MAX
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[{}]", save_button_label(state.saving));

    out
}

/// Render the model catalog with the current model marked
pub fn render_models(current: Option<&str>) -> String {
    let mut out = String::new();
    for model in MODEL_CATALOG {
        let marker = if Some(model.id) == current { "*" } else { " " };
        let _ = writeln!(out, "{} {:<20} {}", marker, model.id, model.name);
    }
    out
}
