//! Persona rotation policy
//!
//! Every `rotationInterval` minutes the active persona moves to the next
//! persona in deployment order (the order the service lists them in),
//! wrapping around at the end.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::types::{Persona, Settings, ROTATION_INTERVAL_MIN};

/// When rotation happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    interval_minutes: i64,
}

impl RotationPolicy {
    /// Policy for an interval in minutes; values below 1 use 1
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes < ROTATION_INTERVAL_MIN {
            warn!(
                interval_minutes = minutes,
                effective_minutes = ROTATION_INTERVAL_MIN,
                "Rotation interval below minimum"
            );
        }
        Self {
            interval_minutes: minutes.max(ROTATION_INTERVAL_MIN),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_minutes(settings.rotation_interval)
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval_minutes
    }

    /// `None` when the interval does not fit a `Duration`
    pub fn interval(&self) -> Option<Duration> {
        Duration::try_minutes(self.interval_minutes)
    }

    /// When the persona after a rotation at `last_rotation` should switch.
    ///
    /// An interval that runs past the calendar range yields
    /// `DateTime::<Utc>::MAX_UTC`, so rotation is never due.
    pub fn next_due(&self, last_rotation: DateTime<Utc>) -> DateTime<Utc> {
        match self
            .interval()
            .and_then(|interval| last_rotation.checked_add_signed(interval))
        {
            Some(due) => due,
            None => {
                warn!(
                    interval_minutes = self.interval_minutes,
                    "Rotation interval out of range, rotation never due"
                );
                DateTime::<Utc>::MAX_UTC
            }
        }
    }

    pub fn is_due(&self, last_rotation: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= self.next_due(last_rotation)
    }
}

/// The persona that follows `current`.
///
/// A missing or unknown current id starts the cycle at the first persona.
pub fn next_persona<'a>(personas: &'a [Persona], current: Option<&str>) -> Option<&'a Persona> {
    let position = current.and_then(|id| personas.iter().position(|p| p.id == id));
    match position {
        Some(i) => personas.get((i + 1) % personas.len()),
        None => personas.first(),
    }
}

/// How `selectedPersonaId` relates to the personas flagged active
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consistency {
    Consistent,
    /// No persona carries the active flag
    NoActivePersona,
    /// More than one persona carries the active flag
    MultipleActive(Vec<String>),
    /// Exactly one active persona, but not the selected one
    Mismatch { selected: Option<String>, active: String },
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consistency::Consistent => write!(f, "consistent"),
            Consistency::NoActivePersona => write!(f, "no persona is active"),
            Consistency::MultipleActive(ids) => write!(f, "several personas are active: {}", ids.join(", ")),
            Consistency::Mismatch { selected, active } => write!(
                f,
                "selected persona {} differs from active persona {}",
                selected.as_deref().unwrap_or("(none)"),
                active
            ),
        }
    }
}

/// Compare the selected persona with the active flags
pub fn check_consistency(personas: &[Persona], settings: &Settings) -> Consistency {
    let active: Vec<&Persona> = personas.iter().filter(|p| p.is_active).collect();
    match active.as_slice() {
        [] => Consistency::NoActivePersona,
        [only] => {
            if settings.selected_persona_id.as_deref() == Some(only.id.as_str()) {
                Consistency::Consistent
            } else {
                Consistency::Mismatch {
                    selected: settings.selected_persona_id.clone(),
                    active: only.id.clone(),
                }
            }
        }
        many => Consistency::MultipleActive(many.iter().map(|p| p.id.clone()).collect()),
    }
}
