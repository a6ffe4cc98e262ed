//! Settings form
//!
//! Owns the editable copy of the settings singleton and the persona list:
//! - `load` fetches both resources concurrently and applies each on arrival
//! - `edit` runs one reducer step over the editable copy
//! - `save` submits the whole editable copy, one request at a time
//!
//! Ordering rule: a settings fetch that completes always replaces the
//! editable copy, whatever was edited locally since the last load.

mod events;
mod reducer;
mod state;
pub mod view;

pub use events::{FormEvent, Notification};
pub use reducer::{reduce, FieldEdit, TemperatureSlider};
pub use state::{FormState, ResourceState};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::SettingsApi;
use crate::error::{Error, Result};
use crate::types::{Persona, Resource, Settings};

/// Settings form bound to one settings service
pub struct SettingsForm {
    api: Arc<dyn SettingsApi>,
    state: Mutex<FormState>,
    event_tx: mpsc::UnboundedSender<FormEvent>,
}

impl SettingsForm {
    /// Create a form seeded with default settings, in the loading state
    pub fn new(api: Arc<dyn SettingsApi>) -> (Self, mpsc::UnboundedReceiver<FormEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let form = Self {
            api,
            state: Mutex::new(FormState::default()),
            event_tx,
        };
        (form, event_rx)
    }

    // ─────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────

    /// Fetch personas and settings concurrently.
    ///
    /// Each result is applied as soon as its own request completes. On
    /// failure the failed resource stays not-ready, so the form stays in
    /// the loading state until a later `load` succeeds.
    pub async fn load(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.torn_down {
                return Ok(());
            }
            state.personas_state = ResourceState::Loading;
            state.settings_state = ResourceState::Loading;
        }
        debug!(api = self.api.name(), "Loading personas and settings");

        let personas = async {
            let result = self.api.list_personas().await;
            self.complete_personas(result)
        };
        let settings = async {
            let result = self.api.get_settings().await;
            self.complete_settings(result)
        };

        let (personas, settings) = tokio::join!(personas, settings);
        personas.and(settings)
    }

    fn complete_personas(&self, result: Result<Vec<Persona>>) -> Result<()> {
        let mut state = self.state.lock();
        if state.torn_down {
            debug!("Discarding personas that arrived after teardown");
            return Ok(());
        }

        match result {
            Ok(personas) => {
                debug!(count = personas.len(), "Personas applied");
                state.personas = personas;
                state.set_resource_state(Resource::Personas, ResourceState::Ready);
                self.emit(FormEvent::Loaded(Resource::Personas));
                Ok(())
            }
            Err(e) => Err(self.fail_resource(&mut state, Resource::Personas, e)),
        }
    }

    fn complete_settings(&self, result: Result<Settings>) -> Result<()> {
        let mut state = self.state.lock();
        if state.torn_down {
            debug!("Discarding settings that arrived after teardown");
            return Ok(());
        }

        match result {
            Ok(settings) => {
                if state.settings != settings {
                    debug!("Fetched settings replace the editable copy");
                }
                state.settings = settings;
                state.set_resource_state(Resource::Settings, ResourceState::Ready);
                self.emit(FormEvent::Loaded(Resource::Settings));
                Ok(())
            }
            Err(e) => Err(self.fail_resource(&mut state, Resource::Settings, e)),
        }
    }

    fn fail_resource(&self, state: &mut FormState, resource: Resource, e: Error) -> Error {
        warn!(resource = %resource, error = %e, "Fetch failed");
        state.set_resource_state(resource, ResourceState::Failed);
        let message = e.to_string();
        self.emit(FormEvent::LoadFailed {
            resource,
            message: message.clone(),
        });
        Error::load_failed(resource, message)
    }

    // ─────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────

    /// Apply one field edit to the editable copy.
    ///
    /// Rejected while loading or after teardown; the form is
    /// non-interactive then.
    pub fn edit(&self, edit: FieldEdit) -> Result<()> {
        let mut state = self.state.lock();
        if state.torn_down || state.is_loading() {
            return Err(Error::FormNotReady);
        }

        debug!(field = edit.field(), "Field edited");
        state.settings = reduce(&state.settings, edit);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────

    /// Submit the whole editable copy as the new canonical settings.
    ///
    /// The editable copy is never modified by a save, whether it succeeds
    /// or fails. Only one save may be outstanding.
    pub async fn save(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock();
            if state.torn_down || state.is_loading() {
                return Err(Error::FormNotReady);
            }
            if state.saving {
                return Err(Error::SaveInFlight);
            }
            state.saving = true;
            state.settings.clone()
        };
        let _saving = SavingGuard { state: &self.state };

        for violation in snapshot.policy_violations() {
            warn!(field = violation.field(), "Saving out-of-policy value: {}", violation);
        }

        let result = self.api.save_settings(&snapshot).await;
        let torn_down = self.state.lock().torn_down;

        match result {
            Ok(()) => {
                info!(
                    persona_id = ?snapshot.selected_persona_id,
                    model = %snapshot.model_name,
                    rotation_interval = snapshot.rotation_interval,
                    "Settings saved"
                );
                if !torn_down {
                    self.emit(FormEvent::Notify(Notification::settings_saved()));
                }
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    Error::SaveFailed { .. } => e,
                    other => Error::save_failed(None, other.to_string()),
                };
                error!(error = %e.format_for_log(), "Failed to save settings");
                if !torn_down {
                    self.emit(FormEvent::Notify(Notification::save_failed()));
                }
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Lifecycle and Accessors
    // ─────────────────────────────────────────────────────────────

    /// Detach the owner; later completions are discarded
    pub fn teardown(&self) {
        self.state.lock().torn_down = true;
        debug!("Settings form torn down");
    }

    /// Copy of the full form state
    pub fn snapshot(&self) -> FormState {
        self.state.lock().clone()
    }

    /// Current editable copy
    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    pub fn personas(&self) -> Vec<Persona> {
        self.state.lock().personas.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    pub fn can_save(&self) -> bool {
        self.state.lock().can_save()
    }

    fn emit(&self, event: FormEvent) {
        // Receiver gone means nobody is listening; that is fine
        let _ = self.event_tx.send(event);
    }
}

/// Clears the saving flag however `save` exits
struct SavingGuard<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().saving = false;
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
