//! Settings service trait definitions

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Persona, Settings};

/// Contract consumed from the settings/persona storage service.
///
/// Implementations report transport and status failures as errors and
/// leave it to the caller to classify them as load or save failures.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Fetch all personas in server order
    async fn list_personas(&self) -> Result<Vec<Persona>>;

    /// Fetch the settings singleton
    async fn get_settings(&self) -> Result<Settings>;

    /// Replace the settings singleton with `settings`
    async fn save_settings(&self, settings: &Settings) -> Result<()>;
}
