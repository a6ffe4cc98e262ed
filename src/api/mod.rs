//! Settings service client
//!
//! The settings core talks to the storage service through the
//! [`SettingsApi`] trait:
//! - `HttpSettingsApi` speaks the JSON-over-HTTP contract
//! - `MockSettingsApi` (tests only) keeps everything in memory

mod traits;
mod http;
#[cfg(test)]
mod mock;

pub use traits::*;
pub use http::{HttpApiConfig, HttpSettingsApi};
#[cfg(test)]
pub use mock::{MockCall, MockSettingsApi};
