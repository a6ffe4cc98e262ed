//! Events emitted by the settings form
//!
//! Delivery (toasts, terminal output) belongs to whoever holds the
//! receiving end of the channel.

use std::fmt;

use crate::types::Resource;

/// Visual weight of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
}

impl Notification {
    /// Emitted after the service accepted a save
    pub fn settings_saved() -> Self {
        Self {
            variant: NotificationVariant::Default,
            title: "Settings saved".to_string(),
            description: "Your settings have been updated successfully.".to_string(),
        }
    }

    /// Emitted after a rejected or undelivered save.
    ///
    /// Deliberately generic; the service's message goes to the log.
    pub fn save_failed() -> Self {
        Self {
            variant: NotificationVariant::Destructive,
            title: "Error saving settings".to_string(),
            description: "There was a problem saving your settings. Please try again.".to_string(),
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Everything the form reports to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A resource arrived and was applied
    Loaded(Resource),

    /// A resource fetch failed; the form stays loading
    LoadFailed { resource: Resource, message: String },

    /// Notification to show the user
    Notify(Notification),
}
