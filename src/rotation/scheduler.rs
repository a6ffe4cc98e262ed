//! Rotation scheduler
//!
//! Wakes up every tick, reloads personas and settings, and moves
//! `selectedPersonaId` to the next persona once the rotation interval has
//! elapsed since the last rotation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::api::SettingsApi;
use crate::error::{Error, Result};
use crate::types::{Persona, Settings};

use super::policy::{check_consistency, next_persona, Consistency, RotationPolicy};

/// Scheduler timing
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the schedule is checked
    pub tick: Duration,

    /// Retry budget for a failing load; never longer than one tick
    pub retry_max_elapsed: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(60),
            retry_max_elapsed: Duration::from_secs(30),
        }
    }
}

/// What one scheduler step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Interval not elapsed yet
    NotDue { next_due: DateTime<Utc> },

    /// `selectedPersonaId` moved and was saved
    Rotated { from: Option<String>, to: String },

    /// Due, but the successor is the current persona
    Unchanged { persona_id: String },
}

pub struct RotationScheduler {
    api: Arc<dyn SettingsApi>,
    config: SchedulerConfig,
    last_rotation: DateTime<Utc>,
}

impl RotationScheduler {
    /// The rotation clock starts now
    pub fn new(api: Arc<dyn SettingsApi>, config: SchedulerConfig) -> Self {
        Self::starting_at(api, config, Utc::now())
    }

    pub fn starting_at(api: Arc<dyn SettingsApi>, config: SchedulerConfig, start: DateTime<Utc>) -> Self {
        Self {
            api,
            config,
            last_rotation: start,
        }
    }

    pub fn last_rotation(&self) -> DateTime<Utc> {
        self.last_rotation
    }

    /// Check the schedule as of `now` and rotate if due
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let (personas, settings) = self.load_with_retry().await?;
        self.report_consistency(&personas, &settings);

        let policy = RotationPolicy::from_settings(&settings);
        if !policy.is_due(self.last_rotation, now) {
            let next_due = policy.next_due(self.last_rotation);
            debug!(
                interval_minutes = policy.interval_minutes(),
                next_due = %next_due,
                "Rotation not due"
            );
            return Ok(TickOutcome::NotDue { next_due });
        }

        self.rotate(&personas, settings, now).await
    }

    /// Rotate immediately, ignoring the interval
    pub async fn rotate_now(&mut self) -> Result<TickOutcome> {
        let (personas, settings) = self.load_with_retry().await?;
        self.report_consistency(&personas, &settings);
        self.rotate(&personas, settings, Utc::now()).await
    }

    /// Tick until `shutdown` resolves or Ctrl+C is pressed.
    ///
    /// A failing tick is logged and the loop carries on.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut timer = tokio::time::interval(self.config.tick);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tokio::pin!(shutdown);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        info!(
            api = self.api.name(),
            tick_secs = self.config.tick.as_secs(),
            "Rotation scheduler started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = &mut ctrl_c => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = timer.tick() => {
                    match self.tick_at(Utc::now()).await {
                        Ok(TickOutcome::Rotated { from, to }) => {
                            info!(from = ?from, to = %to, "Persona rotated");
                        }
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => {
                            error!(error = %e.format_for_log(), "Rotation scheduler cannot continue");
                            break;
                        }
                        Err(e) => {
                            error!(error = %e.format_for_log(), "Rotation tick failed");
                        }
                    }
                }
            }
        }

        info!("Rotation scheduler stopped");
    }

    async fn rotate(
        &mut self,
        personas: &[Persona],
        settings: Settings,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome> {
        let next = next_persona(personas, settings.selected_persona_id.as_deref())
            .ok_or(Error::NoPersonas)?;

        if settings.selected_persona_id.as_deref() == Some(next.id.as_str()) {
            debug!(persona_id = %next.id, "Only one persona, nothing to rotate");
            self.last_rotation = now;
            return Ok(TickOutcome::Unchanged {
                persona_id: next.id.clone(),
            });
        }

        let from = settings.selected_persona_id.clone();
        let to = next.id.clone();
        let record = Settings {
            selected_persona_id: Some(to.clone()),
            ..settings
        };

        self.api.save_settings(&record).await?;
        self.last_rotation = now;

        Ok(TickOutcome::Rotated { from, to })
    }

    async fn load_with_retry(&self) -> Result<(Vec<Persona>, Settings)> {
        let budget = self.config.retry_max_elapsed.min(self.config.tick);
        let policy = ExponentialBackoff {
            initial_interval: (budget / 10).min(Duration::from_millis(500)),
            max_interval: budget,
            max_elapsed_time: Some(budget),
            ..Default::default()
        };

        let api = &self.api;
        backoff::future::retry(policy, || async move {
            tokio::try_join!(api.list_personas(), api.get_settings()).map_err(|e| {
                if e.is_retryable() {
                    warn!(error = %e, "Rotation load failed, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    fn report_consistency(&self, personas: &[Persona], settings: &Settings) {
        match check_consistency(personas, settings) {
            Consistency::Consistent => {}
            other => warn!(
                selected = ?settings.selected_persona_id,
                "Persona state inconsistent: {}",
                other
            ),
        }
    }
}
