//! In-memory settings service for unit tests
//!
//! Supports per-call failure switches, call counting, and gates that hold a
//! request open until the test releases it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::types::{Persona, Resource, Settings};

use super::SettingsApi;

/// The three service operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    ListPersonas,
    GetSettings,
    SaveSettings,
}

/// Mock implementation of SettingsApi
pub struct MockSettingsApi {
    personas: RwLock<Vec<Persona>>,
    settings: RwLock<Settings>,
    saved: RwLock<Vec<Settings>>,
    failing: RwLock<HashMap<MockCall, (u16, String)>>,
    gates: RwLock<HashMap<MockCall, Arc<Semaphore>>>,
    call_counts: RwLock<HashMap<MockCall, usize>>,
    saves_in_flight: AtomicUsize,
    max_saves_in_flight: AtomicUsize,
}

impl MockSettingsApi {
    pub fn new(personas: Vec<Persona>, settings: Settings) -> Self {
        Self {
            personas: RwLock::new(personas),
            settings: RwLock::new(settings),
            saved: RwLock::new(Vec::new()),
            failing: RwLock::new(HashMap::new()),
            gates: RwLock::new(HashMap::new()),
            call_counts: RwLock::new(HashMap::new()),
            saves_in_flight: AtomicUsize::new(0),
            max_saves_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make `call` answer with a non-2xx status and message
    pub fn fail(&self, call: MockCall, status: u16, message: &str) {
        self.failing.write().insert(call, (status, message.to_string()));
    }

    /// Stop failing `call`
    pub fn recover(&self, call: MockCall) {
        self.failing.write().remove(&call);
    }

    /// Hold every subsequent `call` open until [`release`](Self::release)
    pub fn hold(&self, call: MockCall) {
        self.gates.write().insert(call, Arc::new(Semaphore::new(0)));
    }

    /// Let held `call`s complete
    pub fn release(&self, call: MockCall) {
        if let Some(gate) = self.gates.write().remove(&call) {
            gate.close();
        }
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        self.call_counts.read().get(&call).copied().unwrap_or(0)
    }

    /// Yield until `call` has been entered at least `n` times
    pub async fn wait_for_calls(&self, call: MockCall, n: usize) {
        while self.call_count(call) < n {
            tokio::task::yield_now().await;
        }
    }

    /// Records accepted by save, oldest first
    pub fn saved(&self) -> Vec<Settings> {
        self.saved.read().clone()
    }

    /// The currently persisted settings
    pub fn stored_settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn set_stored_settings(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    /// Highest number of saves observed in flight at once
    pub fn max_saves_in_flight(&self) -> usize {
        self.max_saves_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: MockCall) {
        *self.call_counts.write().entry(call).or_insert(0) += 1;

        let gate = self.gates.read().get(&call).cloned();
        if let Some(gate) = gate {
            // Closed on release; the error is the release signal
            let _ = gate.acquire().await;
        }
    }

    fn failure(&self, call: MockCall) -> Option<(u16, String)> {
        self.failing.read().get(&call).cloned()
    }
}

#[async_trait]
impl SettingsApi for MockSettingsApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_personas(&self) -> Result<Vec<Persona>> {
        self.enter(MockCall::ListPersonas).await;
        if let Some((status, _)) = self.failure(MockCall::ListPersonas) {
            return Err(Error::ApiStatus {
                url: Resource::Personas.to_string(),
                status,
            });
        }
        Ok(self.personas.read().clone())
    }

    async fn get_settings(&self) -> Result<Settings> {
        self.enter(MockCall::GetSettings).await;
        if let Some((status, _)) = self.failure(MockCall::GetSettings) {
            return Err(Error::ApiStatus {
                url: Resource::Settings.to_string(),
                status,
            });
        }
        Ok(self.settings.read().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let now = self.saves_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_saves_in_flight.fetch_max(now, Ordering::SeqCst);

        self.enter(MockCall::SaveSettings).await;
        self.saves_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((status, message)) = self.failure(MockCall::SaveSettings) {
            return Err(Error::save_failed(Some(status), message));
        }

        *self.settings.write() = settings.clone();
        self.saved.write().push(settings.clone());
        Ok(())
    }
}
