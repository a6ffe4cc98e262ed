//! Common test utilities
//!
//! An in-process settings service on axum. It runs on its own thread and
//! runtime so blocking `assert_cmd` tests can talk to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock service holds
#[derive(Debug, Clone)]
struct ServiceState {
    personas: Value,
    settings: Value,
    saves: Vec<Value>,
    fail_saves: bool,
    fail_reads: bool,
}

type Shared = Arc<RwLock<ServiceState>>;

/// Mock settings service for CLI tests
pub struct MockSettingsServer {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockSettingsServer {
    /// Start a service seeded with three personas and a full settings record
    pub fn start() -> Self {
        Self::start_with(default_personas(), default_settings())
    }

    pub fn start_with(personas: Value, settings: Value) -> Self {
        let state: Shared = Arc::new(RwLock::new(ServiceState {
            personas,
            settings,
            saves: Vec::new(),
            fail_saves: false,
            fail_reads: false,
        }));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/api/personas", get(list_personas))
            .route("/api/settings", get(get_settings).post(save_settings))
            .with_state(state.clone());

        let handle = thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Base URL for `PERSONA_SETTINGS_API_URL`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Reject every save with a 500 and a message body
    pub fn fail_saves(&self) {
        self.state.write().fail_saves = true;
    }

    /// Answer every read with a 503
    pub fn fail_reads(&self) {
        self.state.write().fail_reads = true;
    }

    /// Bodies accepted by save, oldest first
    pub fn saves(&self) -> Vec<Value> {
        self.state.read().saves.clone()
    }

    pub fn settings(&self) -> Value {
        self.state.read().settings.clone()
    }
}

impl Drop for MockSettingsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn default_personas() -> Value {
    json!([
        { "id": "p1", "name": "Analyst", "systemPrompt": "You analyse.", "isActive": true },
        { "id": "p2", "name": "Coder", "systemPrompt": "You write code.", "isActive": false },
        { "id": "p3", "name": "Tester", "systemPrompt": "You test.", "isActive": false }
    ])
}

pub fn default_settings() -> Value {
    json!({
        "id": "1",
        "temperature": 0.7,
        "maxTokens": 1000,
        "rotationInterval": 360,
        "selectedPersonaId": "p1",
        "modelName": "gpt-4-0125-preview"
    })
}

async fn list_personas(State(state): State<Shared>) -> (StatusCode, Json<Value>) {
    let state = state.read();
    if state.fail_reads {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "down" })));
    }
    (StatusCode::OK, Json(state.personas.clone()))
}

async fn get_settings(State(state): State<Shared>) -> (StatusCode, Json<Value>) {
    let state = state.read();
    if state.fail_reads {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "down" })));
    }
    (StatusCode::OK, Json(state.settings.clone()))
}

async fn save_settings(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut state = state.write();
    if state.fail_saves {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database unavailable" })),
        );
    }
    state.settings = body.clone();
    state.saves.push(body.clone());
    (StatusCode::OK, Json(body))
}
