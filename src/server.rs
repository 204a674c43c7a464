// http server mode - run safechat as an api

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::Error;
use crate::core::{Entry, FailureKind, HuggingFace, Ledger, Ollama, Outcome, Pipeline};

struct AppState {
    pipeline: Pipeline<HuggingFace, Ollama>,
    // one ledger behind one lock keeps record/reset/export atomic when
    // requests land concurrently
    ledger: Mutex<Ledger>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    pub async fn run(
        pipeline: Pipeline<HuggingFace, Ollama>,
        host: &str,
        port: u16,
    ) -> Result<(), Error> {
        let state = Arc::new(AppState {
            pipeline,
            ledger: Mutex::new(Ledger::new()),
        });

        let app = Router::new()
            .route("/health", get(health))
            .route("/chat", post(chat))
            .route("/history", get(history))
            .route("/stats", get(stats))
            .route("/reset", post(reset))
            .layer(CorsLayer::permissive())
            .with_state(state);

        let addr = format!("{host}:{port}");
        println!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<Outcome>) {
    let outcome = state.pipeline.process(&req.message).await;
    state
        .ledger
        .lock()
        .await
        .record(Entry::new(&req.message, outcome.clone()));

    // an alert is a successful outcome; only failures map to error codes
    let status = match &outcome {
        Outcome::Reply { .. } | Outcome::Alert { .. } => StatusCode::OK,
        Outcome::Failure {
            kind: FailureKind::EmptyInput,
            ..
        } => StatusCode::BAD_REQUEST,
        Outcome::Failure { .. } => StatusCode::BAD_GATEWAY,
    };

    (status, Json(outcome))
}

async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<Entry>> {
    Json(state.ledger.lock().await.entries().to_vec())
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, usize>> {
    Json(state.ledger.lock().await.stats())
}

async fn reset(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    state.ledger.lock().await.reset();
    Json(StatusResponse { status: "cleared" })
}
