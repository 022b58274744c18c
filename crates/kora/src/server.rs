//! HTTP front end
//!
//! | Route          | Body            | Reply                                  |
//! |----------------|-----------------|----------------------------------------|
//! | `POST /chat`   | `{"message"}`   | `{"response", "status"}`               |
//! | `POST /clear`  |                 | `{"status", "message"}`                |
//! | `GET /health`  |                 | `{"status", "initialized", "timestamp"}` |
//!
//! All routes share one orchestrator, so turns are handled one at a time.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use kora_agent::Orchestrator;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Mutex<Orchestrator>>,
}

impl AppState {
    pub fn new(agent: Orchestrator) -> Self {
        Self {
            agent: Arc::new(Mutex::new(agent)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearReply {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReply {
    pub status: String,
    pub initialized: bool,
    pub timestamp: String,
}

/// Error reply `{"detail": ...}` with a status code
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            detail: "Message cannot be empty".to_string(),
        });
    }

    let mut agent = state.agent.lock().await;
    let reply = match agent.handle_turn(message).await {
        Ok(outcome) => ChatReply {
            response: outcome.response,
            status: "success".to_string(),
        },
        Err(e) => {
            warn!(error = %e, "Chat turn failed");
            ChatReply {
                response: format!("Sorry, something went wrong: {e}"),
                status: "error".to_string(),
            }
        }
    };
    Ok(Json(reply))
}

async fn clear(State(state): State<AppState>) -> Result<Json<ClearReply>, ApiError> {
    let mut agent = state.agent.lock().await;
    agent.reset().await.map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: format!("Failed to clear history: {e}"),
    })?;

    Ok(Json(ClearReply {
        status: "success".to_string(),
        message: "Chat history cleared successfully!".to_string(),
    }))
}

async fn health() -> Json<HealthReply> {
    Json(HealthReply {
        status: "healthy".to_string(),
        initialized: true,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Routes with tracing and permissive CORS
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/clear", post(clear))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C, then save memory
pub async fn serve(agent: Orchestrator, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(agent);
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Kora server listening");

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let agent = state.agent.lock().await;
    if let Err(e) = agent.memory().save().await {
        warn!(error = %e, "Could not save memory index");
    }
    info!("Kora server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
