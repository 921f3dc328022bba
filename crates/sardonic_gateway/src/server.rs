use crate::types::{ClearResponse, ErrorBody, HealthResponse, HistoryResponse};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sardonic_reasoning::{ChatRequest, EngineStatus, ResponseEngine};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
struct AppState {
    engine: Arc<ResponseEngine>,
}

/// The gateway HTTP server.
///
/// - `POST /chat`: one reply per request
/// - `GET /health`: liveness plus model/catalog summary
/// - `GET /status`: full engine status
/// - `GET|DELETE /conversation/{user_id}`: inspect or clear a history
pub struct GatewayServer {
    engine: Arc<ResponseEngine>,
    host: String,
    port: u16,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// All gateway routes over one shared engine.
pub fn build_router(engine: Arc<ResponseEngine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/chat", post(chat))
        .route(
            "/conversation/:user_id",
            get(get_conversation).delete(clear_conversation),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { engine })
}

impl GatewayServer {
    pub fn new(engine: Arc<ResponseEngine>, host: &str, port: u16) -> Self {
        Self {
            engine,
            host: host.to_string(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bind and serve until the server stops.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Gateway failed to bind {}: {}", addr, e))?;
        tracing::info!("Gateway listening on {}", addr);
        axum::serve(listener, build_router(self.engine)).await?;
        Ok(())
    }

    /// Serve in a background task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                tracing::error!("Gateway server error: {:#}", e);
            }
        })
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.engine.status().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_available: status.model_available,
        catalog_size: status.catalog_size,
        active_conversations: status.active_histories,
    })
}

async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.engine.status().await)
}

/// POST /chat: classify, reply and record one exchange.
///
/// Malformed JSON and invalid fields both answer 400 with `{"error": ..}`.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::debug!("Rejected chat payload: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.engine.respond(request).await {
        Ok(reply) => Json(reply).into_response(),
        // Every engine error is a rejected request; generation failures
        // are recovered inside the engine.
        Err(e) => {
            tracing::debug!("Rejected chat request: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<HistoryResponse> {
    let history = state.engine.history(&user_id).await;
    Json(HistoryResponse { user_id, history })
}

async fn clear_conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ClearResponse> {
    state.engine.clear_history(&user_id).await;
    Json(ClearResponse {
        status: "cleared".to_string(),
        user_id,
    })
}
