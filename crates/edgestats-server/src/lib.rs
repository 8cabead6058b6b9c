//! HTTP pull endpoint for the stats aggregator.
//!
//! The management-plane poller fetches `/api/v1/stats`, which drains the
//! update history. `/health` inspects the store without draining.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use log::info;
use serde::{Deserialize, Serialize};

use edgestats_core::{DrainResponse, EdgeStatsError, StatsAggregator, StoreView};

/// Shared server state.
struct AppState {
    aggregator: Arc<StatsAggregator>,
}

#[derive(Deserialize)]
struct RunningParams {
    running: bool,
}

#[derive(Serialize)]
struct AckResponse {
    ok: u8,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    store: StoreView,
}

async fn handle_stats(State(state): State<Arc<AppState>>) -> Json<DrainResponse> {
    Json(state.aggregator.drain())
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.aggregator.store_view();
    Json(HealthResponse {
        status: if store.success {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: edgestats_core::VERSION.to_string(),
        store,
    })
}

async fn handle_set_running(
    State(state): State<Arc<AppState>>,
    Json(params): Json<RunningParams>,
) -> Json<AckResponse> {
    state.aggregator.set_running(params.running);
    Json(AckResponse { ok: 1 })
}

async fn handle_reset(State(state): State<Arc<AppState>>) -> Json<AckResponse> {
    state.aggregator.reset();
    Json(AckResponse { ok: 1 })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = state.aggregator.config();
    Json(serde_json::json!({
        "name": "edgestats",
        "version": edgestats_core::VERSION,
        "history_capacity": config.history_capacity,
        "negative_deltas": config.negative_deltas.to_string(),
        "endpoints": {
            "/": "This API index",
            "/api/v1/stats": {
                "method": "GET",
                "description": "Drain buffered interface deltas; the newest record carries live router status",
            },
            "/api/v1/running": {
                "method": "POST",
                "description": "Override the reported running flag",
                "body": {"running": "true | false"},
            },
            "/api/v1/reset": {
                "method": "POST",
                "description": "Discard stored stats, history and tracked dataplane identity",
            },
            "/health": "Store state without draining",
        },
    }))
}

/// Build the axum router.
pub fn build_router(aggregator: Arc<StatsAggregator>) -> Router {
    let state = Arc::new(AppState { aggregator });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/stats", get(handle_stats))
        .route("/api/v1/running", post(handle_set_running))
        .route("/api/v1/reset", post(handle_reset))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run_server<F>(
    aggregator: Arc<StatsAggregator>,
    host: &str,
    port: u16,
    shutdown: F,
) -> Result<(), EdgeStatsError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(aggregator);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| EdgeStatsError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("serving stats on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(EdgeStatsError::Serve)
}
