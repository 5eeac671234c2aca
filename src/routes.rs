//! Operational routes: liveness, version, per-shard health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ShardHealthBody {
    status: &'static str,
    shards: Vec<ShardStatus>,
}

#[derive(Serialize)]
struct ShardStatus {
    shard: u32,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Probes every shard. 200 when all shards are reachable, 503 with the
/// per-shard breakdown otherwise.
async fn shards_health(
    State(state): State<AppState>,
) -> Result<Json<ShardHealthBody>, (StatusCode, Json<ShardHealthBody>)> {
    let mut shards = Vec::with_capacity(state.router.shard_count() as usize);
    let mut degraded = false;
    for shard in 0..state.router.shard_count() {
        match state.router.check_shard(shard).await {
            Ok(()) => shards.push(ShardStatus {
                shard,
                status: "healthy",
                error: None,
            }),
            Err(err) => {
                degraded = true;
                shards.push(ShardStatus {
                    shard,
                    status: "unavailable",
                    error: Some(err.to_string()),
                });
            }
        }
    }
    if degraded {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ShardHealthBody {
                status: "degraded",
                shards,
            }),
        ));
    }
    Ok(Json(ShardHealthBody {
        status: "ok",
        shards,
    }))
}

/// Operational routes: GET /health, GET /version, GET /shards/health.
pub fn shard_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/shards/health", get(shards_health))
        .with_state(state)
}
