//! Example consumer: a downstream service using sharding-sdk for routing.
//!
//! Run from repo root: `cargo run -p example-consumer`
//!
//! Demonstrates the access guard: a reporting handler that receives a target
//! restaurant id in the path recomputes that restaurant's shard and refuses
//! to proceed unless it matches the shard the request itself was routed to.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sharding_sdk::{
    shard_request, shard_routes, validate_shard_access, AppState, PoolSettings, ShardDescriptor,
    ShardRouter, TenantId, TenantKey,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sharding_sdk=info")),
        )
        .init();

    let shard_count: u32 = std::env::var("SHARD_COUNT")
        .unwrap_or_else(|_| "4".into())
        .parse()?;
    let descriptors = (0..shard_count)
        .map(|id| ShardDescriptor {
            id,
            host: std::env::var(format!("SHARD{}_HOST", id)).unwrap_or_else(|_| "localhost".into()),
            port: 5432,
            user: "postgres".into(),
            password: std::env::var(format!("SHARD{}_PASSWORD", id)).unwrap_or_default(),
            database: format!("pos_shard_{}", id),
            pool: PoolSettings::default(),
        })
        .collect();
    let state = AppState::new(ShardRouter::new(descriptors)?);

    let api = Router::new()
        .route("/reports/:restaurant_id", get(shard_report))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state.clone(), shard_request))
        .layer(middleware::from_fn(header_auth));

    let app = Router::new()
        .merge(shard_routes(state.clone()))
        .nest("/api/v1", api);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("example consumer listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    state.router.close().await;
    Ok(())
}

/// Stand-in for the real auth layer: trusts `X-Restaurant-ID`.
async fn header_auth(mut req: Request, next: Next) -> Response {
    if let Some(id) = req
        .headers()
        .get("X-Restaurant-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
    {
        req.extensions_mut().insert(TenantId(id));
    }
    next.run(req).await
}

/// The target restaurant's shard is recomputed from the path id, which may
/// differ from the authenticated tenant; the guard closes that gap.
async fn shard_report(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
    req: Request,
) -> Response {
    let target_shard = state
        .router
        .shard_number_for(&TenantKey::from(restaurant_id));
    if !validate_shard_access(req.extensions(), target_shard) {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": { "code": "cross_shard_access", "message": "restaurant is not on this request's shard" }
            })),
        )
            .into_response();
    }
    Json(serde_json::json!({
        "restaurant_id": restaurant_id,
        "shard": target_shard,
        "report": {}
    }))
    .into_response()
}
