//! Demo server: builds a shard topology from env, mounts the sharding
//! middleware in front of a sample handler, and serves operational routes.
//!
//! The upstream JWT layer is out of scope here; a small stand-in middleware
//! reads `X-Restaurant-ID` and inserts the tenant identity the way the real
//! auth layer would.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sharding_sdk::{
    shard_request, shard_routes, AppState, PoolSettings, ShardContext, ShardDescriptor,
    ShardRouter,
};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sharding_sdk=info,server=info")),
        )
        .init();

    let descriptors = topology_from_env()?;
    let router = ShardRouter::new(descriptors)?;
    let state = AppState::new(router);

    let api = Router::new()
        .route("/orders", get(list_orders))
        .layer(middleware::from_fn_with_state(state.clone(), shard_request))
        .layer(middleware::from_fn(demo_auth))
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let app = Router::new()
        .merge(shard_routes(state.clone()))
        .nest("/api/v1", api);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    state.router.close().await;
    Ok(())
}

/// Sample downstream handler: reports which shard the request was bound to.
async fn list_orders(ShardContext(info): ShardContext) -> Response {
    let Some(info) = info else {
        // Middleware did not run for this route; refuse shard-specific work.
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    Json(serde_json::json!({
        "shard": info.shard_number,
        "orders": []
    }))
    .into_response()
}

/// Stand-in for the authentication layer: trusts `X-Restaurant-ID`.
async fn demo_auth(mut req: Request, next: Next) -> Response {
    if let Some(id) = req
        .headers()
        .get("X-Restaurant-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
    {
        req.extensions_mut().insert(sharding_sdk::TenantId(id));
    }
    next.run(req).await
}

/// Topology from env: `SHARD_COUNT` plus `SHARD<i>_HOST/PORT/USER/PASSWORD/DATABASE`
/// per shard, with sensible local defaults.
fn topology_from_env() -> Result<Vec<ShardDescriptor>, Box<dyn std::error::Error>> {
    let count: u32 = std::env::var("SHARD_COUNT")
        .unwrap_or_else(|_| "4".into())
        .parse()?;
    let mut descriptors = Vec::with_capacity(count as usize);
    for id in 0..count {
        let var = |suffix: &str| std::env::var(format!("SHARD{}_{}", id, suffix));
        descriptors.push(ShardDescriptor {
            id,
            host: var("HOST").unwrap_or_else(|_| "localhost".into()),
            port: var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(5432),
            user: var("USER").unwrap_or_else(|_| "postgres".into()),
            password: var("PASSWORD").unwrap_or_default(),
            database: var("DATABASE").unwrap_or_else(|_| format!("pos_shard_{}", id)),
            pool: PoolSettings::default(),
        });
    }
    Ok(descriptors)
}
