//! End-to-end middleware behavior over an in-memory pool manager.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use sharding_sdk::{
    shard_request, shard_routes, AppState, ShardAssigner, ShardContext, ShardError, ShardPools,
    ShardRouter, TenantId, TenantKey,
};
use sqlx::PgPool;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

/// In-memory pool manager: lazy pool handles that never dial out, with an
/// optional shard forced to fail acquisition.
struct FakePools {
    shard_count: u32,
    failing: Option<u32>,
}

#[async_trait]
impl ShardPools for FakePools {
    fn shard_count(&self) -> u32 {
        self.shard_count
    }

    async fn get(&self, shard_number: u32) -> Result<PgPool, ShardError> {
        if shard_number >= self.shard_count {
            return Err(ShardError::OutOfRange(shard_number));
        }
        if self.failing == Some(shard_number) {
            return Err(ShardError::Unavailable {
                shard: shard_number,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        PgPool::connect_lazy("postgres://app@localhost/unused").map_err(|source| {
            ShardError::Unavailable {
                shard: shard_number,
                source,
            }
        })
    }

    async fn close(&self) {}
}

struct HandlerProbe {
    called: Arc<AtomicBool>,
    seen_shard: Arc<Mutex<Option<u32>>>,
}

impl HandlerProbe {
    fn new() -> Self {
        HandlerProbe {
            called: Arc::new(AtomicBool::new(false)),
            seen_shard: Arc::new(Mutex::new(None)),
        }
    }
}

fn app(router: ShardRouter, probe: &HandlerProbe) -> Router {
    let called = probe.called.clone();
    let seen_shard = probe.seen_shard.clone();
    let state = AppState::new(router);
    Router::new()
        .route(
            "/orders",
            get(move |ShardContext(info): ShardContext| {
                let called = called.clone();
                let seen_shard = seen_shard.clone();
                async move {
                    called.store(true, Ordering::SeqCst);
                    match info {
                        Some(info) => {
                            *seen_shard.lock().unwrap() = Some(info.shard_number);
                            StatusCode::OK
                        }
                        None => StatusCode::INTERNAL_SERVER_ERROR,
                    }
                }
            }),
        )
        .layer(middleware::from_fn_with_state(state, shard_request))
}

fn request_for_tenant(tenant_id: Option<i64>) -> Request<Body> {
    let mut req = Request::builder()
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    if let Some(id) = tenant_id {
        req.extensions_mut().insert(TenantId(id));
    }
    req
}

fn healthy_router(shard_count: u32) -> ShardRouter {
    ShardRouter::with_pools(Arc::new(FakePools {
        shard_count,
        failing: None,
    }))
}

#[tokio::test]
async fn missing_identity_is_rejected_with_400() {
    let probe = HandlerProbe::new();
    let app = app(healthy_router(4), &probe);

    let resp = app.oneshot(request_for_tenant(None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!probe.called.load(Ordering::SeqCst), "handler must not run");

    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "missing_tenant");
}

#[tokio::test]
async fn routed_request_reaches_handler_with_binding() {
    let probe = HandlerProbe::new();
    let app = app(healthy_router(4), &probe);

    let resp = app
        .oneshot(request_for_tenant(Some(1)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(probe.called.load(Ordering::SeqCst));
    let shard = probe.seen_shard.lock().unwrap().unwrap();
    assert!(shard < 4);
}

#[tokio::test]
async fn same_tenant_routes_to_same_shard_every_time() {
    let mut seen = Vec::new();
    for _ in 0..3 {
        let probe = HandlerProbe::new();
        let app = app(healthy_router(4), &probe);
        let resp = app.oneshot(request_for_tenant(Some(1))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        seen.push(probe.seen_shard.lock().unwrap().unwrap());
    }
    assert_eq!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);
}

#[tokio::test]
async fn failing_shard_rejects_only_its_own_tenants() {
    // Pick two tenants that land on different shards, then break the first
    // tenant's shard.
    let assigner = ShardAssigner::new(4);
    let unlucky_tenant = 1i64;
    let broken_shard = assigner.assign(&TenantKey::from(unlucky_tenant));
    let lucky_tenant = (2..100i64)
        .find(|id| assigner.assign(&TenantKey::from(*id)) != broken_shard)
        .unwrap();

    let router = ShardRouter::with_pools(Arc::new(FakePools {
        shard_count: 4,
        failing: Some(broken_shard),
    }));
    let probe = HandlerProbe::new();
    let app = app(router, &probe);

    let resp = app
        .clone()
        .oneshot(request_for_tenant(Some(unlucky_tenant)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!probe.called.load(Ordering::SeqCst), "handler must not run");

    let resp = app
        .oneshot(request_for_tenant(Some(lucky_tenant)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(probe.called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn shards_health_reports_per_shard_status() {
    let app = shard_routes(AppState::new(healthy_router(2)));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/shards/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["shards"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn shards_health_degrades_when_a_shard_is_down() {
    let router = ShardRouter::with_pools(Arc::new(FakePools {
        shard_count: 2,
        failing: Some(1),
    }));
    let app = shard_routes(AppState::new(router));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/shards/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["shards"][0]["status"], "healthy");
    assert_eq!(body["shards"][1]["status"], "unavailable");
}
