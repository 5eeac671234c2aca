//! Sharding middleware: binds each authenticated request to its shard.

use crate::assigner::TenantKey;
use crate::error::ShardError;
use crate::extractors::tenant::TenantId;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Routes the request to the shard owning its tenant. Run this after the
/// authentication layer, which inserts [`TenantId`] into request extensions.
///
/// Exactly one of the following happens per request:
/// - no tenant identity: 400, inner handler never runs, nothing acquired;
/// - shard resolution fails: 503, inner handler never runs;
/// - resolution succeeds: [`crate::ShardInfo`] is attached to the request and
///   the inner handler owns the response from here on.
///
/// Mount with `axum::middleware::from_fn_with_state(state, shard_request)`.
pub async fn shard_request(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(&TenantId(tenant_id)) = req.extensions().get::<TenantId>() else {
        // Client/auth fault, not a system fault; keep it out of warn logs.
        tracing::debug!(method = %req.method(), path = %req.uri().path(), "no tenant identity on request");
        return ShardError::MissingTenant.into_response();
    };

    let key = TenantKey::from(tenant_id);
    match state.router.resolve(&key).await {
        Ok(info) => {
            tracing::debug!(tenant = %key, shard = info.shard_number, "request routed");
            req.extensions_mut().insert(info);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(tenant = %key, error = %err, "shard resolution failed");
            err.into_response()
        }
    }
}
