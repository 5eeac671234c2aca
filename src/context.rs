//! Accessors for the shard binding carried in request extensions, and the
//! access guard that keeps handlers on the shard they were routed to.

use crate::router::ShardInfo;
use axum::http::Extensions;
use sqlx::PgPool;

/// The shard binding attached by the middleware, or `None` if the middleware
/// never ran. Defensive: never panics.
pub fn shard_info(extensions: &Extensions) -> Option<ShardInfo> {
    extensions.get::<ShardInfo>().cloned()
}

/// Shard number the request was routed to, if bound.
pub fn shard_number(extensions: &Extensions) -> Option<u32> {
    extensions.get::<ShardInfo>().map(|info| info.shard_number)
}

/// Pool handle for the request's shard, if bound.
pub fn shard_connection(extensions: &Extensions) -> Option<PgPool> {
    extensions.get::<ShardInfo>().map(|info| info.connection.clone())
}

/// True only when `requested_shard` equals the shard this request was routed
/// to. Call before shard-specific work whenever the shard number came from
/// anywhere other than the request's own binding (e.g. recomputed from a
/// different tenant key); a mismatch here is a cross-tenant access bug.
///
/// Pure equality check: no I/O, no context mutation. An unbound request
/// validates nothing.
pub fn validate_shard_access(extensions: &Extensions, requested_shard: u32) -> bool {
    match shard_number(extensions) {
        Some(bound) => bound == requested_shard,
        None => {
            tracing::warn!(
                requested_shard,
                "shard access check on request with no shard binding"
            );
            false
        }
    }
}
