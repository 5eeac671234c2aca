//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Topology validation failure. Fatal at construction; no pools are created.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("shard topology is empty")]
    EmptyTopology,
    #[error("duplicate shard id: {0}")]
    DuplicateShardId(u32),
    #[error("shard ids must be dense 0..{expected}, missing id {missing}")]
    NonContiguousIds { expected: u32, missing: u32 },
}

/// Per-request routing failure. Every variant maps to a typed HTTP response;
/// nothing here propagates past the middleware boundary.
#[derive(Error, Debug)]
pub enum ShardError {
    #[error("missing tenant identity on request")]
    MissingTenant,
    #[error("shard {shard} unavailable: {source}")]
    Unavailable {
        shard: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("shard router is closed")]
    Closed,
    #[error("shard number {0} out of range")]
    OutOfRange(u32),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ShardError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ShardError::MissingTenant => (StatusCode::BAD_REQUEST, "missing_tenant"),
            ShardError::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "shard_unavailable"),
            ShardError::Closed => (StatusCode::SERVICE_UNAVAILABLE, "router_closed"),
            ShardError::OutOfRange(_) => (StatusCode::INTERNAL_SERVER_ERROR, "shard_out_of_range"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tenant_maps_to_400() {
        let resp = ShardError::MissingTenant.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unavailable_and_closed_map_to_503() {
        let resp = ShardError::Unavailable {
            shard: 2,
            source: sqlx::Error::PoolTimedOut,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = ShardError::Closed.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
