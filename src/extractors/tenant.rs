//! Extract the authenticated tenant identity and the shard binding.

use crate::router::ShardInfo;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Tenant identity (restaurant/account id) placed on request extensions by
/// the upstream authentication layer. This crate trusts the value as already
/// verified and never creates or mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TenantId(pub i64);

/// Extractor for the optional tenant identity. `None` when the auth layer
/// did not run for this route.
#[derive(Clone, Debug)]
pub struct Tenant(pub Option<TenantId>);

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Tenant(parts.extensions.get::<TenantId>().copied()))
    }
}

/// Extractor for the optional shard binding set by the sharding middleware.
/// `None` when the middleware never ran; handlers must treat that the same
/// as "no shard bound" and refuse shard-specific work.
#[derive(Clone)]
pub struct ShardContext(pub Option<ShardInfo>);

#[async_trait]
impl<S> FromRequestParts<S> for ShardContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ShardContext(parts.extensions.get::<ShardInfo>().cloned()))
    }
}
