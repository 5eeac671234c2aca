//! Router facade: tenant key in, bound shard connection out.

use crate::assigner::{ShardAssigner, TenantKey};
use crate::error::{ConfigError, ShardError};
use crate::pool::{PgShardPools, ShardPools};
use crate::topology::{ShardDescriptor, ShardTopology};
use sqlx::PgPool;
use std::sync::Arc;

/// Per-request routing result: the shard number the tenant hashes to and the
/// pool handle for that shard. Attached to the request context by the
/// middleware; read-only for the rest of the request.
#[derive(Clone, Debug)]
pub struct ShardInfo {
    pub shard_number: u32,
    pub connection: PgPool,
}

/// Composes the assigner and the pool manager. Explicitly constructed at
/// startup and closed at shutdown; inject it into the middleware rather than
/// holding it as ambient global state.
#[derive(Clone)]
pub struct ShardRouter {
    assigner: ShardAssigner,
    pools: Arc<dyn ShardPools>,
}

impl std::fmt::Debug for ShardRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardRouter")
            .field("assigner", &self.assigner)
            .field("shard_count", &self.pools.shard_count())
            .finish()
    }
}

impl ShardRouter {
    /// Validates the topology and builds one pool per shard. Fails with
    /// `ConfigError` (and creates no pools) on an empty, duplicate, or sparse
    /// topology.
    pub fn new(descriptors: Vec<ShardDescriptor>) -> Result<Self, ConfigError> {
        let topology = ShardTopology::new(descriptors)?;
        let pools = Arc::new(PgShardPools::new(&topology));
        Ok(Self::with_pools(pools))
    }

    /// Wraps an existing pool manager (e.g. an in-memory fake in tests).
    pub fn with_pools(pools: Arc<dyn ShardPools>) -> Self {
        let assigner = ShardAssigner::new(pools.shard_count());
        ShardRouter { assigner, pools }
    }

    pub fn shard_count(&self) -> u32 {
        self.pools.shard_count()
    }

    /// Pure projection of the routing decision; no pool is touched.
    pub fn shard_number_for(&self, key: &TenantKey) -> u32 {
        self.assigner.assign(key)
    }

    /// Routes `key` to its shard and hands back a ready-to-use connection
    /// handle. Routing itself cannot fail; any error is a shard-unavailable
    /// class error from the pool layer, propagated unchanged.
    pub async fn resolve(&self, key: &TenantKey) -> Result<ShardInfo, ShardError> {
        let shard_number = self.assigner.assign(key);
        let connection = self.pools.get(shard_number).await?;
        Ok(ShardInfo {
            shard_number,
            connection,
        })
    }

    /// Reachability probe for one shard, bypassing tenant assignment.
    pub async fn check_shard(&self, shard_number: u32) -> Result<(), ShardError> {
        self.pools.get(shard_number).await.map(|_| ())
    }

    /// Scoped shutdown. Delegates to the pool manager; the router is unusable
    /// afterward (`resolve` fails fast, it does not reconnect).
    pub async fn close(&self) {
        self.pools.close().await;
    }
}
