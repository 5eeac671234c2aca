//! Per-shard connection pools behind a small capability interface.

use crate::error::ShardError;
use crate::topology::ShardTopology;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Capability interface over the per-shard pools. The middleware and router
/// only see this trait, so a test double (or another driver) can stand in for
/// the sqlx-backed manager.
#[async_trait]
pub trait ShardPools: Send + Sync + 'static {
    fn shard_count(&self) -> u32;

    /// Hands back the pool handle for `shard_number` after proving the shard
    /// is reachable. Blocks at most the shard's acquire timeout; aborts
    /// promptly when the caller's future is dropped.
    async fn get(&self, shard_number: u32) -> Result<PgPool, ShardError>;

    /// Idempotent teardown: drains in-flight acquisitions and releases every
    /// connection. `get` fails fast afterward.
    async fn close(&self);
}

/// sqlx-backed pool manager: one eagerly-built `PgPool` per shard, indexed by
/// shard number. Pools are independent; one shard being down never blocks
/// acquisition on another.
pub struct PgShardPools {
    pools: Vec<PgPool>,
}

impl PgShardPools {
    /// Builds one pool per shard from a validated topology. Pool construction
    /// itself performs no I/O; physical connections open on first acquire.
    pub fn new(topology: &ShardTopology) -> Self {
        let pools = topology
            .shards()
            .iter()
            .map(|d| {
                PgPoolOptions::new()
                    .max_connections(d.pool.max_connections)
                    .min_connections(d.pool.min_connections)
                    .acquire_timeout(d.pool.acquire_timeout)
                    .max_lifetime(d.pool.max_lifetime)
                    .idle_timeout(d.pool.idle_timeout)
                    .connect_lazy_with(d.connect_options())
            })
            .collect();
        PgShardPools { pools }
    }
}

#[async_trait]
impl ShardPools for PgShardPools {
    fn shard_count(&self) -> u32 {
        self.pools.len() as u32
    }

    async fn get(&self, shard_number: u32) -> Result<PgPool, ShardError> {
        let pool = self
            .pools
            .get(shard_number as usize)
            .ok_or(ShardError::OutOfRange(shard_number))?;
        if pool.is_closed() {
            return Err(ShardError::Closed);
        }
        // Prove the shard is reachable before handing the pool downstream.
        // Dropping this future releases the acquire slot.
        let conn = pool.acquire().await.map_err(|source| match source {
            sqlx::Error::PoolClosed => ShardError::Closed,
            source => ShardError::Unavailable {
                shard: shard_number,
                source,
            },
        })?;
        drop(conn);
        Ok(pool.clone())
    }

    async fn close(&self) {
        for pool in &self.pools {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::test_descriptor;

    fn two_shard_pools() -> PgShardPools {
        let topo = ShardTopology::new(vec![test_descriptor(0), test_descriptor(1)]).unwrap();
        PgShardPools::new(&topo)
    }

    #[tokio::test]
    async fn builds_one_pool_per_shard() {
        assert_eq!(two_shard_pools().shard_count(), 2);
    }

    #[tokio::test]
    async fn out_of_range_shard_is_rejected() {
        let pools = two_shard_pools();
        let err = pools.get(2).await.unwrap_err();
        assert!(matches!(err, ShardError::OutOfRange(2)));
    }

    #[tokio::test]
    async fn get_after_close_fails_fast() {
        let pools = two_shard_pools();
        pools.close().await;
        let err = pools.get(0).await.unwrap_err();
        assert!(matches!(err, ShardError::Closed));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let pools = two_shard_pools();
        pools.close().await;
        pools.close().await;
        assert!(matches!(pools.get(1).await.unwrap_err(), ShardError::Closed));
    }
}
