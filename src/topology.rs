//! Shard topology: the ordered, validated set of shard descriptors.

use crate::error::ConfigError;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

/// Pool sizing for one shard. Override per shard in config when a shard runs
/// hot; the defaults suit small services.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Upper bound on how long `get` blocks waiting for a free connection.
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// One shard's address and credentials. Immutable; supplied once at startup
/// from process configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ShardDescriptor {
    pub id: u32,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub pool: PoolSettings,
}

impl ShardDescriptor {
    /// Connection options for this shard (the DSN, without string formatting).
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Validated, ordered shard set. Owned by the pool manager for the process
/// lifetime; ids are a dense 0..N-1 range with no duplicates.
#[derive(Clone, Debug)]
pub struct ShardTopology {
    shards: Vec<ShardDescriptor>,
}

impl ShardTopology {
    pub fn new(mut shards: Vec<ShardDescriptor>) -> Result<Self, ConfigError> {
        if shards.is_empty() {
            return Err(ConfigError::EmptyTopology);
        }
        let expected = shards.len() as u32;
        let mut seen = vec![false; shards.len()];
        for d in &shards {
            if d.id >= expected {
                return Err(ConfigError::NonContiguousIds {
                    expected,
                    missing: first_missing(&seen),
                });
            }
            if seen[d.id as usize] {
                return Err(ConfigError::DuplicateShardId(d.id));
            }
            seen[d.id as usize] = true;
        }
        shards.sort_by_key(|d| d.id);
        Ok(ShardTopology { shards })
    }

    pub fn shard_count(&self) -> u32 {
        self.shards.len() as u32
    }

    /// Descriptors in shard-id order.
    pub fn shards(&self) -> &[ShardDescriptor] {
        &self.shards
    }
}

fn first_missing(seen: &[bool]) -> u32 {
    seen.iter().position(|s| !*s).unwrap_or(seen.len()) as u32
}

#[cfg(test)]
pub(crate) fn test_descriptor(id: u32) -> ShardDescriptor {
    ShardDescriptor {
        id,
        host: format!("shard{}.db.internal", id),
        port: 5432,
        user: "app".into(),
        password: "secret".into(),
        database: format!("pos_shard_{}", id),
        pool: PoolSettings::default(),
    }
}
