//! Sharding SDK: tenant-to-shard routing layer for multi-tenant PostgreSQL backends.
//!
//! Given a static topology of N database shards, the router deterministically
//! maps each tenant to one shard, hands request handlers a ready-to-use
//! connection handle for that shard, and guards handlers against operating on
//! a shard other than the one the request was routed to. It routes; it does
//! not query.

pub mod assigner;
pub mod context;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod pool;
pub mod router;
pub mod routes;
pub mod state;
pub mod topology;

pub use assigner::{ShardAssigner, TenantKey};
pub use context::{shard_connection, shard_info, shard_number, validate_shard_access};
pub use error::{ConfigError, ShardError};
pub use extractors::{ShardContext, Tenant, TenantId};
pub use middleware::shard_request;
pub use pool::{PgShardPools, ShardPools};
pub use router::{ShardInfo, ShardRouter};
pub use routes::shard_routes;
pub use state::AppState;
pub use topology::{PoolSettings, ShardDescriptor, ShardTopology};
