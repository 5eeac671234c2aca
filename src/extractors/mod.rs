pub mod tenant;

pub use tenant::{ShardContext, Tenant, TenantId};
