//! Pure tenant-key to shard-number assignment.

use std::fmt;

/// Canonical routing key for one tenant (restaurant/account id).
///
/// Integer ids canonicalize to their decimal encoding, so `TenantKey::from(42)`
/// and `TenantKey::from("42")` hash identically regardless of how the caller
/// obtained the id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TenantKey(String);

impl TenantKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for TenantKey {
    fn from(id: i64) -> Self {
        TenantKey(id.to_string())
    }
}

impl From<u64> for TenantKey {
    fn from(id: u64) -> Self {
        TenantKey(id.to_string())
    }
}

impl From<&str> for TenantKey {
    fn from(s: &str) -> Self {
        TenantKey(s.to_string())
    }
}

impl From<String> for TenantKey {
    fn from(s: String) -> Self {
        TenantKey(s)
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the canonical key bytes. Stable across processes and restarts;
/// no seed, no time component.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Maps a tenant key to a shard number in `[0, shard_count)`.
///
/// Hash-mod-N: adding or removing a shard remaps a large fraction of tenants,
/// which is acceptable while the shard count is static. A consistent-hash ring
/// would be the replacement if live topology changes are ever needed.
#[derive(Clone, Copy, Debug)]
pub struct ShardAssigner {
    shard_count: u32,
}

impl ShardAssigner {
    /// `shard_count` must be >= 1; the router derives it from a validated topology.
    pub fn new(shard_count: u32) -> Self {
        debug_assert!(shard_count >= 1);
        ShardAssigner { shard_count }
    }

    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Always succeeds; an empty key is a valid input and gets a deterministic
    /// shard like any other.
    pub fn assign(&self, key: &TenantKey) -> u32 {
        (fnv1a(key.as_str().as_bytes()) % u64::from(self.shard_count)) as u32
    }
}
