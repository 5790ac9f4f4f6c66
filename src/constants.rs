//! Fixed names shared across the registry.

/// Namespace prefix for keys derived from cluster tokens
pub const CLUSTER_KEY_PREFIX: &str = "redis:cluster:";

/// Module name reported on every descriptor built by `RedisClusterModule`
pub const CLUSTER_MODULE_NAME: &str = "RedisClusterModule";

/// Environment variable prefix for registry configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "REDIS_CLUSTER";

/// Separator between nested keys in environment overrides (`REDIS_CLUSTER__CLUSTERS__...`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

pub mod defaults {
    pub const CONNECTION_TIMEOUT_MS: u64 = 5_000;
    pub const RESPONSE_TIMEOUT_MS: u64 = 5_000;
    pub const RETRIES: u32 = 16;
}
