//! # Cluster Configuration
//!
//! Connection parameters for one Redis cluster client and the file/env loader
//! for a whole registry of them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use redis_cluster_registry::config::{ClusterOptions, RegistryConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Inline options for a single cluster
//! let options = ClusterOptions::new(["redis://10.0.0.1:7000", "redis://10.0.0.2:7000"])
//!     .with_password("s3cret");
//! options.validate()?;
//!
//! // Or every cluster from a file, with REDIS_CLUSTER__* overrides
//! let registry = RegistryConfig::load_from_file_with_env("config/clusters.toml", Some("REDIS_CLUSTER"))?;
//! for token in registry.tokens() {
//!     println!("configured cluster: {token}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::defaults;
use crate::error::{ClusterError, ClusterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use loader::{ClusterEntry, RegistryConfig};

/// TLS mode forwarded to the cluster client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsSetting {
    /// Plain TCP
    #[default]
    None,
    /// TLS with certificate verification
    Secure,
    /// TLS without certificate verification
    Insecure,
}

/// Connection parameters for one Redis cluster
///
/// The crate only validates these; they are handed to the client library as-is.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterOptions {
    /// Seed node URLs (`redis://host:port` or `rediss://host:port`)
    pub nodes: Vec<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub tls: TlsSetting,

    /// Route read-only commands to replicas
    #[serde(default)]
    pub read_from_replicas: bool,

    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Retries for redirected or failed requests, handled by the client library
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_connection_timeout_ms() -> u64 {
    defaults::CONNECTION_TIMEOUT_MS
}

fn default_response_timeout_ms() -> u64 {
    defaults::RESPONSE_TIMEOUT_MS
}

fn default_retries() -> u32 {
    defaults::RETRIES
}

impl fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("nodes", &self.nodes)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("tls", &self.tls)
            .field("read_from_replicas", &self.read_from_replicas)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("retries", &self.retries)
            .finish()
    }
}

impl ClusterOptions {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            username: None,
            password: None,
            tls: TlsSetting::None,
            read_from_replicas: false,
            connection_timeout_ms: defaults::CONNECTION_TIMEOUT_MS,
            response_timeout_ms: defaults::RESPONSE_TIMEOUT_MS,
            retries: defaults::RETRIES,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_tls(mut self, tls: TlsSetting) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_read_from_replicas(mut self) -> Self {
        self.read_from_replicas = true;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Check the options are usable before any connection is attempted
    pub fn validate(&self) -> ClusterResult<()> {
        if self.nodes.is_empty() {
            return Err(ClusterError::Configuration(
                "at least one seed node is required".to_string(),
            ));
        }

        for node in &self.nodes {
            if node.trim().is_empty() {
                return Err(ClusterError::Configuration(
                    "seed node URL must not be empty".to_string(),
                ));
            }
            if !(node.starts_with("redis://") || node.starts_with("rediss://")) {
                return Err(ClusterError::Configuration(format!(
                    "seed node '{node}' must use the redis:// or rediss:// scheme"
                )));
            }
        }

        if self.connection_timeout_ms == 0 || self.response_timeout_ms == 0 {
            return Err(ClusterError::Configuration(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
