//! Registry configuration loader
//!
//! Reads a `[[clusters]]` array from a TOML/YAML/JSON file through the `config`
//! crate. Each entry carries its token as a value, never as a table key, so
//! token case survives loading. Environment overrides address entries by
//! position: `REDIS_CLUSTER__CLUSTERS__<INDEX>__<FIELD>`.
//!
//! ```toml
//! [[clusters]]
//! token = "Sessions"
//! nodes = ["redis://10.0.0.1:7000", "redis://10.0.0.2:7000"]
//! read_from_replicas = true
//! ```

use super::ClusterOptions;
use crate::constants::CONFIG_ENV_SEPARATOR;
use crate::error::{ClusterError, ClusterResult};
use crate::module::ClusterModuleOptions;
use crate::token::validate_cluster_token;
use config::Source;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// One configured cluster: its token plus connection options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterEntry {
    pub token: String,
    #[serde(flatten)]
    pub options: ClusterOptions,
}

impl ClusterEntry {
    pub fn new(token: impl Into<String>, options: ClusterOptions) -> Self {
        Self {
            token: token.into(),
            options,
        }
    }
}

/// All clusters configured for one process, in file order
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterEntry>,
}

impl RegistryConfig {
    /// Load and validate a registry configuration file
    pub fn load_from_file(path: impl AsRef<Path>) -> ClusterResult<Self> {
        Self::load_from_file_with_env(path, None)
    }

    /// Load a registry configuration file, applying environment overrides under `env_prefix`
    pub fn load_from_file_with_env(
        path: impl AsRef<Path>,
        env_prefix: Option<&str>,
    ) -> ClusterResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClusterError::ConfigLoad(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let mut builder = config::Config::builder().add_source(config::File::from(path));
        if let Some(prefix) = env_prefix {
            let environment =
                config::Environment::with_prefix(prefix).separator(CONFIG_ENV_SEPARATOR);
            for (key, value) in environment.collect()? {
                match indexed_override_key(&key) {
                    Some(path) => builder = builder.set_override(path, value)?,
                    None => debug!(key = %key, "Ignoring environment override outside clusters[N]"),
                }
            }
        }
        let source = builder.build()?;

        let count = match source.get_array("clusters") {
            Ok(entries) => entries.len(),
            Err(config::ConfigError::NotFound(_)) => 0,
            Err(e) => return Err(e.into()),
        };

        // Per-entry lookups keep the `config` value coercions for env-provided strings
        let mut clusters = Vec::with_capacity(count);
        for index in 0..count {
            let token = source.get_string(&format!("clusters[{index}].token"))?;
            let options = source.get::<ClusterOptions>(&format!("clusters[{index}]"))?;
            clusters.push(ClusterEntry { token, options });
        }

        let loaded = Self { clusters };
        loaded.validate()?;

        debug!(
            path = %path.display(),
            clusters = loaded.clusters.len(),
            "Cluster registry configuration loaded"
        );

        Ok(loaded)
    }

    /// Validate every token and its options, rejecting repeated tokens
    pub fn validate(&self) -> ClusterResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.clusters {
            validate_cluster_token(&entry.token)?;
            if !seen.insert(entry.token.as_str()) {
                return Err(ClusterError::DuplicateToken(entry.token.clone()));
            }
            entry.options.validate().map_err(|e| match e {
                ClusterError::Configuration(reason) => {
                    ClusterError::Configuration(format!("cluster '{}': {reason}", entry.token))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Options configured for `token`, matched exactly
    pub fn get(&self, token: &str) -> Option<&ClusterOptions> {
        self.clusters
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| &entry.options)
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.clusters.iter().map(|entry| entry.token.as_str()).collect()
    }

    /// Build one `register` input per configured cluster, in file order
    pub fn into_modules<C>(self) -> Vec<ClusterModuleOptions<C>> {
        self.clusters
            .into_iter()
            .map(|entry| ClusterModuleOptions::new(entry.token, entry.options))
            .collect()
    }
}

/// `clusters.3.password` -> `clusters[3].password`
fn indexed_override_key(key: &str) -> Option<String> {
    let key = key.to_ascii_lowercase();
    let mut parts = key.split('.');
    if parts.next()? != "clusters" {
        return None;
    }
    let index: usize = parts.next()?.parse().ok()?;
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return None;
    }
    Some(format!("clusters[{index}].{}", rest.join(".")))
}
