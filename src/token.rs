//! # Cluster Tokens
//!
//! A [`ClusterToken`] names one registered cluster client. Every binding the
//! module builds (options, client, shutdown hook) is keyed by the [`ClusterKey`]
//! derived from it, which is the token under a fixed namespace prefix.

use crate::constants::CLUSTER_KEY_PREFIX;
use crate::error::{ClusterError, ClusterResult};
use std::fmt;

/// Validated, non-empty identifier for one cluster client
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterToken(String);

impl ClusterToken {
    /// Validate and wrap a raw token
    pub fn new(token: impl Into<String>) -> ClusterResult<Self> {
        let token = token.into();
        validate_cluster_token(&token)?;
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the client for this token is registered
    pub fn key(&self) -> ClusterKey {
        ClusterKey(format!("{CLUSTER_KEY_PREFIX}{}", self.0))
    }
}

impl fmt::Display for ClusterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClusterToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Registry key derived from a [`ClusterToken`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterKey(String);

impl ClusterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token this key was derived from
    pub fn token(&self) -> &str {
        &self.0[CLUSTER_KEY_PREFIX.len()..]
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject missing, blank or padded tokens
pub fn validate_cluster_token(token: &str) -> ClusterResult<()> {
    if token.is_empty() {
        return Err(ClusterError::Configuration(
            "cluster_token is required and must not be empty".to_string(),
        ));
    }
    if token.trim().is_empty() {
        return Err(ClusterError::Configuration(
            "cluster_token must not be blank".to_string(),
        ));
    }
    if token.trim() != token {
        return Err(ClusterError::Configuration(format!(
            "cluster_token '{token}' must not have leading or trailing whitespace"
        )));
    }
    Ok(())
}
