//! Connector and handle traits for cluster clients

use crate::config::ClusterOptions;
use crate::error::ClusterResult;
use crate::token::ClusterToken;
use async_trait::async_trait;

/// Builds a long-lived client for one cluster token
///
/// Called at most once per token by the registry, on first resolution.
#[async_trait]
pub trait ClusterConnector: Send + Sync + 'static {
    type Client: ClusterHandle;

    /// Construct the client from validated options
    ///
    /// Failures should be reported as `ClusterError::ResourceConstruction`.
    async fn connect(
        &self,
        token: &ClusterToken,
        options: &ClusterOptions,
    ) -> ClusterResult<Self::Client>;
}

/// A live client owned by the registry
#[async_trait]
pub trait ClusterHandle: Send + Sync + 'static {
    /// Stop accepting new work and release the connection
    ///
    /// Work already in flight is left to the client library to drain.
    async fn close(&self) -> ClusterResult<()>;
}
