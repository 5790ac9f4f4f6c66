//! Error types for cluster registration, construction and shutdown.

use thiserror::Error;

/// Error type returned by user supplied callbacks (`before_shutdown`, options factories)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Configuration load error: {0}")]
    ConfigLoad(String),
    #[error("Cluster token '{0}' is already registered")]
    DuplicateToken(String),
    #[error("Cluster '{token}' imports '{import}' but no such dependency was provided")]
    UnresolvedImport { token: String, import: String },
    #[error("Cluster token '{0}' is not registered")]
    UnknownToken(String),
    #[error("Failed to construct cluster '{token}': {reason}")]
    ResourceConstruction { token: String, reason: String },
    #[error("Options factory for cluster '{token}' failed: {reason}")]
    OptionsFactory { token: String, reason: String },
    #[error("before_shutdown hook for cluster '{token}' failed: {reason}")]
    ShutdownHook { token: String, reason: String },
    #[error("Failed to close cluster '{token}': {reason}")]
    Close { token: String, reason: String },
    #[error("Cluster '{0}' has already been closed")]
    AlreadyClosed(String),
}

impl ClusterError {
    /// Whether this error is raised at registration time rather than at runtime
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::ConfigLoad(_)
                | Self::DuplicateToken(_)
                | Self::UnresolvedImport { .. }
        )
    }
}

impl From<config::ConfigError> for ClusterError {
    fn from(error: config::ConfigError) -> Self {
        ClusterError::ConfigLoad(error.to_string())
    }
}

pub type ClusterResult<T> = std::result::Result<T, ClusterError>;
