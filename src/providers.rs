//! Provider bindings that make up a cluster module descriptor.
//!
//! Every descriptor carries three bindings derived from one token: the token
//! itself, the options (a value or a deferred factory), and the client keyed by
//! [`ClusterKey`].

use crate::config::ClusterOptions;
use crate::dependencies::Dependencies;
use crate::error::{BoxError, ClusterError, ClusterResult};
use crate::token::{ClusterKey, ClusterToken};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Callback run with the live client right before it is closed
pub type BeforeShutdown<C> =
    Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Deferred producer of a cluster's configuration
pub type OptionsFactory<C> =
    Arc<dyn Fn(Dependencies) -> BoxFuture<'static, Result<ClusterConfig<C>, BoxError>> + Send + Sync>;

/// Wrap an async closure as a [`BeforeShutdown`] callback
pub fn before_shutdown<C, F, Fut>(hook: F) -> BeforeShutdown<C>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |client| hook(client).boxed())
}

/// Wrap an async closure as an [`OptionsFactory`]
pub fn options_factory<C, F, Fut>(factory: F) -> OptionsFactory<C>
where
    C: Send + Sync + 'static,
    F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ClusterConfig<C>, BoxError>> + Send + 'static,
{
    Arc::new(move |dependencies| factory(dependencies).boxed())
}

/// Resolved configuration for one cluster client
pub struct ClusterConfig<C> {
    pub options: ClusterOptions,
    pub before_shutdown: Option<BeforeShutdown<C>>,
}

impl<C> ClusterConfig<C> {
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            options,
            before_shutdown: None,
        }
    }
}

impl<C> Clone for ClusterConfig<C> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            before_shutdown: self.before_shutdown.clone(),
        }
    }
}

impl<C> fmt::Debug for ClusterConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("options", &self.options)
            .field("before_shutdown", &self.before_shutdown.is_some())
            .finish()
    }
}

/// Source of a cluster's configuration
pub enum OptionsProvider<C> {
    Value(ClusterConfig<C>),
    Factory(OptionsFactory<C>),
}

impl<C> fmt::Debug for OptionsProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(config) => f.debug_tuple("Value").field(config).finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

impl<C> OptionsProvider<C> {
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    /// Produce the validated configuration, awaiting the factory if there is one
    pub async fn resolve(
        &self,
        token: &ClusterToken,
        dependencies: Dependencies,
    ) -> ClusterResult<ClusterConfig<C>> {
        let config = match self {
            Self::Value(config) => config.clone(),
            Self::Factory(factory) => {
                factory(dependencies)
                    .await
                    .map_err(|e| ClusterError::OptionsFactory {
                        token: token.to_string(),
                        reason: e.to_string(),
                    })?
            }
        };

        config.options.validate().map_err(|e| match e {
            ClusterError::Configuration(reason) => {
                ClusterError::Configuration(format!("cluster '{token}': {reason}"))
            }
            other => other,
        })?;

        Ok(config)
    }
}

/// One binding in a module descriptor
pub enum Provider<C> {
    /// Raw token, for recomputing the client key later
    Token(ClusterToken),
    /// Options for the token's client
    Options(OptionsProvider<C>),
    /// Lazily constructed client, registered under the key
    Client(ClusterKey),
}

impl<C> fmt::Debug for Provider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => f.debug_tuple("Token").field(token).finish(),
            Self::Options(options) => f.debug_tuple("Options").field(options).finish(),
            Self::Client(key) => f.debug_tuple("Client").field(key).finish(),
        }
    }
}

pub fn token_provider<C>(token: &ClusterToken) -> Provider<C> {
    Provider::Token(token.clone())
}

pub fn options_provider<C>(config: ClusterConfig<C>) -> Provider<C> {
    Provider::Options(OptionsProvider::Value(config))
}

pub fn options_async_provider<C>(factory: OptionsFactory<C>) -> Provider<C> {
    Provider::Options(OptionsProvider::Factory(factory))
}

pub fn client_provider<C>(token: &ClusterToken) -> Provider<C> {
    Provider::Client(token.key())
}
