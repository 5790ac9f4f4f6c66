//! # Redis Cluster Module
//!
//! Declarative registration of Redis cluster clients and the shutdown hook that
//! releases them.
//!
//! ## Overview
//!
//! [`RedisClusterModule::register`] and [`RedisClusterModule::register_async`]
//! validate the cluster token and return a [`ModuleDescriptor`]. The descriptor
//! only declares wiring; nothing connects until the composition root
//! ([`crate::container::ClusterContainer`]) resolves the client for the first time.
//!
//! ## Lifecycle
//!
//! ```text
//! unconstructed ──resolve──▶ constructed ──before_shutdown──▶ closed
//!       │                                                       ▲
//!       └──────────────────────── shutdown ─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use redis_cluster_registry::client::RedisCluster;
//! use redis_cluster_registry::config::ClusterOptions;
//! use redis_cluster_registry::container::ClusterContainer;
//! use redis_cluster_registry::module::{ClusterModuleOptions, RedisClusterModule};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let container = ClusterContainer::redis();
//!
//! let options = ClusterModuleOptions::<RedisCluster>::new(
//!     "cache-a",
//!     ClusterOptions::new(["redis://10.0.0.1:7000", "redis://10.0.0.2:7000"]),
//! )
//! .with_before_shutdown(|cluster| async move {
//!     tracing::info!(token = %cluster.token(), "flushing local buffers");
//!     Ok::<(), redis_cluster_registry::BoxError>(())
//! });
//!
//! container.install(RedisClusterModule::register(options)?)?;
//! let cluster = container.resolve("cache-a").await?;
//! let _conn = cluster.connection()?;
//!
//! container.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use crate::client::ClusterConnector;
use crate::config::ClusterOptions;
use crate::constants::CLUSTER_MODULE_NAME;
use crate::dependencies::Dependencies;
use crate::error::{BoxError, ClusterResult};
use crate::providers::{
    self, client_provider, options_async_provider, options_provider, token_provider,
    BeforeShutdown, ClusterConfig, OptionsFactory, Provider,
};
use crate::registry::ClusterRegistry;
use crate::token::{ClusterKey, ClusterToken};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Input to [`RedisClusterModule::register`]
pub struct ClusterModuleOptions<C> {
    pub cluster_token: String,
    pub options: ClusterOptions,
    pub before_shutdown: Option<BeforeShutdown<C>>,
}

impl<C> ClusterModuleOptions<C> {
    pub fn new(cluster_token: impl Into<String>, options: ClusterOptions) -> Self {
        Self {
            cluster_token: cluster_token.into(),
            options,
            before_shutdown: None,
        }
    }
}

impl<C: Send + Sync + 'static> ClusterModuleOptions<C> {
    /// Run `hook` with the live client before it is closed at shutdown
    pub fn with_before_shutdown<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.before_shutdown = Some(providers::before_shutdown(hook));
        self
    }
}

impl<C> fmt::Debug for ClusterModuleOptions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterModuleOptions")
            .field("cluster_token", &self.cluster_token)
            .field("options", &self.options)
            .field("before_shutdown", &self.before_shutdown.is_some())
            .finish()
    }
}

/// Input to [`RedisClusterModule::register_async`]
pub struct ClusterModuleAsyncOptions<C> {
    pub cluster_token: String,
    /// Names of dependencies the factory needs from the composition root
    pub imports: Vec<String>,
    pub factory: OptionsFactory<C>,
}

impl<C: Send + Sync + 'static> ClusterModuleAsyncOptions<C> {
    pub fn new<F, Fut>(cluster_token: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ClusterConfig<C>, BoxError>> + Send + 'static,
    {
        Self {
            cluster_token: cluster_token.into(),
            imports: Vec::new(),
            factory: providers::options_factory(factory),
        }
    }
}

impl<C> ClusterModuleAsyncOptions<C> {
    pub fn with_import(mut self, name: impl Into<String>) -> Self {
        self.imports.push(name.into());
        self
    }
}

impl<C> fmt::Debug for ClusterModuleAsyncOptions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterModuleAsyncOptions")
            .field("cluster_token", &self.cluster_token)
            .field("imports", &self.imports)
            .finish()
    }
}

/// Declarative bundle consumed by the composition root
pub struct ModuleDescriptor<C> {
    pub module: &'static str,
    pub imports: Vec<String>,
    pub providers: Vec<Provider<C>>,
    pub exports: Vec<ClusterKey>,
}

impl<C> fmt::Debug for ModuleDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("module", &self.module)
            .field("imports", &self.imports)
            .field("providers", &self.providers)
            .field("exports", &self.exports)
            .finish()
    }
}

/// Entry points for declaring cluster clients
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisClusterModule;

impl RedisClusterModule {
    /// Declare a cluster client with options known up front
    pub fn register<C>(options: ClusterModuleOptions<C>) -> ClusterResult<ModuleDescriptor<C>> {
        let token = ClusterToken::new(options.cluster_token)?;
        let config = ClusterConfig {
            options: options.options,
            before_shutdown: options.before_shutdown,
        };

        debug!(token = %token, "Declared cluster module");

        Ok(ModuleDescriptor {
            module: CLUSTER_MODULE_NAME,
            imports: Vec::new(),
            providers: vec![
                token_provider(&token),
                options_provider(config),
                client_provider(&token),
            ],
            exports: vec![token.key()],
        })
    }

    /// Declare a cluster client whose options come from an async factory
    ///
    /// The factory runs when the client is first resolved and sees only the
    /// dependencies named in `imports`.
    pub fn register_async<C>(
        options: ClusterModuleAsyncOptions<C>,
    ) -> ClusterResult<ModuleDescriptor<C>> {
        let token = ClusterToken::new(options.cluster_token)?;

        debug!(
            token = %token,
            imports = ?options.imports,
            "Declared async cluster module"
        );

        Ok(ModuleDescriptor {
            module: CLUSTER_MODULE_NAME,
            imports: options.imports,
            providers: vec![
                token_provider(&token),
                options_async_provider(options.factory),
                client_provider(&token),
            ],
            exports: vec![token.key()],
        })
    }
}

/// Hook fired once by the composition root during graceful termination
#[async_trait]
pub trait ApplicationShutdown: Send + Sync {
    async fn on_application_shutdown(&self) -> ClusterResult<()>;

    /// Label used when reporting failures
    fn name(&self) -> String;
}

/// Closes the client registered for one token
pub struct ClusterShutdownHook<K: ClusterConnector> {
    token: ClusterToken,
    registry: Arc<ClusterRegistry<K>>,
}

impl<K: ClusterConnector> ClusterShutdownHook<K> {
    pub fn new(token: ClusterToken, registry: Arc<ClusterRegistry<K>>) -> Self {
        Self { token, registry }
    }

    pub fn token(&self) -> &ClusterToken {
        &self.token
    }
}

impl<K: ClusterConnector> fmt::Debug for ClusterShutdownHook<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterShutdownHook")
            .field("token", &self.token)
            .finish()
    }
}

#[async_trait]
impl<K: ClusterConnector> ApplicationShutdown for ClusterShutdownHook<K> {
    async fn on_application_shutdown(&self) -> ClusterResult<()> {
        self.registry.shutdown(self.token.as_str()).await
    }

    fn name(&self) -> String {
        format!("cluster:{}", self.token)
    }
}
