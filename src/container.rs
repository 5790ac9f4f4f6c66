//! # Cluster Container
//!
//! Composition root for cluster modules. It owns the [`ClusterRegistry`], the
//! dependencies that async factories may import, and the shutdown hooks.
//!
//! ```text
//! install(descriptor) ──▶ registry.insert(token, options)   + shutdown hook
//! resolve(token)      ──▶ registry.get_or_create(token)      (lazy, once)
//! shutdown()          ──▶ hooks in reverse install order     (once)
//! ```

use crate::client::{ClusterConnector, RedisClusterConnector};
use crate::dependencies::Dependencies;
use crate::error::{ClusterError, ClusterResult};
use crate::logging::{log_cluster_operation, log_error};
use crate::module::{ApplicationShutdown, ClusterShutdownHook, ModuleDescriptor};
use crate::providers::{OptionsProvider, Provider};
use crate::registry::ClusterRegistry;
use crate::token::{ClusterKey, ClusterToken};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ClusterContainer<K: ClusterConnector = RedisClusterConnector> {
    registry: Arc<ClusterRegistry<K>>,
    dependencies: Dependencies,
    hooks: Mutex<Vec<Arc<dyn ApplicationShutdown>>>,
    shut_down: AtomicBool,
}

impl<K: ClusterConnector> fmt::Debug for ClusterContainer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterContainer")
            .field("registry", &self.registry)
            .field("dependencies", &self.dependencies)
            .field("hooks", &self.hooks.lock().len())
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

impl ClusterContainer<RedisClusterConnector> {
    /// Container backed by the production Redis cluster connector
    pub fn redis() -> Self {
        Self::new(RedisClusterConnector::new())
    }
}

impl<K: ClusterConnector> ClusterContainer<K> {
    pub fn new(connector: K) -> Self {
        Self {
            registry: Arc::new(ClusterRegistry::new(connector)),
            dependencies: Dependencies::new(),
            hooks: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<ClusterRegistry<K>> {
        &self.registry
    }

    /// Make `value` importable by async options factories under `name`
    pub fn provide<T>(&mut self, name: impl Into<String>, value: T) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.dependencies.insert(name, value);
        self
    }

    /// Wire a module descriptor into the container
    ///
    /// Fails if the descriptor is malformed, imports something that was never
    /// provided, or reuses a token. Nothing is constructed here.
    pub fn install(&self, descriptor: ModuleDescriptor<K::Client>) -> ClusterResult<ClusterKey> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ClusterError::Configuration(
                "cannot install modules after shutdown".to_string(),
            ));
        }

        let ModuleDescriptor {
            module,
            imports,
            providers,
            exports,
        } = descriptor;

        let mut token: Option<ClusterToken> = None;
        let mut options: Option<OptionsProvider<K::Client>> = None;
        let mut client_key: Option<ClusterKey> = None;

        for provider in providers {
            match provider {
                Provider::Token(t) if token.is_none() => token = Some(t),
                Provider::Options(o) if options.is_none() => options = Some(o),
                Provider::Client(k) if client_key.is_none() => client_key = Some(k),
                other => {
                    return Err(ClusterError::Configuration(format!(
                        "{module} descriptor has a repeated provider: {other:?}"
                    )))
                }
            }
        }

        let (token, options, client_key) = match (token, options, client_key) {
            (Some(t), Some(o), Some(k)) => (t, o, k),
            _ => {
                return Err(ClusterError::Configuration(format!(
                    "{module} descriptor must provide a token, options and a client"
                )))
            }
        };

        if client_key != token.key() || exports != [client_key.clone()] {
            return Err(ClusterError::Configuration(format!(
                "{module} descriptor for '{token}' must export exactly its own client key"
            )));
        }

        if let Some(missing) = imports.iter().find(|name| !self.dependencies.contains(name)) {
            return Err(ClusterError::UnresolvedImport {
                token: token.to_string(),
                import: missing.clone(),
            });
        }

        let is_async = options.is_async();
        let key = self.registry.insert(token.clone(), options, imports)?;
        self.hooks
            .lock()
            .push(Arc::new(ClusterShutdownHook::new(token.clone(), Arc::clone(&self.registry))));

        log_cluster_operation(
            "register",
            token.as_str(),
            "installed",
            Some(if is_async { "async options" } else { "static options" }),
        );

        Ok(key)
    }

    /// Register an extra hook to run alongside the cluster shutdown hooks
    pub fn add_shutdown_hook(&self, hook: Arc<dyn ApplicationShutdown>) {
        self.hooks.lock().push(hook);
    }

    /// Client for `token`, constructed on first call
    pub async fn resolve(&self, token: &str) -> ClusterResult<Arc<K::Client>> {
        self.registry.get_or_create(token, &self.dependencies).await
    }

    /// Fire every shutdown hook, most recently installed first
    ///
    /// Each hook runs even if an earlier one failed. Returns the first failure.
    /// Only the first call does anything.
    pub async fn shutdown(&self) -> ClusterResult<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Cluster container already shut down");
            return Ok(());
        }

        let hooks: Vec<Arc<dyn ApplicationShutdown>> =
            self.hooks.lock().iter().rev().cloned().collect();

        info!(hooks = hooks.len(), "Running cluster shutdown hooks");

        let mut first_error = None;
        for hook in hooks {
            if let Err(e) = hook.on_application_shutdown().await {
                log_error(
                    "ClusterContainer",
                    "shutdown",
                    &e.to_string(),
                    Some(&hook.name()),
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}
