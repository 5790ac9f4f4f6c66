//! # Cluster Registry
//!
//! Process-scoped map from cluster token to live client.
//!
//! ## Key Features
//!
//! - **Lazy construction**: a client is built on first [`ClusterRegistry::get_or_create`]
//! - **At most once**: each entry is guarded by its own async mutex, so concurrent
//!   resolvers wait and observe the same `Arc`
//! - **Ordered teardown**: `before_shutdown` runs before `close`, and `close` is
//!   skipped if the hook fails
//! - **Idempotent shutdown**: a closed entry stays closed; repeat shutdowns succeed
//!   without touching the client

use crate::client::{ClusterConnector, ClusterHandle};
use crate::dependencies::Dependencies;
use crate::error::{ClusterError, ClusterResult};
use crate::logging::log_cluster_operation;
use crate::providers::{BeforeShutdown, OptionsProvider};
use crate::token::{ClusterKey, ClusterToken};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Lifecycle of one registered client
enum EntryState<C> {
    /// Registered, never resolved
    Pending,
    /// Constructed and owned by the registry
    Ready {
        client: Arc<C>,
        before_shutdown: Option<BeforeShutdown<C>>,
    },
    /// Shut down; never constructed again
    Closed,
}

impl<C> EntryState<C> {
    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready { .. } => "ready",
            Self::Closed => "closed",
        }
    }
}

struct RegistryEntry<C> {
    token: ClusterToken,
    options: OptionsProvider<C>,
    imports: Vec<String>,
    state: Mutex<EntryState<C>>,
}

/// Registry of cluster clients keyed by [`ClusterKey`]
pub struct ClusterRegistry<K: ClusterConnector> {
    connector: K,
    entries: DashMap<ClusterKey, Arc<RegistryEntry<K::Client>>>,
}

impl<K: ClusterConnector> fmt::Debug for ClusterRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterRegistry")
            .field("tokens", &self.tokens())
            .finish()
    }
}

impl<K: ClusterConnector> ClusterRegistry<K> {
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            entries: DashMap::new(),
        }
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }

    /// Register a token without constructing its client
    pub fn insert(
        &self,
        token: ClusterToken,
        options: OptionsProvider<K::Client>,
        imports: Vec<String>,
    ) -> ClusterResult<ClusterKey> {
        let key = token.key();
        match self.entries.entry(key.clone()) {
            Entry::Occupied(_) => Err(ClusterError::DuplicateToken(token.to_string())),
            Entry::Vacant(vacant) => {
                debug!(token = %token, key = %key, "Registered cluster entry");
                vacant.insert(Arc::new(RegistryEntry {
                    token,
                    options,
                    imports,
                    state: Mutex::new(EntryState::Pending),
                }));
                Ok(key)
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        ClusterToken::new(token)
            .map(|token| self.entries.contains_key(&token.key()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tokens, sorted
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.value().token.to_string())
            .collect();
        tokens.sort();
        tokens
    }

    fn entry(&self, token: &str) -> ClusterResult<Arc<RegistryEntry<K::Client>>> {
        let key = ClusterToken::new(token)?.key();
        // Clone the Arc out so no map guard is held across an await
        self.entries
            .get(&key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClusterError::UnknownToken(token.to_string()))
    }

    /// Return the client for `token`, constructing it on first use
    ///
    /// `dependencies` is narrowed to the entry's declared imports before an
    /// options factory sees it. A failed construction leaves the entry pending so a
    /// later call can retry.
    pub async fn get_or_create(
        &self,
        token: &str,
        dependencies: &Dependencies,
    ) -> ClusterResult<Arc<K::Client>> {
        let entry = self.entry(token)?;
        let mut state = entry.state.lock().await;

        match &*state {
            EntryState::Ready { client, .. } => return Ok(Arc::clone(client)),
            EntryState::Closed => return Err(ClusterError::AlreadyClosed(token.to_string())),
            EntryState::Pending => {}
        }

        let config = entry
            .options
            .resolve(&entry.token, dependencies.subset(&entry.imports))
            .await?;

        let client = self
            .connector
            .connect(&entry.token, &config.options)
            .await
            .map_err(|e| match e {
                ClusterError::ResourceConstruction { .. } | ClusterError::Configuration(_) => e,
                other => ClusterError::ResourceConstruction {
                    token: entry.token.to_string(),
                    reason: other.to_string(),
                },
            })?;
        let client = Arc::new(client);

        log_cluster_operation(
            "construct",
            entry.token.as_str(),
            "ready",
            Some(if entry.options.is_async() {
                "options from async factory"
            } else {
                "options from value"
            }),
        );

        *state = EntryState::Ready {
            client: Arc::clone(&client),
            before_shutdown: config.before_shutdown,
        };
        Ok(client)
    }

    /// Existing client for `token`, without constructing one
    ///
    /// Waits for a construction already in progress.
    pub async fn get(&self, token: &str) -> ClusterResult<Option<Arc<K::Client>>> {
        let entry = self.entry(token)?;
        let state = entry.state.lock().await;
        Ok(match &*state {
            EntryState::Ready { client, .. } => Some(Arc::clone(client)),
            EntryState::Pending | EntryState::Closed => None,
        })
    }

    pub async fn is_closed(&self, token: &str) -> ClusterResult<bool> {
        let entry = self.entry(token)?;
        let state = entry.state.lock().await;
        Ok(matches!(&*state, EntryState::Closed))
    }

    /// Lifecycle label for `token`: `pending`, `ready` or `closed`
    pub async fn state_label(&self, token: &str) -> ClusterResult<&'static str> {
        let entry = self.entry(token)?;
        let state = entry.state.lock().await;
        Ok(state.label())
    }

    /// Release the client for `token`
    ///
    /// Waits for an in-flight construction, then runs `before_shutdown` followed by
    /// `close`. A never-constructed entry is marked closed without calling either.
    /// If `before_shutdown` fails, `close` is not called and the entry stays ready.
    pub async fn shutdown(&self, token: &str) -> ClusterResult<()> {
        let entry = self.entry(token)?;
        let key = entry.token.key();
        let mut state = entry.state.lock().await;

        let ready = match &*state {
            EntryState::Pending => None,
            EntryState::Closed => {
                debug!(token = %entry.token, key = %key, "Cluster already closed");
                return Ok(());
            }
            EntryState::Ready {
                client,
                before_shutdown,
            } => Some((Arc::clone(client), before_shutdown.clone())),
        };

        let Some((client, before_shutdown)) = ready else {
            debug!(token = %entry.token, key = %key, "Cluster never constructed, nothing to close");
            *state = EntryState::Closed;
            return Ok(());
        };

        if let Some(hook) = before_shutdown {
            hook(Arc::clone(&client))
                .await
                .map_err(|e| ClusterError::ShutdownHook {
                    token: entry.token.to_string(),
                    reason: e.to_string(),
                })?;
        }

        client.close().await.map_err(|e| match e {
            ClusterError::Close { .. } => e,
            other => ClusterError::Close {
                token: entry.token.to_string(),
                reason: other.to_string(),
            },
        })?;

        *state = EntryState::Closed;
        info!(token = %entry.token, "Closed connections for cluster:{}", entry.token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterOptions;
    use crate::providers::ClusterConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingConnector {
        connects: AtomicUsize,
    }

    #[derive(Debug)]
    struct CountingClient;

    #[async_trait]
    impl ClusterHandle for CountingClient {
        async fn close(&self) -> ClusterResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ClusterConnector for CountingConnector {
        type Client = CountingClient;

        async fn connect(
            &self,
            _token: &ClusterToken,
            _options: &crate::config::ClusterOptions,
        ) -> ClusterResult<CountingClient> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(CountingClient)
        }
    }

    fn value_options() -> OptionsProvider<CountingClient> {
        OptionsProvider::Value(ClusterConfig::new(ClusterOptions::new([
            "redis://127.0.0.1:7000",
        ])))
    }

    fn registry_with(token: &str) -> ClusterRegistry<CountingConnector> {
        let registry = ClusterRegistry::new(CountingConnector::default());
        registry
            .insert(ClusterToken::new(token).unwrap(), value_options(), Vec::new())
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let registry = registry_with("cache-a");
        let err = registry
            .insert(ClusterToken::new("cache-a").unwrap(), value_options(), Vec::new())
            .unwrap_err();
        assert_eq!(err, ClusterError::DuplicateToken("cache-a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_constructs_once() {
        let registry = registry_with("cache-a");
        let deps = Dependencies::new();

        let first = registry.get_or_create("cache-a", &deps).await.unwrap();
        let second = registry.get_or_create("cache-a", &deps).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.connector().connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_shares_instance() {
        let registry = Arc::new(registry_with("cache-a"));
        let deps = Dependencies::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let deps = deps.clone();
                tokio::spawn(async move { registry.get_or_create("cache-a", &deps).await })
            })
            .collect();

        let mut clients = Vec::new();
        for handle in handles {
            clients.push(handle.await.unwrap().unwrap());
        }

        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.connector().connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_does_not_construct() {
        let registry = registry_with("cache-a");
        assert!(registry.get("cache-a").await.unwrap().is_none());
        assert_eq!(registry.state_label("cache-a").await.unwrap(), "pending");
        assert_eq!(registry.connector().connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let registry = registry_with("cache-a");
        let err = registry
            .get_or_create("cache-z", &Dependencies::new())
            .await
            .unwrap_err();
        assert_eq!(err, ClusterError::UnknownToken("cache-z".to_string()));
    }

    #[tokio::test]
    async fn test_shutdown_unconstructed_is_noop_and_blocks_later_resolution() {
        let registry = registry_with("cache-a");

        registry.shutdown("cache-a").await.unwrap();
        assert!(registry.is_closed("cache-a").await.unwrap());
        assert_eq!(registry.connector().connects.load(Ordering::SeqCst), 0);

        let err = registry
            .get_or_create("cache-a", &Dependencies::new())
            .await
            .unwrap_err();
        assert_eq!(err, ClusterError::AlreadyClosed("cache-a".to_string()));
    }

    #[tokio::test]
    async fn test_second_shutdown_succeeds_silently() {
        let registry = registry_with("cache-a");
        registry
            .get_or_create("cache-a", &Dependencies::new())
            .await
            .unwrap();

        registry.shutdown("cache-a").await.unwrap();
        registry.shutdown("cache-a").await.unwrap();
        assert_eq!(registry.state_label("cache-a").await.unwrap(), "closed");
    }

    #[test]
    fn test_tokens_sorted() {
        let registry = registry_with("b");
        registry
            .insert(ClusterToken::new("a").unwrap(), value_options(), Vec::new())
            .unwrap();
        assert_eq!(registry.tokens(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.contains("a"));
        assert!(!registry.contains(""));
    }
}
