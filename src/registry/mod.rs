//! # Registry Infrastructure
//!
//! Token-keyed storage for cluster clients and their lifecycle state.
//!
//! ## Architecture
//!
//! ```text
//! ClusterRegistry<K: ClusterConnector>
//! └── DashMap<ClusterKey, Arc<RegistryEntry>>
//!       └── tokio::Mutex<EntryState>   (Pending → Ready → Closed)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use redis_cluster_registry::{
//!     ClusterContainer, ClusterModuleOptions, ClusterOptions, RedisCluster, RedisClusterModule,
//! };
//!
//! # tokio_test::block_on(async {
//! let container = ClusterContainer::redis();
//! container.install(RedisClusterModule::register(ClusterModuleOptions::<RedisCluster>::new(
//!     "cache-a",
//!     ClusterOptions::new(["redis://127.0.0.1:7000"]),
//! ))?)?;
//!
//! // Installed but not yet connected
//! assert_eq!(container.registry().state_label("cache-a").await?, "pending");
//! assert!(container.registry().get("cache-a").await?.is_none());
//!
//! // Shutting down an unconstructed entry never touches the network
//! container.shutdown().await?;
//! assert!(container.registry().is_closed("cache-a").await?);
//! # Ok::<(), redis_cluster_registry::ClusterError>(())
//! # }).unwrap();
//! ```

pub mod cluster_registry;

pub use cluster_registry::ClusterRegistry;
