#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Redis Cluster Registry
//!
//! Token-keyed registration of Redis cluster clients with lazy construction and
//! graceful shutdown.
//!
//! ## Overview
//!
//! An application declares each cluster it talks to as a module: a unique token,
//! connection options (inline or from an async factory), and an optional
//! `before_shutdown` callback. The composition root installs those modules, hands
//! out the same client to every consumer of a token, and on shutdown runs the
//! callback and closes each client that was actually constructed.
//!
//! Cluster routing, redirects, pooling and retries are left to the `redis` crate.
//!
//! ## Module Organization
//!
//! - [`module`] - `register` / `register_async` and the shutdown hook
//! - [`providers`] - Token, options and client bindings
//! - [`registry`] - Token → client storage with once-only construction
//! - [`container`] - Composition root: install, resolve, shutdown
//! - [`client`] - Connector seam and the Redis cluster implementation
//! - [`config`] - Cluster options and file/env loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing setup and lifecycle log helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redis_cluster_registry::{
//!     BoxError, ClusterConfig, ClusterContainer, ClusterModuleAsyncOptions, ClusterOptions,
//!     RedisCluster, RedisClusterModule,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut container = ClusterContainer::redis();
//! container.provide("cluster_password", String::from("s3cret"));
//!
//! let sessions = ClusterModuleAsyncOptions::<RedisCluster>::new("sessions", |deps| async move {
//!     let password = deps.require::<String>("cluster_password")?;
//!     Ok::<_, BoxError>(ClusterConfig::new(
//!         ClusterOptions::new(["redis://10.0.0.1:7000"]).with_password(password.as_str()),
//!     ))
//! })
//! .with_import("cluster_password");
//!
//! container.install(RedisClusterModule::register_async(sessions)?)?;
//!
//! let cluster = container.resolve("sessions").await?;
//! assert!(cluster.ping().await?);
//!
//! container.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod container;
pub mod dependencies;
pub mod error;
pub mod logging;
pub mod module;
pub mod providers;
pub mod registry;
pub mod token;

pub use client::{ClusterConnector, ClusterHandle, RedisCluster, RedisClusterConnector};
pub use config::{ClusterEntry, ClusterOptions, RegistryConfig, TlsSetting};
pub use container::ClusterContainer;
pub use dependencies::Dependencies;
pub use error::{BoxError, ClusterError, ClusterResult};
pub use module::{
    ApplicationShutdown, ClusterModuleAsyncOptions, ClusterModuleOptions, ClusterShutdownHook,
    ModuleDescriptor, RedisClusterModule,
};
pub use providers::{BeforeShutdown, ClusterConfig, OptionsFactory, OptionsProvider, Provider};
pub use registry::ClusterRegistry;
pub use token::{ClusterKey, ClusterToken};
