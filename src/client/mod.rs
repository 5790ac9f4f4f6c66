//! # Cluster Client Seam
//!
//! The registry never talks to Redis itself. It asks a [`ClusterConnector`] to
//! build a client for a token and later asks the resulting [`ClusterHandle`] to
//! close. [`RedisClusterConnector`] is the production implementation on top of
//! `redis::cluster`; tests substitute their own.
//!
//! ```text
//! ClusterConnector (trait)
//!   └── RedisClusterConnector  -> RedisCluster (ClusterHandle)
//! ```

pub mod redis;
pub mod traits;

pub use self::redis::{RedisCluster, RedisClusterConnector};
pub use traits::{ClusterConnector, ClusterHandle};
