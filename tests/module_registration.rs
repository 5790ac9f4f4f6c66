//! Module registration: token validation, derived keys, duplicate detection and
//! lazy, once-only construction through the container.

mod common;

use common::*;
use proptest::prelude::*;
use redis_cluster_registry::{
    BoxError, ClusterConfig, ClusterContainer, ClusterError, ClusterModuleAsyncOptions,
    ClusterModuleOptions, ClusterOptions, ClusterToken, RedisClusterModule,
};
use std::sync::Arc;
use std::time::Duration;

fn cluster_options() -> ClusterOptions {
    ClusterOptions::new(["redis://10.0.0.1:7000"])
}

proptest! {
    #[test]
    fn valid_tokens_register_under_prefixed_key(token in valid_token_strategy()) {
        let descriptor = RedisClusterModule::register(
            ClusterModuleOptions::<MockClient>::new(token.clone(), cluster_options()),
        )
        .unwrap();

        prop_assert_eq!(descriptor.exports.len(), 1);
        prop_assert_eq!(descriptor.exports[0].as_str(), format!("redis:cluster:{token}"));
        prop_assert_eq!(descriptor.exports[0].token(), token.as_str());
    }

    #[test]
    fn blank_tokens_are_rejected(token in blank_token_strategy()) {
        let err = RedisClusterModule::register(
            ClusterModuleOptions::<MockClient>::new(token, cluster_options()),
        )
        .unwrap_err();
        prop_assert!(err.is_configuration());
    }

    #[test]
    fn distinct_tokens_get_distinct_keys((a, b) in distinct_token_pair_strategy()) {
        let a = ClusterToken::new(a).unwrap();
        let b = ClusterToken::new(b).unwrap();
        prop_assert_ne!(a.key(), b.key());
    }
}

#[test]
fn padded_token_is_rejected() {
    let err = RedisClusterModule::register(ClusterModuleOptions::<MockClient>::new(
        " cache-a ",
        cluster_options(),
    ))
    .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn duplicate_token_is_rejected_at_install() {
    let container = ClusterContainer::new(MockConnector::default());
    container
        .install(
            RedisClusterModule::register(ClusterModuleOptions::new("cache-a", cluster_options()))
                .unwrap(),
        )
        .unwrap();

    let err = container
        .install(
            RedisClusterModule::register(ClusterModuleOptions::new("cache-a", cluster_options()))
                .unwrap(),
        )
        .unwrap_err();

    assert_eq!(err, ClusterError::DuplicateToken("cache-a".to_string()));
    assert_eq!(container.registry().len(), 1);
}

#[test]
fn unresolved_import_is_rejected_at_install() {
    let container = ClusterContainer::new(MockConnector::default());
    let options = ClusterModuleAsyncOptions::<MockClient>::new("cache-b", |_deps| async {
        Ok::<_, BoxError>(ClusterConfig::new(cluster_options()))
    })
    .with_import("vault");

    let err = container
        .install(RedisClusterModule::register_async(options).unwrap())
        .unwrap_err();

    assert_eq!(
        err,
        ClusterError::UnresolvedImport {
            token: "cache-b".to_string(),
            import: "vault".to_string(),
        }
    );
    assert!(container.registry().is_empty());
}

#[tokio::test]
async fn registration_does_not_connect() {
    let events = EventLog::new();
    let container = ClusterContainer::new(MockConnector::new(events.clone()));
    container
        .install(
            RedisClusterModule::register(ClusterModuleOptions::new("cache-a", cluster_options()))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(container.registry().connector().connect_count(), 0);
    assert_eq!(
        container.registry().state_label("cache-a").await.unwrap(),
        "pending"
    );
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn concurrent_resolves_share_one_client() {
    let events = EventLog::new();
    let container = Arc::new(ClusterContainer::new(
        MockConnector::new(events.clone()).with_connect_delay(Duration::from_millis(20)),
    ));
    container
        .install(
            RedisClusterModule::register(ClusterModuleOptions::new("cache-a", cluster_options()))
                .unwrap(),
        )
        .unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let container = Arc::clone(&container);
            tokio::spawn(async move { container.resolve("cache-a").await })
        })
        .collect();

    let mut clients = Vec::new();
    for handle in handles {
        clients.push(handle.await.unwrap().unwrap());
    }

    assert!(clients.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(events.count("connect:cache-a"), 1);
}

#[tokio::test]
async fn async_factory_sees_only_declared_imports() {
    let mut container = ClusterContainer::new(MockConnector::default());
    container
        .provide("seed_node", String::from("redis://10.9.9.9:7000"))
        .provide("unrelated", 42u32);

    let options = ClusterModuleAsyncOptions::<MockClient>::new("sessions", |deps| async move {
        if deps.contains("unrelated") {
            return Err::<ClusterConfig<MockClient>, BoxError>("leaked dependency".into());
        }
        let seed = deps.require::<String>("seed_node")?;
        Ok(ClusterConfig::new(ClusterOptions::new([seed.as_str()])))
    })
    .with_import("seed_node");

    container
        .install(RedisClusterModule::register_async(options).unwrap())
        .unwrap();

    let client = container.resolve("sessions").await.unwrap();
    assert_eq!(client.nodes, vec!["redis://10.9.9.9:7000".to_string()]);
}

#[tokio::test]
async fn failing_factory_reports_token_and_allows_retry() {
    let container = ClusterContainer::new(MockConnector::default());
    let options = ClusterModuleAsyncOptions::<MockClient>::new("sessions", |_deps| async {
        Err::<ClusterConfig<MockClient>, BoxError>("secret store unavailable".into())
    });
    container
        .install(RedisClusterModule::register_async(options).unwrap())
        .unwrap();

    let err = container.resolve("sessions").await.unwrap_err();
    assert_eq!(
        err,
        ClusterError::OptionsFactory {
            token: "sessions".to_string(),
            reason: "secret store unavailable".to_string(),
        }
    );
    assert_eq!(
        container.registry().state_label("sessions").await.unwrap(),
        "pending"
    );
}

#[tokio::test]
async fn unknown_token_resolution_fails() {
    let container = ClusterContainer::new(MockConnector::default());
    let err = container.resolve("nope").await.unwrap_err();
    assert_eq!(err, ClusterError::UnknownToken("nope".to_string()));
}
