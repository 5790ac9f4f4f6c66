use async_trait::async_trait;
use redis_cluster_registry::{
    ClusterConnector, ClusterError, ClusterHandle, ClusterOptions, ClusterResult, ClusterToken,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered record of lifecycle calls (`connect:x`, `before_shutdown:x`, `close:x`)
#[derive(Clone, Default, Debug)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// Connector that records calls instead of talking to Redis
#[derive(Debug, Default)]
pub struct MockConnector {
    pub events: EventLog,
    pub connects: Arc<AtomicUsize>,
    fail_connect: bool,
    fail_close: bool,
    connect_delay: Option<Duration>,
}

impl MockConnector {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterConnector for MockConnector {
    type Client = MockClient;

    async fn connect(
        &self,
        token: &ClusterToken,
        options: &ClusterOptions,
    ) -> ClusterResult<MockClient> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.events.push(format!("connect:{token}"));

        if self.fail_connect {
            return Err(ClusterError::ResourceConstruction {
                token: token.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        Ok(MockClient {
            token: token.to_string(),
            nodes: options.nodes.clone(),
            events: self.events.clone(),
            fail_close: self.fail_close,
        })
    }
}

#[derive(Debug)]
pub struct MockClient {
    pub token: String,
    pub nodes: Vec<String>,
    events: EventLog,
    fail_close: bool,
}

impl MockClient {
    pub fn record(&self, event: &str) {
        self.events.push(format!("{event}:{}", self.token));
    }
}

#[async_trait]
impl ClusterHandle for MockClient {
    async fn close(&self) -> ClusterResult<()> {
        self.events.push(format!("close:{}", self.token));
        if self.fail_close {
            return Err(ClusterError::Close {
                token: self.token.clone(),
                reason: "socket already torn down".to_string(),
            });
        }
        Ok(())
    }
}
