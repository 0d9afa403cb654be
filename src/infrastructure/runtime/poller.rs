//! Periodic RPC pollers, one tokio task per poll spec

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::infrastructure::rpc::RpcClient;

/// Pause before the first request, so the app loop is running when the first
/// results arrive
pub const STARTUP_DELAY: Duration = Duration::from_millis(100);

/// One periodically issued request
#[derive(Debug, Clone, PartialEq)]
pub struct PollSpec {
    pub method: String,
    pub params: Vec<Value>,
    pub interval: Duration,
}

impl PollSpec {
    pub fn new(method: impl Into<String>, interval: Duration) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            interval,
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

/// Receiver of successful poll results
#[async_trait::async_trait]
pub trait PollSink: Send + Sync + 'static {
    async fn deliver(&self, spec: &PollSpec, result: Value);
}

/// Spawns and stops the poll tasks.
///
/// A failed request is logged and skipped; the task sleeps its interval and
/// tries again. Tasks only end when shutdown is signalled.
pub struct PollingScheduler {
    client: Arc<dyn RpcClient>,
    sink: Arc<dyn PollSink>,
    startup_delay: Duration,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PollingScheduler {
    pub fn new(client: Arc<dyn RpcClient>, sink: Arc<dyn PollSink>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            client,
            sink,
            startup_delay: STARTUP_DELAY,
            shutdown,
            tasks: Vec::new(),
        }
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Receiver that observes this scheduler's shutdown signal
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn spawn(&mut self, spec: PollSpec) {
        tracing::debug!(method = %spec.method, interval = ?spec.interval, "starting poller");
        let task = tokio::spawn(run_poller(
            Arc::clone(&self.client),
            Arc::clone(&self.sink),
            spec,
            self.startup_delay,
            self.shutdown.subscribe(),
        ));
        self.tasks.push(task);
    }

    pub fn spawn_all(&mut self, specs: impl IntoIterator<Item = PollSpec>) {
        for spec in specs {
            self.spawn(spec);
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal every task and wait up to `grace` for them to finish.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.shutdown.send(true);
        let joined = futures::future::join_all(self.tasks);
        if tokio::time::timeout(grace, joined).await.is_err() {
            tracing::warn!("pollers did not stop within {grace:?}");
        }
    }
}

/// Wait for the shutdown signal. A dropped sender counts as shutdown.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn run_poller(
    client: Arc<dyn RpcClient>,
    sink: Arc<dyn PollSink>,
    spec: PollSpec,
    startup_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::select! {
        _ = wait_for_shutdown(&mut shutdown) => return,
        _ = tokio::time::sleep(startup_delay) => {}
    }

    loop {
        let outcome = tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => return,
            outcome = client.request(&spec.method, spec.params.clone()) => outcome,
        };

        match outcome {
            Ok(result) => {
                tokio::select! {
                    _ = wait_for_shutdown(&mut shutdown) => return,
                    _ = sink.deliver(&spec, result) => {}
                }
            }
            Err(err) => {
                tracing::warn!(method = %spec.method, error = %err, "poll failed, skipping cycle");
            }
        }

        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => return,
            _ = tokio::time::sleep(spec.interval) => {}
        }
    }
}
