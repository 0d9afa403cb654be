//! Pollers, the node feed and the ticker

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chainpeek::core::LookupError;
use chainpeek::domain::NodeEvent;
use chainpeek::infrastructure::runtime::{
    detect_wallet, spawn_ticker, NodeFeed, PollSink, PollSpec, PollingScheduler, RuntimeEvent,
};
use chainpeek::store::{BlockStore, TransactionStore};
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::watch;

use common::{block, transaction, MockNode};

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(String, Value)>>,
    /// Deliveries for this method never finish
    stalled: Option<String>,
}

impl RecordingSink {
    fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    fn count_of(&self, method: &str) -> usize {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

#[async_trait::async_trait]
impl PollSink for RecordingSink {
    async fn deliver(&self, spec: &PollSpec, result: Value) {
        if self.stalled.as_deref() == Some(spec.method.as_str()) {
            std::future::pending::<()>().await;
        }
        self.delivered
            .lock()
            .unwrap()
            .push((spec.method.clone(), result));
    }
}

#[tokio::test(start_paused = true)]
async fn test_poller_delivers_each_interval() {
    let node = Arc::new(MockNode::new());
    node.set("uptime", "", json!(42));
    let sink = Arc::new(RecordingSink::default());

    let mut scheduler =
        PollingScheduler::new(node.clone(), sink.clone()).with_startup_delay(Duration::ZERO);
    scheduler.spawn(PollSpec::new("uptime", Duration::from_secs(1)));
    assert_eq!(scheduler.len(), 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(sink.count(), 3);
    assert_eq!(sink.delivered.lock().unwrap()[0], ("uptime".to_string(), json!(42)));

    scheduler.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_skips_failed_cycles() {
    let node = Arc::new(MockNode::new());
    node.set("uptime", "", json!(1));
    node.fail("uptime");
    let sink = Arc::new(RecordingSink::default());

    let mut scheduler =
        PollingScheduler::new(node.clone(), sink.clone()).with_startup_delay(Duration::ZERO);
    scheduler.spawn(PollSpec::new("uptime", Duration::from_secs(1)));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(sink.count(), 0);
    assert_eq!(node.calls("uptime"), 3);

    node.recover("uptime");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.count(), 1);

    scheduler.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_failing_and_stalled_pollers_do_not_delay_others() {
    let node = Arc::new(MockNode::new());
    node.set("uptime", "", json!(7));
    node.set("getnettotals", "", json!({}));
    node.fail("getpeerinfo");
    let sink = Arc::new(RecordingSink {
        stalled: Some("getnettotals".into()),
        ..Default::default()
    });

    let mut scheduler =
        PollingScheduler::new(node.clone(), sink.clone()).with_startup_delay(Duration::ZERO);
    scheduler.spawn_all([
        PollSpec::new("getpeerinfo", Duration::from_secs(1)),
        PollSpec::new("getnettotals", Duration::from_secs(1)),
        PollSpec::new("uptime", Duration::from_secs(1)),
    ]);

    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(sink.count_of("uptime"), 5);
    assert_eq!(sink.count_of("getpeerinfo"), 0);
    assert_eq!(sink.count_of("getnettotals"), 0);
    assert_eq!(node.calls("getpeerinfo"), 5);
    assert_eq!(node.calls("getnettotals"), 1);

    scheduler.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_pollers() {
    let node = Arc::new(MockNode::new());
    node.set("uptime", "", json!(1));
    let sink = Arc::new(RecordingSink::default());

    let mut scheduler =
        PollingScheduler::new(node.clone(), sink.clone()).with_startup_delay(Duration::ZERO);
    scheduler.spawn_all([
        PollSpec::new("uptime", Duration::from_secs(1)),
        PollSpec::new("uptime", Duration::from_secs(2)),
    ]);
    tokio::time::sleep(Duration::from_millis(500)).await;
    scheduler.shutdown(Duration::from_secs(1)).await;

    let calls = node.calls("uptime");
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(node.calls("uptime"), calls);
}

#[tokio::test(start_paused = true)]
async fn test_ticker_stops_on_shutdown() {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ticker = spawn_ticker(events_tx, Duration::from_secs(1), shutdown_rx);

    tokio::time::sleep(Duration::from_millis(2200)).await;
    let mut ticks = 0;
    while let Ok(event) = events_rx.try_recv() {
        assert!(matches!(event, RuntimeEvent::Tick(_)));
        ticks += 1;
    }
    assert_eq!(ticks, 3);

    shutdown_tx.send(true).unwrap();
    ticker.await.unwrap();
}

fn feed(node: &Arc<MockNode>) -> (NodeFeed, BlockStore, UnboundedReceiver<RuntimeEvent>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let blocks = BlockStore::new(node.clone());
    let feed = NodeFeed::new(
        node.clone(),
        blocks.clone(),
        TransactionStore::new(node.clone()),
        events_tx,
    );
    (feed, blocks, events_rx)
}

fn drain(events: &mut UnboundedReceiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn header(hash: &str, height: u64) -> Value {
    json!({"hash": hash, "height": height, "time": 1_600_000_000, "chainwork": "0100"})
}

fn best_hash_spec() -> PollSpec {
    PollSpec::new("getbestblockhash", Duration::from_secs(1))
}

#[tokio::test]
async fn test_feed_publishes_header_then_block() {
    let node = Arc::new(MockNode::new());
    node.add_block(block("h1", 1, None, None, &["c1", "t1"]));
    node.set("getblockheader", "h1", header("h1", 1));
    node.add_transaction(transaction("c1", &[None], 1));
    let (feed, blocks, mut events) = feed(&node);

    feed.deliver(&best_hash_spec(), json!("h1")).await;
    let published = drain(&mut events);
    assert_eq!(published.len(), 3);
    assert!(matches!(&published[0], RuntimeEvent::Node(NodeEvent::BestBlockHash(h)) if h == "h1"));
    assert!(matches!(&published[1], RuntimeEvent::Node(NodeEvent::BestHeader(h)) if h.height == 1));
    match &published[2] {
        RuntimeEvent::Node(NodeEvent::BestBlock { block, coinbase }) => {
            assert_eq!(block.hash, "h1");
            assert_eq!(coinbase.as_ref().map(|tx| tx.txid.as_str()), Some("c1"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(blocks.best(), Some(("h1".to_string(), 1)));

    // Same tip again: only the hash is republished.
    feed.deliver(&best_hash_spec(), json!("h1")).await;
    let published = drain(&mut events);
    assert_eq!(published.len(), 1);
    assert_eq!(node.calls("getblockheader"), 1);
}

#[tokio::test]
async fn test_feed_reports_reorg_as_fatal() {
    let node = Arc::new(MockNode::new());
    node.add_block(block("h1", 1, None, None, &["c1"]));
    node.add_block(block("h2", 2, Some("h1"), None, &["c2"]));
    node.add_block(block("h2b", 2, Some("h1"), None, &["c2b"]));
    let (feed, _blocks, mut events) = feed(&node);

    feed.deliver(&best_hash_spec(), json!("h1")).await;
    feed.deliver(&best_hash_spec(), json!("h2")).await;
    drain(&mut events);

    feed.deliver(&best_hash_spec(), json!("h2b")).await;
    let fatal = drain(&mut events)
        .into_iter()
        .find_map(|event| match event {
            RuntimeEvent::Fatal(err) => Some(err),
            _ => None,
        });
    assert!(matches!(fatal, Some(LookupError::ReorgDetected { .. })));
}

#[tokio::test]
async fn test_feed_decodes_status_payloads() {
    let node = Arc::new(MockNode::new());
    let (feed, _blocks, mut events) = feed(&node);

    feed.deliver(
        &PollSpec::new("getmempoolinfo", Duration::from_secs(5)),
        json!({"size": 12, "bytes": 3400, "usage": 9000}),
    )
    .await;
    feed.deliver(
        &PollSpec::new("estimatesmartfee", Duration::from_secs(15)).with_params(vec![json!(6)]),
        json!({"feerate": 0.0001, "blocks": 6}),
    )
    .await;
    // Wrong shape: logged and dropped
    feed.deliver(
        &PollSpec::new("getnettotals", Duration::from_secs(1)),
        json!("garbage"),
    )
    .await;

    let published = drain(&mut events);
    assert_eq!(published.len(), 2);
    assert!(matches!(
        &published[0],
        RuntimeEvent::Node(NodeEvent::MempoolInfo(info)) if info.size == 12
    ));
    assert!(matches!(
        &published[1],
        RuntimeEvent::Node(NodeEvent::FeeEstimate { target: 6, estimate }) if estimate.feerate == Some(0.0001)
    ));
}

#[tokio::test]
async fn test_detect_wallet() {
    let node = Arc::new(MockNode::new());
    assert!(!detect_wallet(node.as_ref()).await);

    node.set(
        "getwalletinfo",
        "",
        json!({"walletname": "", "balance": 0.0}),
    );
    assert!(detect_wallet(node.as_ref()).await);
}
