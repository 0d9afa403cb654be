//! Poll sink that fills the stores and publishes typed node events

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::poller::{PollSink, PollSpec};
use crate::config::{Config, PollConfig};
use crate::core::LookupError;
use crate::domain::{
    BlockHeader, ChainInfo, FeeEstimate, MempoolInfo, NetTotals, NetworkInfo, NodeEvent, PeerInfo,
    SinceBlock, WalletInfo,
};
use crate::infrastructure::rpc::RpcClient;
use crate::store::{BlockStore, TransactionStore};

/// Events delivered to the app loop
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Node(NodeEvent),
    Tick(DateTime<Utc>),
    /// Unrecoverable; the app shuts down with this error
    Fatal(LookupError),
}

/// The default poll schedule. Wallet pollers are included only when the
/// node has a wallet loaded.
pub fn default_schedule(config: &Config, wallet_enabled: bool) -> Vec<PollSpec> {
    let poll = &config.poll;
    let every = PollConfig::interval;

    let mut specs = vec![
        PollSpec::new("getbestblockhash", every(poll.bestblockhash)),
        PollSpec::new("getblockchaininfo", every(poll.blockchaininfo)),
        PollSpec::new("getnetworkinfo", every(poll.networkinfo)),
        PollSpec::new("getnettotals", every(poll.nettotals)),
        PollSpec::new("getpeerinfo", every(poll.peerinfo)),
        PollSpec::new("getmempoolinfo", every(poll.mempoolinfo)),
    ];
    specs.extend(config.fee_targets.iter().map(|target| {
        PollSpec::new("estimatesmartfee", every(poll.smartfee))
            .with_params(vec![Value::from(*target)])
    }));
    specs.push(PollSpec::new("uptime", every(poll.uptime)));

    if wallet_enabled {
        specs.push(PollSpec::new("getwalletinfo", every(poll.walletinfo)));
        specs.push(PollSpec::new("listsinceblock", every(poll.sinceblock)));
    }
    specs
}

/// Ask the node once whether a wallet is loaded.
pub async fn detect_wallet(client: &dyn RpcClient) -> bool {
    match client.request("getwalletinfo", Vec::new()).await {
        Ok(result) => {
            let enabled = result.get("walletname").is_some();
            tracing::info!(enabled, "wallet detection");
            enabled
        }
        Err(err) => {
            tracing::info!(error = %err, "wallet disabled");
            false
        }
    }
}

/// Decodes poll results into [`NodeEvent`]s.
///
/// The chain tip is recorded in the block store on every cycle. When it
/// changes, the new header is published first, then the full block with its
/// coinbase once both are cached.
pub struct NodeFeed {
    client: Arc<dyn RpcClient>,
    blocks: BlockStore,
    transactions: TransactionStore,
    events: UnboundedSender<RuntimeEvent>,
    tip: Mutex<Option<String>>,
}

impl NodeFeed {
    pub fn new(
        client: Arc<dyn RpcClient>,
        blocks: BlockStore,
        transactions: TransactionStore,
        events: UnboundedSender<RuntimeEvent>,
    ) -> Self {
        Self {
            client,
            blocks,
            transactions,
            events,
            tip: Mutex::new(None),
        }
    }

    fn publish(&self, event: NodeEvent) {
        // The receiver is only gone during shutdown.
        let _ = self.events.send(RuntimeEvent::Node(event));
    }

    fn current_tip(&self) -> Option<String> {
        self.tip.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_tip(&self, hash: &str) {
        *self.tip.lock().unwrap_or_else(PoisonError::into_inner) = Some(hash.to_string());
    }

    async fn on_best_hash(&self, hash: String) {
        self.publish(NodeEvent::BestBlockHash(hash.clone()));
        let changed = self.current_tip().as_deref() != Some(hash.as_str());

        if changed {
            match self.client.request("getblockheader", vec![Value::from(hash.as_str())]).await {
                Ok(result) => {
                    if let Some(header) = decode::<BlockHeader>("getblockheader", result) {
                        self.publish(NodeEvent::BestHeader(header));
                    }
                }
                Err(err) => tracing::warn!(%hash, error = %err, "getblockheader failed"),
            }
        }

        let block = match self.blocks.record_best(&hash).await {
            Ok(block) => block,
            Err(err) if err.is_fatal() => {
                let _ = self.events.send(RuntimeEvent::Fatal(err));
                return;
            }
            Err(err) => {
                tracing::warn!(%hash, error = %err, "could not record best block");
                return;
            }
        };

        if changed {
            let coinbase = match block.coinbase_txid() {
                Some(txid) => match self.transactions.get(txid).await {
                    Ok(tx) => Some(tx),
                    Err(err) => {
                        tracing::warn!(%txid, error = %err, "coinbase lookup failed");
                        None
                    }
                },
                None => None,
            };
            tracing::info!(height = block.height, %hash, "new best block");
            self.set_tip(&hash);
            self.publish(NodeEvent::BestBlock { block, coinbase });
        }
    }
}

#[async_trait::async_trait]
impl PollSink for NodeFeed {
    async fn deliver(&self, spec: &PollSpec, result: Value) {
        let method = spec.method.as_str();
        let event = match method {
            "getbestblockhash" => {
                match result.as_str() {
                    Some(hash) => self.on_best_hash(hash.to_string()).await,
                    None => tracing::warn!(%result, "getbestblockhash: not a string"),
                }
                return;
            }
            "getblockchaininfo" => decode::<ChainInfo>(method, result).map(NodeEvent::ChainInfo),
            "getnetworkinfo" => decode::<NetworkInfo>(method, result).map(NodeEvent::NetworkInfo),
            "getnettotals" => decode::<NetTotals>(method, result).map(NodeEvent::NetTotals),
            "getpeerinfo" => decode::<Vec<PeerInfo>>(method, result).map(NodeEvent::PeerInfo),
            "getmempoolinfo" => decode::<MempoolInfo>(method, result).map(NodeEvent::MempoolInfo),
            "estimatesmartfee" => {
                let target = spec.params.first().and_then(Value::as_u64).unwrap_or_default();
                decode::<FeeEstimate>(method, result)
                    .map(|estimate| NodeEvent::FeeEstimate { target, estimate })
            }
            "uptime" => decode::<u64>(method, result).map(NodeEvent::Uptime),
            "getwalletinfo" => decode::<WalletInfo>(method, result).map(NodeEvent::WalletInfo),
            "listsinceblock" => decode::<SinceBlock>(method, result).map(NodeEvent::SinceBlock),
            _ => {
                tracing::debug!(method, "no decoder for poll result");
                None
            }
        };

        if let Some(event) = event {
            self.publish(event);
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, result: Value) -> Option<T> {
    serde_json::from_value(result)
        .map_err(|err| tracing::warn!(method, error = %err, "undecodable poll result"))
        .ok()
}
