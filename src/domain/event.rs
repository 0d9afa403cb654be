//! Typed node events published by the poll feed

use std::sync::Arc;

use super::{
    Block, BlockHeader, ChainInfo, FeeEstimate, MempoolInfo, NetTotals, NetworkInfo, PeerInfo,
    SinceBlock, Transaction, WalletInfo,
};

/// One decoded poll result, fanned out to every view and bar.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// Chain tip hash, every cycle
    BestBlockHash(String),
    /// Header of a new tip, ahead of the full block
    BestHeader(BlockHeader),
    /// Full tip block and its coinbase, once fetched
    BestBlock {
        block: Arc<Block>,
        coinbase: Option<Arc<Transaction>>,
    },
    ChainInfo(ChainInfo),
    NetworkInfo(NetworkInfo),
    NetTotals(NetTotals),
    PeerInfo(Vec<PeerInfo>),
    MempoolInfo(MempoolInfo),
    FeeEstimate { target: u64, estimate: FeeEstimate },
    Uptime(u64),
    WalletInfo(WalletInfo),
    SinceBlock(SinceBlock),
}
