//! Chain domain models
//!
//! Plain serde types for the node payloads the dashboard consumes, plus the
//! capped traffic history and the event type the poll feed publishes.

mod block;
mod event;
mod net;
mod node;
mod transaction;
mod wallet;

pub use block::{block_subsidy, Block, BlockHeader};
pub use event::NodeEvent;
pub use net::{NetHistory, NetTotals, Throughput, HISTORY_HIGH_WATER, HISTORY_LOW_WATER};
pub use node::{
    format_age, ChainInfo, FeeEstimate, MempoolInfo, NetworkInfo, PeerInfo, WalletInfo,
};
pub use transaction::{OutPoint, ScriptPubKey, Transaction, TxInput, TxOutput};
pub use wallet::{SinceBlock, WalletTransaction};
