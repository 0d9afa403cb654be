//! Wallet history from `listsinceblock`

use std::cmp::Ordering;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletTransaction {
    pub txid: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub confirmations: i64,
    #[serde(default)]
    pub blockheight: Option<u64>,
    #[serde(default)]
    pub timereceived: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SinceBlock {
    pub transactions: Vec<WalletTransaction>,
    pub lastblock: String,
}

impl SinceBlock {
    /// Newest first; ties broken by larger amount first.
    pub fn sort_newest_first(&mut self) {
        self.transactions.sort_by(|a, b| {
            b.timereceived.cmp(&a.timereceived).then_with(|| {
                b.amount
                    .partial_cmp(&a.amount)
                    .unwrap_or(Ordering::Equal)
            })
        });
    }

    pub fn position_of(&self, txid: &str) -> Option<usize> {
        self.transactions.iter().position(|tx| tx.txid == txid)
    }
}
