//! Block and block header payloads

use serde::Deserialize;

/// A block as returned by `getblock <hash>` (verbosity 1)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub hash: String,
    pub height: u64,
    #[serde(rename = "previousblockhash", default)]
    pub previous_hash: Option<String>,
    /// Successor known to the node at fetch time. Links observed later are
    /// kept by the block store, never written back here.
    #[serde(rename = "nextblockhash", default)]
    pub next_hash: Option<String>,
    pub size: u64,
    pub weight: u64,
    pub difficulty: f64,
    pub time: i64,
    #[serde(default)]
    pub mediantime: Option<i64>,
    pub merkleroot: String,
    #[serde(rename = "versionHex", default)]
    pub version_hex: String,
    #[serde(default)]
    pub chainwork: String,
    /// Transaction ids, coinbase first
    pub tx: Vec<String>,
}

impl Block {
    pub fn tx_count(&self) -> usize {
        self.tx.len()
    }

    pub fn coinbase_txid(&self) -> Option<&str> {
        self.tx.first().map(String::as_str)
    }

    /// log2 of the cumulative chain work, if it parses
    pub fn chainwork_log2(&self) -> Option<f64> {
        chainwork_log2(&self.chainwork)
    }
}

/// Header as returned by `getblockheader <hash>`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub height: u64,
    pub time: i64,
    #[serde(rename = "previousblockhash", default)]
    pub previous_hash: Option<String>,
    #[serde(default)]
    pub chainwork: String,
}

/// Subsidy in whole coins for a block at `height` on main-net rules.
pub fn block_subsidy(height: u64) -> f64 {
    let halvings = height / 210_000;
    if halvings >= 64 {
        return 0.0;
    }
    let sats: u64 = (50 * 100_000_000u64) >> halvings;
    sats as f64 / 100_000_000.0
}

fn chainwork_log2(chainwork: &str) -> Option<f64> {
    let digits = chainwork.trim_start_matches('0');
    if digits.is_empty() {
        return None;
    }
    // Use the leading 13 hex digits for the mantissa; the rest only shifts.
    let head_len = digits.len().min(13);
    let head = u64::from_str_radix(&digits[..head_len], 16).ok()?;
    let shift = 4 * (digits.len() - head_len);
    Some((head as f64).log2() + shift as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_getblock_result() {
        let json = serde_json::json!({
            "hash": "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054",
            "confirmations": 3,
            "height": 600000,
            "version": 536870912,
            "versionHex": "20000000",
            "merkleroot": "66b7c4a1926b41ceb2e617ddae0067e7bfea42db502017fde5b695a50384ed26",
            "time": 1571443461,
            "mediantime": 1571440556,
            "difficulty": 13008091666971.9,
            "chainwork": "000000000000000000000000000000000000000009f1f8a4ec2a5e6ae9bf3c5f",
            "nTx": 2,
            "size": 1210,
            "weight": 3865,
            "previousblockhash": "00000000000000000003ecd827f336c6971f6f77a0b9fba362398dd867975645",
            "tx": ["aa", "bb"]
        });

        let block: Block = serde_json::from_value(json).expect("valid block");
        assert_eq!(block.height, 600000);
        assert_eq!(block.tx_count(), 2);
        assert_eq!(block.coinbase_txid(), Some("aa"));
        assert!(block.next_hash.is_none());
        assert!(block.previous_hash.is_some());
        assert_eq!(block.version_hex, "20000000");
    }

    #[test]
    fn test_block_subsidy_halvings() {
        assert_eq!(block_subsidy(0), 50.0);
        assert_eq!(block_subsidy(209_999), 50.0);
        assert_eq!(block_subsidy(210_000), 25.0);
        assert_eq!(block_subsidy(630_000), 6.25);
        assert_eq!(block_subsidy(64 * 210_000), 0.0);
    }

    #[test]
    fn test_chainwork_log2() {
        assert_eq!(chainwork_log2("0000"), None);
        assert_eq!(chainwork_log2("0100"), Some(8.0));
        let big = format!("1{}", "0".repeat(20));
        assert_eq!(chainwork_log2(&big), Some(80.0));
    }
}
