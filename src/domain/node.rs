//! Node status payloads consumed by the header, monitor and peers views

use serde::Deserialize;

/// `getblockchaininfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    #[serde(default)]
    pub headers: u64,
    #[serde(default)]
    pub verificationprogress: f64,
}

impl ChainInfo {
    pub fn currency(&self) -> &'static str {
        match self.chain.as_str() {
            "main" => "BTC",
            "test" | "testnet4" => "tBC",
            "regtest" => "rBC",
            "signet" => "sBC",
            _ => "???",
        }
    }
}

/// `getnetworkinfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkInfo {
    pub subversion: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub connections: u64,
}

/// `getmempoolinfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MempoolInfo {
    pub size: u64,
    pub bytes: u64,
}

/// `estimatesmartfee <target>`; `feerate` is absent when the node has too
/// little data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeeEstimate {
    #[serde(default)]
    pub feerate: Option<f64>,
    pub blocks: u64,
}

/// `getpeerinfo` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeerInfo {
    pub id: u64,
    pub addr: String,
    #[serde(default)]
    pub subver: String,
    #[serde(default)]
    pub bytesrecv: u64,
    #[serde(default)]
    pub bytessent: u64,
    #[serde(default)]
    pub conntime: i64,
    #[serde(default)]
    pub inbound: bool,
    #[serde(default)]
    pub synced_headers: Option<i64>,
    #[serde(default)]
    pub pingtime: Option<f64>,
}

impl PeerInfo {
    /// Address without default ports, brackets and onion suffix, shortened to
    /// fit a 20 column cell.
    pub fn short_addr(&self) -> String {
        let addr = self
            .addr
            .replace(".onion", "")
            .replace(":8333", "")
            .replace(":18333", "");
        let addr = addr.trim_start_matches('[').trim_end_matches(']');
        if addr.chars().count() > 20 {
            let head: String = addr.chars().take(17).collect();
            format!("{head}...")
        } else {
            addr.to_string()
        }
    }

    /// User agent without the surrounding slashes
    pub fn agent(&self) -> &str {
        self.subver.trim_matches('/')
    }
}

/// `getwalletinfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletInfo {
    #[serde(default)]
    pub walletname: String,
    pub balance: f64,
    #[serde(default)]
    pub unconfirmed_balance: f64,
    #[serde(default)]
    pub immature_balance: f64,
}

/// Format a duration in seconds as `[Nd ]HH:MM:SS`.
pub fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (m, s) = (seconds / 60, seconds % 60);
    let (h, m) = (m / 60, m % 60);
    let (d, h) = (h / 24, h % 24);
    if d > 0 {
        format!("{d}d {h:02}:{m:02}:{s:02}")
    } else {
        format!("{h:02}:{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_short_addr() {
        let peer = PeerInfo {
            id: 1,
            addr: "[2001:db8:85a3:0:0:8a2e:370:7334]:8333".into(),
            subver: "/Satoshi:25.0.0/".into(),
            bytesrecv: 0,
            bytessent: 0,
            conntime: 0,
            inbound: false,
            synced_headers: None,
            pingtime: None,
        };
        assert_eq!(peer.short_addr(), "2001:db8:85a3:0:0...");
        assert_eq!(peer.agent(), "Satoshi:25.0.0");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(59), "00:00:59");
        assert_eq!(format_age(3_661), "01:01:01");
        assert_eq!(format_age(90_061), "1d 01:01:01");
        assert_eq!(format_age(-5), "00:00:00");
    }

    #[test]
    fn test_fee_estimate_without_rate() {
        let json = serde_json::json!({"errors": ["Insufficient data"], "blocks": 2});
        let estimate: FeeEstimate = serde_json::from_value(json).expect("valid estimate");
        assert_eq!(estimate.feerate, None);
        assert_eq!(estimate.blocks, 2);
    }
}
