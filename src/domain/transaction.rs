//! Transaction payloads from `getrawtransaction <txid> true`

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    pub txid: String,
    /// Witness hash
    pub hash: String,
    pub size: u64,
    pub vsize: u64,
    pub version: i64,
    pub locktime: u64,
    /// Block time, absent while unconfirmed
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub confirmations: Option<u64>,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

impl Transaction {
    pub fn is_confirmed(&self) -> bool {
        self.blockhash.is_some()
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self.vin.first(), Some(TxInput::Coinbase { .. }))
    }

    pub fn output_total(&self) -> f64 {
        self.vout.iter().map(|out| out.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TxInput {
    Coinbase {
        coinbase: String,
        #[serde(default)]
        sequence: u64,
    },
    Spend {
        txid: String,
        vout: u32,
        #[serde(default)]
        sequence: u64,
    },
}

impl TxInput {
    /// The output this input spends; `None` for a coinbase.
    pub fn source(&self) -> Option<OutPoint> {
        match self {
            TxInput::Coinbase { .. } => None,
            TxInput::Spend { txid, vout, .. } => Some(OutPoint {
                txid: txid.clone(),
                vout: *vout,
            }),
        }
    }
}

/// Reference to a prior transaction's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: String,
    pub vout: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxOutput {
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script: ScriptPubKey,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub asm: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Pre-0.21 nodes report a list instead of a single address
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
}

impl ScriptPubKey {
    /// Best human-readable description of the output script
    pub fn describe(&self) -> String {
        if let Some(address) = &self.address {
            return address.clone();
        }
        if let Some(addresses) = &self.addresses {
            if !addresses.is_empty() {
                return addresses.join(" ");
            }
        }
        if !self.asm.is_empty() {
            return self.asm.clone();
        }
        "???".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_inputs() {
        let json = serde_json::json!({
            "txid": "t1",
            "hash": "w1",
            "size": 225,
            "vsize": 144,
            "version": 2,
            "locktime": 0,
            "vin": [
                {"coinbase": "03a0bb0d", "sequence": 4294967295u64},
                {"txid": "prev", "vout": 3, "scriptSig": {"asm": "", "hex": ""}, "sequence": 1}
            ],
            "vout": [
                {"value": 6.25, "n": 0, "scriptPubKey": {"asm": "OP_DUP", "type": "pubkeyhash", "address": "1abc"}},
                {"value": 0.0, "n": 1, "scriptPubKey": {"asm": "OP_RETURN aa", "type": "nulldata"}}
            ]
        });

        let tx: Transaction = serde_json::from_value(json).expect("valid tx");
        assert!(tx.is_coinbase());
        assert!(!tx.is_confirmed());
        assert_eq!(tx.vin[0].source(), None);
        assert_eq!(
            tx.vin[1].source(),
            Some(OutPoint {
                txid: "prev".into(),
                vout: 3
            })
        );
        assert_eq!(tx.vout[0].script.describe(), "1abc");
        assert_eq!(tx.vout[1].script.describe(), "OP_RETURN aa");
        assert_eq!(tx.output_total(), 6.25);
    }

    #[test]
    fn test_describe_legacy_addresses() {
        let script = ScriptPubKey {
            addresses: Some(vec!["1a".into(), "1b".into()]),
            ..Default::default()
        };
        assert_eq!(script.describe(), "1a 1b");
        assert_eq!(ScriptPubKey::default().describe(), "???");
    }
}
