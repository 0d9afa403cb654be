//! In-memory bitcoind stand-in shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chainpeek::core::RpcError;
use chainpeek::infrastructure::rpc::RpcClient;
use serde_json::{json, Value};

/// Answers keyed by method and first parameter.
///
/// Unknown keys fail with the node's "not found" code (-5), a `null` answer
/// fails the way a null `result` does, and methods marked with
/// [`MockNode::fail`] time out.
#[derive(Default)]
pub struct MockNode {
    answers: Mutex<HashMap<(String, String), Value>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request takes `delay` before it answers
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, method: &str, key: &str, answer: Value) {
        self.answers
            .lock()
            .unwrap()
            .insert((method.to_string(), key.to_string()), answer);
    }

    pub fn fail(&self, method: &str) {
        self.failing.lock().unwrap().insert(method.to_string());
    }

    pub fn recover(&self, method: &str) {
        self.failing.lock().unwrap().remove(method);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// Serve a block for `getblock` and its hash for `getblockhash`.
    pub fn add_block(&self, block: Value) {
        let hash = block["hash"].as_str().unwrap().to_string();
        let height = block["height"].as_u64().unwrap();
        self.set("getblockhash", &height.to_string(), Value::from(hash.clone()));
        self.set("getblock", &hash, block);
    }

    pub fn add_transaction(&self, tx: Value) {
        let txid = tx["txid"].as_str().unwrap().to_string();
        self.set("getrawtransaction", &txid, tx);
    }
}

fn param_key(params: &[Value]) -> String {
    match params.first() {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl RpcClient for MockNode {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(method) {
            return Err(RpcError::Timeout);
        }

        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(&(method.to_string(), param_key(&params)))
            .cloned();
        match answer {
            Some(Value::Null) => Err(RpcError::null_result(method)),
            Some(value) => Ok(value),
            None => Err(RpcError::Content {
                message: format!("{method}: No such block or transaction"),
                code: Some(-5),
            }),
        }
    }
}

/// `getblock` result for block `hash` at `height`
pub fn block(hash: &str, height: u64, prev: Option<&str>, next: Option<&str>, txids: &[&str]) -> Value {
    json!({
        "hash": hash,
        "height": height,
        "previousblockhash": prev,
        "nextblockhash": next,
        "size": 1000 + height,
        "weight": 4000,
        "difficulty": 1.5,
        "time": 1_600_000_000 + height as i64,
        "merkleroot": "00",
        "chainwork": "0100",
        "tx": txids,
    })
}

/// `getrawtransaction` result spending `inputs` (`None` for a coinbase input)
/// into `outputs` equal outputs.
pub fn transaction(txid: &str, inputs: &[Option<(&str, u32)>], outputs: usize) -> Value {
    let vin: Vec<Value> = inputs
        .iter()
        .map(|input| match input {
            Some((txid, vout)) => json!({"txid": txid, "vout": vout, "sequence": 0}),
            None => json!({"coinbase": "03a0bb0d", "sequence": 4294967295u64}),
        })
        .collect();
    let vout: Vec<Value> = (0..outputs)
        .map(|n| {
            json!({
                "value": 1.0,
                "n": n,
                "scriptPubKey": {"asm": "OP_TRUE", "type": "nonstandard", "address": format!("addr{n}")}
            })
        })
        .collect();
    json!({
        "txid": txid,
        "hash": format!("{txid}w"),
        "size": 200,
        "vsize": 150,
        "version": 2,
        "locktime": 0,
        "vin": vin,
        "vout": vout,
    })
}
