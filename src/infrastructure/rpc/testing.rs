//! In-memory node for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::RpcClient;
use crate::core::RpcError;

/// Serves fixed answers keyed by method and first parameter. Unknown keys
/// fail with the node's "not found" code.
#[derive(Default)]
pub struct FixedNode {
    answers: HashMap<(String, String), Value>,
    calls: Mutex<Vec<String>>,
}

impl FixedNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: &str, key: &str, answer: Value) -> Self {
        self.answers
            .insert((method.to_string(), key.to_string()), answer);
        self
    }

    /// Methods requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
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
impl RpcClient for FixedNode {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(method.to_string());
        }
        self.answers
            .get(&(method.to_string(), param_key(&params)))
            .cloned()
            .ok_or_else(|| RpcError::Content {
                message: format!("{method}: not found"),
                code: Some(-5),
            })
    }
}
