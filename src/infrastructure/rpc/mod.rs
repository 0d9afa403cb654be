//! Node JSON-RPC transport

mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{extract_result, HttpRpcClient, RpcAuth, RpcClient, REQUEST_TIMEOUT};
