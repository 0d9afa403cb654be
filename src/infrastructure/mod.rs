//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The node JSON-RPC client
//! - Tokio pollers feeding the stores and the app loop

pub mod rpc;
pub mod runtime;
