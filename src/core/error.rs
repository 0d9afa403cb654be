//! Error taxonomy shared by the stores, cursors and pollers

use thiserror::Error;

/// Failure of a single JSON-RPC round trip.
///
/// All variants are transient from the point of view of a poller: the cycle is
/// skipped and the next one tries again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("rpc request timed out")]
    Timeout,

    #[error("rpc connection failed: {0}")]
    Connection(String),

    /// The response did not have the `{result, error}` shape, or the node
    /// reported an error. `code` carries the node's error code when present.
    #[error("rpc content error: {message}")]
    Content { message: String, code: Option<i64> },

    /// A well-formed response whose `result` was null
    #[error("rpc content error: {method}: null result")]
    NullResult { method: String },
}

impl RpcError {
    pub fn content(message: impl Into<String>) -> Self {
        RpcError::Content {
            message: message.into(),
            code: None,
        }
    }

    pub fn null_result(method: &str) -> Self {
        RpcError::NullResult {
            method: method.to_string(),
        }
    }

    pub fn is_null_result(&self) -> bool {
        matches!(self, RpcError::NullResult { .. })
    }

    /// Node error code, if the node answered with an error object.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Content { code, .. } => *code,
            _ => None,
        }
    }
}

/// Failure of an entity store lookup or of a derived navigation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{0} not found on node")]
    NotFound(String),

    #[error("navigation link not available")]
    NotLinked,

    #[error("offset navigation out of range")]
    OutOfRange,

    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A block's successor changed after it was recorded. The cache cannot
    /// reconcile a revised chain history, so this is fatal.
    #[error("chain reorganization detected at {block}: next was {recorded}, now {observed}")]
    ReorgDetected {
        block: String,
        recorded: String,
        observed: String,
    },
}

impl LookupError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, LookupError::ReorgDetected { .. })
    }
}

/// Failure of a cursor drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("nothing selected to follow")]
    NoSelection,
}
