//! Actions that views return to the dispatcher

use super::mode::Mode;

/// Outcome of a handled keypress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond the view's own state change
    None,

    /// Show another entity, switching to the view that browses it
    Open(Target),

    /// Request quit
    Quit,
}

/// Something a view can be pointed at from elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A transaction, optionally with one of its outputs preselected
    Transaction { txid: String, output: Option<u32> },
}

impl Target {
    pub fn transaction(txid: impl Into<String>) -> Self {
        Target::Transaction {
            txid: txid.into(),
            output: None,
        }
    }

    /// Mode that browses this target
    pub fn mode(&self) -> Mode {
        match self {
            Target::Transaction { .. } => Mode::Transaction,
        }
    }
}
