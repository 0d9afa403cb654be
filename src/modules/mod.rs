//! Dashboard views and bars
//!
//! Each view implements [`View`](crate::core::View) and owns its own state,
//! key handling and rendering. The header and footer implement
//! [`Bar`](crate::core::Bar) and are drawn around whichever view is active.

pub mod block;
pub mod console;
pub mod footer;
pub mod header;
pub mod monitor;
pub mod net;
pub mod peers;
pub mod transaction;
pub mod wallet;

pub use block::BlockView;
pub use console::ConsoleView;
pub use footer::FooterBar;
pub use header::HeaderBar;
pub use monitor::MonitorView;
pub use net::NetView;
pub use peers::PeersView;
pub use transaction::TransactionView;
pub use wallet::WalletView;
