//! Background tasks: RPC pollers, the node feed and the clock tick

mod feed;
mod poller;
mod ticker;

pub use feed::{default_schedule, detect_wallet, NodeFeed, RuntimeEvent};
pub use poller::{wait_for_shutdown, PollSink, PollSpec, PollingScheduler, STARTUP_DELAY};
pub use ticker::{spawn_ticker, TICK_PERIOD};
