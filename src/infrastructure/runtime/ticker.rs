//! Wall-clock tick producer

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::feed::RuntimeEvent;
use super::poller::{wait_for_shutdown, STARTUP_DELAY};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Send the current UTC time every `period` until shutdown.
pub fn spawn_ticker(
    events: UnboundedSender<RuntimeEvent>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + STARTUP_DELAY, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => return,
                _ = interval.tick() => {
                    if events.send(RuntimeEvent::Tick(Utc::now())).is_err() {
                        return;
                    }
                }
            }
        }
    })
}
