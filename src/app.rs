//! Application state owned by the main loop

use std::sync::Arc;

use crate::core::{Action, Key, LookupError, Mode, ModeDispatcher, WindowSize};
use crate::infrastructure::rpc::RpcClient;
use crate::infrastructure::runtime::RuntimeEvent;
use crate::modules::{
    BlockView, ConsoleView, FooterBar, HeaderBar, MonitorView, NetView, PeersView,
    TransactionView, WalletView,
};
use crate::store::{BlockStore, TransactionStore};

pub struct App {
    pub dispatcher: ModeDispatcher,
    pub should_quit: bool,
    /// Set when the runtime reported an unrecoverable error
    pub fatal: Option<LookupError>,
}

impl App {
    pub fn new(dispatcher: ModeDispatcher) -> Self {
        Self {
            dispatcher,
            should_quit: false,
            fatal: None,
        }
    }

    /// Every view and bar wired to the shared stores, starting on the monitor.
    pub fn with_stores(
        client: Arc<dyn RpcClient>,
        blocks: BlockStore,
        transactions: TransactionStore,
    ) -> Self {
        let mut dispatcher = ModeDispatcher::new();
        dispatcher.register_view(Box::new(MonitorView::new()));
        dispatcher.register_view(Box::new(PeersView::new()));
        dispatcher.register_view(Box::new(WalletView::new()));
        dispatcher.register_view(Box::new(BlockView::new(blocks)));
        dispatcher.register_view(Box::new(TransactionView::new(transactions)));
        dispatcher.register_view(Box::new(ConsoleView::new(client)));
        dispatcher.register_view(Box::new(NetView::new()));
        dispatcher.register_bar(Box::new(HeaderBar::new()));
        dispatcher.register_bar(Box::new(FooterBar::new()));
        dispatcher.set_mode(Mode::Monitor);
        Self::new(dispatcher)
    }

    pub async fn on_key(&mut self, key: Key) {
        if self.dispatcher.handle_keypress(key).await == Action::Quit {
            tracing::info!("quit requested");
            self.should_quit = true;
        }
    }

    pub fn on_resize(&mut self, size: WindowSize) {
        self.dispatcher.broadcast_resize(size);
    }

    pub fn apply(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Node(event) => self.dispatcher.broadcast_event(&event),
            RuntimeEvent::Tick(now) => self.dispatcher.broadcast_tick(now),
            RuntimeEvent::Fatal(err) => {
                tracing::error!(error = %err, "fatal runtime error");
                self.fatal = Some(err);
                self.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rpc::testing::FixedNode;

    fn app() -> App {
        let client: Arc<dyn RpcClient> = Arc::new(FixedNode::new());
        App::with_stores(
            Arc::clone(&client),
            BlockStore::new(Arc::clone(&client)),
            TransactionStore::new(client),
        )
    }

    #[tokio::test]
    async fn test_starts_on_monitor_and_switches_by_letter() {
        let mut app = app();
        assert_eq!(app.dispatcher.current(), Some(Mode::Monitor));
        app.on_key(Key::Char('c')).await;
        assert_eq!(app.dispatcher.current(), Some(Mode::Console));
        app.on_key(Key::Right).await;
        assert_eq!(app.dispatcher.current(), Some(Mode::Net));
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_quit_key() {
        let mut app = app();
        app.on_key(Key::Quit).await;
        assert!(app.should_quit);
        assert!(app.fatal.is_none());
    }

    #[test]
    fn test_fatal_event_stops_app() {
        let mut app = app();
        app.apply(RuntimeEvent::Fatal(LookupError::ReorgDetected {
            block: "a".into(),
            recorded: "b".into(),
            observed: "c".into(),
        }));
        assert!(app.should_quit);
        assert!(app.fatal.as_ref().is_some_and(LookupError::is_fatal));
    }
}
