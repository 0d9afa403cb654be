//! Block browser
//!
//! Follows the chain tip until the operator navigates away from it. `l`
//! returns to the tip and resumes following.

use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, Paragraph};
use ratatui::Frame;

use crate::core::{
    Action, Key, Keypress, ListCursor, LookupError, Mode, Target, View, ViewState, WindowSize,
};
use crate::domain::{Block, NodeEvent};
use crate::store::{BlockStore, Direction};
use crate::ui;

const WINDOW: usize = 10;

/// Heights skipped by `Home` / `End`
const JUMP: u64 = 1000;

const SUMMARY_ROWS: u16 = 8;

pub struct BlockView {
    state: ViewState,
    blocks: BlockStore,
    current: Option<Arc<Block>>,
    following: bool,
    cursor: ListCursor<String>,
}

impl BlockView {
    pub fn new(blocks: BlockStore) -> Self {
        Self {
            state: ViewState::default(),
            blocks,
            current: None,
            following: true,
            cursor: ListCursor::new(WINDOW),
        }
    }

    pub fn current(&self) -> Option<&Arc<Block>> {
        self.current.as_ref()
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    fn show(&mut self, block: Arc<Block>) {
        if self.current.as_ref().map(|b| &b.hash) == Some(&block.hash) {
            return;
        }
        self.cursor.jump_to(block.hash.clone(), 0);
        self.current = Some(block);
        self.state.request_redraw();
    }

    /// Load and show the block a lookup resolved to. Failures leave the view
    /// untouched.
    async fn go(&mut self, lookup: Result<String, LookupError>) -> bool {
        let block = match lookup {
            Ok(hash) => self.blocks.get(&hash).await,
            Err(err) => Err(err),
        };
        match block {
            Ok(block) => {
                self.show(block);
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "block navigation failed");
                false
            }
        }
    }

    async fn step(&mut self, key: Key) {
        let Some(hash) = self.current.as_ref().map(|b| b.hash.clone()) else {
            return;
        };
        let lookup = match key {
            Key::Char('j') => self.blocks.previous_of(&hash).await,
            Key::Char('k') => self.blocks.next_of(&hash).await,
            Key::Home => {
                self.blocks
                    .by_offset_from_height(&hash, JUMP, Direction::Back)
                    .await
            }
            Key::End => {
                self.blocks
                    .by_offset_from_height(&hash, JUMP, Direction::Forward)
                    .await
            }
            _ => return,
        };
        if self.go(lookup).await {
            self.following = false;
        }
    }

    async fn latest(&mut self) {
        let Some((hash, _)) = self.blocks.best() else {
            return;
        };
        if self.go(Ok(hash)).await {
            self.following = true;
            self.state.request_redraw();
        }
    }

    fn summary(&self, block: &Block) -> Text<'static> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let link = |hash: &Option<String>| hash.clone().unwrap_or_else(|| "-".to_string());
        let next = self.blocks.known_next(&block.hash);
        let tip = if self.following { " (following tip)" } else { "" };

        Text::from(vec![
            Line::from(vec![
                ui::label("Height: "),
                Span::styled(block.height.to_string(), bold),
                Span::styled(tip, Style::default().fg(Color::Green)),
            ]),
            Line::from(vec![ui::label("Hash: "), Span::raw(block.hash.clone())]),
            Line::from(vec![ui::label("Prev: "), Span::raw(link(&block.previous_hash))]),
            Line::from(vec![ui::label("Next: "), Span::raw(link(&next))]),
            Line::from(vec![
                ui::label("Time: "),
                Span::raw(ui::timestamp(block.time)),
                Span::raw("   "),
                ui::label("Size: "),
                Span::raw(format!("{} bytes", block.size)),
                Span::raw("   "),
                ui::label("Weight: "),
                Span::raw(format!("{} WU", block.weight)),
            ]),
            Line::from(vec![
                ui::label("Merkle root: "),
                Span::raw(block.merkleroot.clone()),
            ]),
            Line::from(vec![
                ui::label("Transactions: "),
                Span::raw(block.tx_count().to_string()),
            ]),
            Line::from(vec![
                ui::hint("J/K: prev/next"),
                Span::raw(" "),
                ui::hint("HOME/END: -/+1000"),
                Span::raw(" "),
                ui::hint("L: latest"),
                Span::raw(" "),
                ui::hint("UP/DOWN/ENTER: browse txs"),
            ]),
        ])
    }
}

#[async_trait::async_trait]
impl View for BlockView {
    fn mode(&self) -> Mode {
        Mode::Block
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        match key.folded() {
            folded @ (Key::Char('j') | Key::Char('k') | Key::Home | Key::End) => {
                self.step(folded).await
            }
            Key::Char('l') => self.latest().await,
            Key::Up | Key::Down | Key::Enter => {
                let Some(block) = self.current.clone() else {
                    return Keypress::Handled(Action::None);
                };
                let moved = match key {
                    Key::Up => self.cursor.select_previous(&block.hash),
                    Key::Down => self.cursor.select_next(&block.hash, block.tx.len()),
                    _ => match self.cursor.resolve(&block.hash, &block.tx) {
                        Ok(txid) => {
                            return Keypress::Handled(Action::Open(Target::transaction(
                                txid.clone(),
                            )))
                        }
                        Err(err) => {
                            tracing::debug!(error = %err, "no transaction selected");
                            false
                        }
                    },
                };
                if moved {
                    self.state.request_redraw();
                }
            }
            _ => return Keypress::Declined(key),
        }
        Keypress::Handled(Action::None)
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn on_event(&mut self, event: &NodeEvent) {
        if let NodeEvent::BestBlock { block, .. } = event {
            if self.following {
                self.show(Arc::clone(block));
            }
        }
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(block) = &self.current else {
            let waiting = Paragraph::new("waiting for the chain tip…").block(ui::view_block("block"));
            frame.render_widget(waiting, area);
            return;
        };

        let (summary_area, list_area) = ui::layout::summary_and_list(area, SUMMARY_ROWS + 2);
        let summary = Paragraph::new(self.summary(block)).block(ui::view_block("block"));
        frame.render_widget(summary, summary_area);

        let selected = self.cursor.selected(&block.hash);
        let items: Vec<ListItem> = self
            .cursor
            .visible(&block.hash, block.tx.len())
            .map(|i| {
                let text = format!("{i:>5} {}", block.tx[i]);
                let style = if Some(i) == selected {
                    ui::selected(Style::default())
                } else {
                    Style::default()
                };
                ListItem::new(text).style(style)
            })
            .collect();
        let list = List::new(items).block(ui::view_block("transactions"));
        frame.render_widget(list, list_area);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::infrastructure::rpc::testing::FixedNode;

    fn block_json(height: u64, prev: Option<&str>, next: Option<&str>) -> Value {
        json!({
            "hash": format!("h{height}"),
            "height": height,
            "previousblockhash": prev,
            "nextblockhash": next,
            "size": 300,
            "weight": 1200,
            "difficulty": 1.0,
            "time": 1_600_000_000 + height,
            "merkleroot": "m",
            "tx": [format!("cb{height}"), format!("tx{height}")]
        })
    }

    fn store() -> BlockStore {
        let node = FixedNode::new()
            .with("getblock", "h1", block_json(1, None, Some("h2")))
            .with("getblock", "h2", block_json(2, Some("h1"), None));
        BlockStore::new(Arc::new(node))
    }

    #[tokio::test]
    async fn test_follows_tip_until_browsing() {
        let blocks = store();
        let mut view = BlockView::new(blocks.clone());

        let tip = blocks.record_best("h2").await.unwrap();
        view.on_event(&NodeEvent::BestBlock {
            block: tip,
            coinbase: None,
        });
        assert_eq!(view.current().map(|b| b.height), Some(2));

        view.handle_keypress(Key::Char('j')).await;
        assert_eq!(view.current().map(|b| b.height), Some(1));
        assert!(!view.is_following());

        view.handle_keypress(Key::Char('l')).await;
        assert_eq!(view.current().map(|b| b.height), Some(2));
        assert!(view.is_following());
    }

    #[tokio::test]
    async fn test_failed_navigation_is_silent() {
        let blocks = store();
        let mut view = BlockView::new(blocks.clone());
        let tip = blocks.record_best("h2").await.unwrap();
        view.on_event(&NodeEvent::BestBlock {
            block: tip,
            coinbase: None,
        });

        // No successor and no height 1002.
        assert_eq!(
            view.handle_keypress(Key::Char('k')).await,
            Keypress::Handled(Action::None)
        );
        view.handle_keypress(Key::End).await;
        assert_eq!(view.current().map(|b| b.height), Some(2));
        assert!(view.is_following());
    }

    #[tokio::test]
    async fn test_enter_opens_selected_txid() {
        let blocks = store();
        let mut view = BlockView::new(blocks.clone());
        let tip = blocks.record_best("h2").await.unwrap();
        view.on_event(&NodeEvent::BestBlock {
            block: tip,
            coinbase: None,
        });

        view.handle_keypress(Key::Down).await;
        assert_eq!(
            view.handle_keypress(Key::Enter).await,
            Keypress::Handled(Action::Open(Target::transaction("tx2")))
        );
    }

    #[tokio::test]
    async fn test_navigation_keys_ignore_case() {
        let blocks = store();
        let mut view = BlockView::new(blocks.clone());
        let tip = blocks.record_best("h2").await.unwrap();
        view.on_event(&NodeEvent::BestBlock {
            block: tip,
            coinbase: None,
        });

        view.handle_keypress(Key::Char('J')).await;
        assert_eq!(view.current().map(|b| b.height), Some(1));
        view.handle_keypress(Key::Char('K')).await;
        assert_eq!(view.current().map(|b| b.height), Some(2));
        view.handle_keypress(Key::Char('J')).await;
        view.handle_keypress(Key::Char('L')).await;
        assert_eq!(view.current().map(|b| b.height), Some(2));
        assert!(view.is_following());

        assert_eq!(
            view.handle_keypress(Key::Char('W')).await,
            Keypress::Declined(Key::Char('W'))
        );
    }
}
