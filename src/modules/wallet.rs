//! Wallet transaction history

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Paragraph, Row, Table};
use ratatui::Frame;

use crate::core::{
    Action, Key, Keypress, ListCursor, Mode, Target, View, ViewState, WindowSize,
};
use crate::domain::{format_age, NodeEvent, SinceBlock, WalletTransaction};
use crate::ui;

const WINDOW: usize = 6;

pub struct WalletView {
    state: ViewState,
    history: Option<SinceBlock>,
    cursor: ListCursor<String>,
    now: Option<DateTime<Utc>>,
}

impl Default for WalletView {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletView {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            history: None,
            cursor: ListCursor::new(WINDOW),
            now: None,
        }
    }

    /// Txid under the cursor
    pub fn selected_txid(&self) -> Option<&str> {
        let history = self.history.as_ref()?;
        self.cursor
            .resolve(&history.lastblock, &history.transactions)
            .ok()
            .map(|tx| tx.txid.as_str())
    }

    /// Install a new snapshot, keeping the selected transaction selected
    /// when it is still listed.
    fn refresh(&mut self, mut since: SinceBlock) {
        since.sort_newest_first();
        if self.history.as_ref() == Some(&since) {
            return;
        }

        let index = self
            .selected_txid()
            .and_then(|txid| since.position_of(txid))
            .unwrap_or(0);
        self.cursor.carry_to(since.lastblock.clone(), index);
        self.history = Some(since);
        self.state.request_redraw();
    }

    fn row(&self, tx: &WalletTransaction, selected: bool) -> Row<'static> {
        let age = self
            .now
            .map(|now| format_age(now.timestamp() - tx.timereceived))
            .unwrap_or_default();
        let style = if selected {
            ui::selected(Style::default())
        } else if tx.amount < 0.0 {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        Row::new(vec![
            ui::timestamp(tx.timereceived),
            age,
            format!("{:+.8}", tx.amount),
            tx.confirmations.to_string(),
            tx.txid.clone(),
        ])
        .style(style)
    }
}

#[async_trait::async_trait]
impl View for WalletView {
    fn mode(&self) -> Mode {
        Mode::Wallet
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        let Some(history) = &self.history else {
            return Keypress::Declined(key);
        };
        let context = history.lastblock.clone();
        let len = history.transactions.len();

        match key {
            Key::Up => {
                if self.cursor.select_previous(&context) {
                    self.state.request_redraw();
                }
            }
            Key::Down => {
                if self.cursor.select_next(&context, len) {
                    self.state.request_redraw();
                }
            }
            Key::Enter => match self.selected_txid() {
                Some(txid) => {
                    return Keypress::Handled(Action::Open(Target::transaction(txid)));
                }
                None => tracing::debug!("wallet: nothing selected"),
            },
            key => return Keypress::Declined(key),
        }
        Keypress::Handled(Action::None)
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.now = Some(now);
        if self.history.is_some() {
            self.state.request_redraw();
        }
    }

    fn on_event(&mut self, event: &NodeEvent) {
        if let NodeEvent::SinceBlock(since) = event {
            self.refresh(since.clone());
        }
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(history) = &self.history else {
            let message = Paragraph::new("wallet disabled")
                .style(Style::default().fg(Color::DarkGray))
                .block(ui::view_block("wallet"));
            frame.render_widget(message, area);
            return;
        };

        let title = format!("wallet ({} transactions)", history.transactions.len());
        let context = &history.lastblock;
        let selected = self.cursor.selected(context);
        let rows: Vec<Row> = self
            .cursor
            .visible(context, history.transactions.len())
            .map(|i| self.row(&history.transactions[i], Some(i) == selected))
            .collect();

        let header = Row::new(vec!["Received", "Age", "Amount", "Conf", "Txid"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let widths = [
            Constraint::Length(19),
            Constraint::Length(12),
            Constraint::Length(13),
            Constraint::Length(6),
            Constraint::Min(16),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(ui::view_block(&title));
        frame.render_widget(table, area);
    }
}
