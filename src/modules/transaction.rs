//! Transaction inspector with input following

use std::sync::Arc;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, Paragraph};
use ratatui::Frame;

use crate::core::{
    Action, Key, Keypress, ListCursor, Mode, Target, View, ViewState, WindowSize,
};
use crate::domain::{Transaction, TxInput};
use crate::store::TransactionStore;
use crate::ui;

const WINDOW: usize = 5;

pub struct TransactionView {
    state: ViewState,
    transactions: TransactionStore,
    current: Option<Arc<Transaction>>,
    inputs: ListCursor<String>,
    outputs: ListCursor<String>,
}

impl TransactionView {
    pub fn new(transactions: TransactionStore) -> Self {
        Self {
            state: ViewState::default(),
            transactions,
            current: None,
            inputs: ListCursor::new(WINDOW),
            outputs: ListCursor::new(WINDOW),
        }
    }

    pub fn current(&self) -> Option<&Arc<Transaction>> {
        self.current.as_ref()
    }

    pub fn selected_input(&self) -> Option<usize> {
        let tx = self.current.as_ref()?;
        self.inputs.selected(&tx.txid)
    }

    pub fn selected_output(&self) -> Option<usize> {
        let tx = self.current.as_ref()?;
        self.outputs.selected(&tx.txid)
    }

    fn show(&mut self, tx: Arc<Transaction>, output: Option<u32>) {
        let last = tx.vout.len().saturating_sub(1);
        let output = output.map_or(0, |n| (n as usize).min(last));
        self.inputs.jump_to(tx.txid.clone(), 0);
        self.outputs.jump_to(tx.txid.clone(), output);
        self.current = Some(tx);
        self.state.request_redraw();
    }

    /// Target for the source of the selected input
    fn follow_input(&self) -> Option<Target> {
        let tx = self.current.as_ref()?;
        match self.inputs.resolve_with(&tx.txid, &tx.vin, TxInput::source) {
            Ok(source) => Some(Target::Transaction {
                txid: source.txid,
                output: Some(source.vout),
            }),
            Err(err) => {
                tracing::debug!(txid = %tx.txid, error = %err, "input not followable");
                None
            }
        }
    }

    fn summary(tx: &Transaction) -> Text<'static> {
        let placement = match (&tx.blockhash, tx.confirmations) {
            (Some(hash), Some(confirmations)) => {
                format!("{hash} ({confirmations} confirmations)")
            }
            (Some(hash), None) => hash.clone(),
            (None, _) => "unconfirmed transaction!".to_string(),
        };
        let time = tx.time.map(ui::timestamp).unwrap_or_else(|| "-".to_string());

        Text::from(vec![
            Line::from(vec![
                ui::label("Time: "),
                Span::raw(time),
                Span::raw("   "),
                ui::label("Size: "),
                Span::raw(format!("{} bytes", tx.size)),
                Span::raw("   "),
                ui::label("vsize: "),
                Span::raw(format!("{} vB", tx.vsize)),
            ]),
            Line::from(vec![
                ui::label("Locktime: "),
                Span::raw(tx.locktime.to_string()),
                Span::raw("   "),
                ui::label("Version: "),
                Span::raw(tx.version.to_string()),
            ]),
            Line::from(vec![ui::label("txid: "), Span::raw(tx.txid.clone())]),
            Line::from(vec![ui::label("wtxid: "), Span::raw(tx.hash.clone())]),
            Line::from(vec![ui::label("Block: "), Span::raw(placement)]),
            Line::from(vec![
                ui::hint("UP/DOWN: inputs"),
                Span::raw(" "),
                ui::hint("J/K PGUP/PGDN: outputs"),
                Span::raw(" "),
                ui::hint("ENTER: follow input"),
            ]),
        ])
    }

    fn input_items(&self, tx: &Transaction) -> Vec<ListItem<'static>> {
        let selected = self.inputs.selected(&tx.txid);
        self.inputs
            .visible(&tx.txid, tx.vin.len())
            .map(|i| {
                let text = match &tx.vin[i] {
                    TxInput::Coinbase { coinbase, .. } => {
                        format!("{i:05} coinbase {}", ui::truncate_str(coinbase, 64))
                    }
                    TxInput::Spend { txid, vout, .. } => format!("{i:05} {txid}:{vout:03}"),
                };
                ListItem::new(text).style(highlight(Some(i) == selected))
            })
            .collect()
    }

    fn output_items(&self, tx: &Transaction) -> Vec<ListItem<'static>> {
        let selected = self.outputs.selected(&tx.txid);
        self.outputs
            .visible(&tx.txid, tx.vout.len())
            .map(|i| {
                let out = &tx.vout[i];
                let text = format!(
                    "{i:05} {:>17.8} {}",
                    out.value,
                    ui::truncate_str(&out.script.describe(), 80)
                );
                ListItem::new(text).style(highlight(Some(i) == selected))
            })
            .collect()
    }
}

fn highlight(selected: bool) -> Style {
    if selected {
        ui::selected(Style::default())
    } else {
        Style::default()
    }
}

#[async_trait::async_trait]
impl View for TransactionView {
    fn mode(&self) -> Mode {
        Mode::Transaction
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        let Some(tx) = self.current.clone() else {
            return Keypress::Declined(key);
        };

        let moved = match key.folded() {
            Key::Up => self.inputs.select_previous(&tx.txid),
            Key::Down => self.inputs.select_next(&tx.txid, tx.vin.len()),
            Key::Char('j') | Key::PageUp => self.outputs.select_previous(&tx.txid),
            Key::Char('k') | Key::PageDown => self.outputs.select_next(&tx.txid, tx.vout.len()),
            Key::Enter => {
                return match self.follow_input() {
                    Some(target) => Keypress::Handled(Action::Open(target)),
                    None => Keypress::Handled(Action::None),
                };
            }
            _ => return Keypress::Declined(key),
        };
        if moved {
            self.state.request_redraw();
        }
        Keypress::Handled(Action::None)
    }

    async fn open(&mut self, target: &Target) -> bool {
        let Target::Transaction { txid, output } = target;
        match self.transactions.get(txid).await {
            Ok(tx) => {
                self.show(tx, *output);
                true
            }
            Err(err) => {
                tracing::debug!(%txid, error = %err, "transaction lookup failed");
                false
            }
        }
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(tx) = &self.current else {
            let message = Paragraph::new("no transaction selected; open one from the block or wallet view")
                .style(Style::default().fg(Color::DarkGray))
                .block(ui::view_block("transaction"));
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length(WINDOW as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let summary = Paragraph::new(Self::summary(tx)).block(ui::view_block("transaction"));
        frame.render_widget(summary, chunks[0]);

        let inputs = List::new(self.input_items(tx))
            .block(ui::view_block(&format!("inputs ({})", tx.vin.len())));
        frame.render_widget(inputs, chunks[1]);

        let outputs = List::new(self.output_items(tx)).block(ui::view_block(&format!(
            "outputs ({}, {:.8} total)",
            tx.vout.len(),
            tx.output_total()
        )));
        frame.render_widget(outputs, chunks[2]);
    }
}
