//! Chain tip, mempool and fee overview

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::core::{Key, Keypress, Mode, View, ViewState, WindowSize};
use crate::domain::{
    block_subsidy, format_age, Block, BlockHeader, FeeEstimate, MempoolInfo, NodeEvent,
    Transaction,
};
use crate::ui;

/// A tip older than this is assumed to mean the node is still syncing
const SYNCING_AGE_SECS: i64 = 3 * 3600;

/// Size of a serialized block header
const HEADER_BYTES: u64 = 80;

/// Reward split of the tip block, derived from its coinbase
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSummary {
    pub reward: f64,
    pub fees: f64,
    pub fee_percent: f64,
    /// Average fee per non-coinbase transaction, in milli-coins
    pub mbtc_per_tx: Option<f64>,
    /// Average fee rate in satoshis per kB of non-coinbase transaction data
    pub sat_per_kb: Option<f64>,
}

impl FeeSummary {
    /// `None` when `coinbase` does not belong to `block`.
    pub fn compute(block: &Block, coinbase: &Transaction) -> Option<Self> {
        if block.coinbase_txid() != Some(coinbase.txid.as_str()) {
            return None;
        }
        let reward = coinbase.output_total();
        let fees = reward - block_subsidy(block.height);
        let fee_percent = if reward > 0.0 { fees * 100.0 / reward } else { 0.0 };

        let paying = block.tx_count().saturating_sub(1);
        let mbtc_per_tx = (paying > 0).then(|| fees / paying as f64 * 1000.0);
        let tx_bytes = block.size.saturating_sub(HEADER_BYTES + coinbase.size);
        let sat_per_kb =
            (paying > 0 && tx_bytes > 0).then(|| fees * 1024.0 / tx_bytes as f64 * 1e8);

        Some(Self {
            reward,
            fees,
            fee_percent,
            mbtc_per_tx,
            sat_per_kb,
        })
    }
}

/// Describe the tip's age relative to `now`.
pub fn describe_age(now: DateTime<Utc>, block_time: i64) -> String {
    let delta = now.timestamp() - block_time;
    if delta > SYNCING_AGE_SECS {
        "(syncing)".to_string()
    } else if delta > 0 {
        format!("({} by stamp)", format_age(delta))
    } else {
        "(stamp in future)".to_string()
    }
}

pub struct MonitorView {
    state: ViewState,
    best_hash: Option<String>,
    header: Option<BlockHeader>,
    block: Option<Arc<Block>>,
    coinbase: Option<Arc<Transaction>>,
    mempool: Option<MempoolInfo>,
    fees: BTreeMap<u64, FeeEstimate>,
    uptime: Option<u64>,
    currency: &'static str,
    now: Option<DateTime<Utc>>,
}

impl Default for MonitorView {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorView {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            best_hash: None,
            header: None,
            block: None,
            coinbase: None,
            mempool: None,
            fees: BTreeMap::new(),
            uptime: None,
            currency: "BTC",
            now: None,
        }
    }

    /// Header for the current tip, if it has arrived
    fn tip_header(&self) -> Option<&BlockHeader> {
        let hash = self.best_hash.as_deref()?;
        self.header.as_ref().filter(|h| h.hash == hash)
    }

    fn tip_block(&self) -> Option<&Block> {
        let hash = self.best_hash.as_deref()?;
        self.block.as_deref().filter(|b| b.hash == hash)
    }

    pub fn fee_summary(&self) -> Option<FeeSummary> {
        FeeSummary::compute(self.tip_block()?, self.coinbase.as_deref()?)
    }

    fn tip_lines(&self) -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let Some(hash) = &self.best_hash else {
            return vec![Line::from(ui::label("waiting for getbestblockhash…"))];
        };

        let height = self
            .tip_header()
            .map(|h| h.height.to_string())
            .unwrap_or_else(|| "…".to_string());
        let mut lines = vec![Line::from(vec![
            ui::label("Height: "),
            Span::styled(format!("{height:>8}"), bold),
            Span::raw("   "),
            ui::label("Hash: "),
            Span::raw(hash.clone()),
        ])];

        let Some(block) = self.tip_block() else {
            lines.push(Line::from(ui::label("waiting for block…")));
            return lines;
        };

        let txs = block.tx_count().max(1) as u64;
        lines.push(Line::from(vec![
            ui::label("Size: "),
            Span::raw(format!("{} bytes", block.size)),
            Span::raw("   "),
            ui::label("Weight: "),
            Span::raw(format!("{} WU", block.weight)),
            Span::raw("   "),
            ui::label("Block timestamp: "),
            Span::raw(ui::timestamp(block.time)),
        ]));

        let mut tx_line = vec![
            ui::label("Transactions: "),
            Span::raw(format!(
                "{} ({} bytes/tx, {} WU/tx)",
                block.tx_count(),
                block.size / txs,
                block.weight / txs
            )),
        ];
        if let Some(now) = self.now {
            tx_line.push(Span::raw("   "));
            tx_line.push(ui::label("Age: "));
            tx_line.push(Span::raw(describe_age(now, block.time)));
        }
        lines.push(Line::from(tx_line));

        lines.push(Line::from(""));
        match self.fee_summary() {
            Some(summary) => {
                let mut spans = vec![
                    ui::label("Block reward: "),
                    Span::raw(format!("{:.6} {}", summary.reward, self.currency)),
                ];
                if let Some(per_tx) = summary.mbtc_per_tx {
                    spans.push(Span::raw("   "));
                    spans.push(ui::label("Fees: "));
                    spans.push(Span::raw(format!(
                        "{:.6} {} ({:.2}%, avg {:.2} m{}/tx, ~{:.0} sat/kB)",
                        summary.fees,
                        self.currency,
                        summary.fee_percent,
                        per_tx,
                        self.currency,
                        summary.sat_per_kb.unwrap_or_default()
                    )));
                }
                lines.push(Line::from(spans));
            }
            None => lines.push(Line::from(ui::label("waiting for coinbase…"))),
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            ui::label("Diff: "),
            Span::raw(ui::group_thousands(block.difficulty as u64)),
        ]));
        if let Some(work) = block.chainwork_log2() {
            lines.push(Line::from(vec![
                ui::label("Chain work: "),
                Span::raw(format!("2**{work:.6}")),
            ]));
        }
        lines
    }

    fn node_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(mempool) = &self.mempool {
            lines.push(Line::from(vec![
                ui::label("Mempool transactions: "),
                Span::raw(format!(
                    "{} ({:.2} MiB)",
                    mempool.size,
                    mempool.bytes as f64 / 1_048_576.0
                )),
            ]));
        }
        if !self.fees.is_empty() {
            let estimates: Vec<String> = self
                .fees
                .iter()
                .map(|(target, estimate)| match estimate.feerate {
                    Some(rate) => format!("({target}: {:.0} sat/kB)", rate * 1e8),
                    None => format!("({target}: n/a)"),
                })
                .collect();
            lines.push(Line::from(vec![
                ui::label("estimatesmartfee: "),
                Span::raw(estimates.join(" ")),
            ]));
        }
        if let Some(uptime) = self.uptime {
            lines.push(Line::from(vec![
                ui::label("uptime: "),
                Span::raw(format_age(uptime as i64)),
            ]));
        }
        lines
    }
}

#[async_trait::async_trait]
impl View for MonitorView {
    fn mode(&self) -> Mode {
        Mode::Monitor
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        Keypress::Declined(key)
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.now = Some(now);
        if self.tip_block().is_some() {
            self.state.request_redraw();
        }
    }

    fn on_event(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::BestBlockHash(hash) => {
                if self.best_hash.as_ref() == Some(hash) {
                    return;
                }
                self.best_hash = Some(hash.clone());
            }
            NodeEvent::BestHeader(header) => self.header = Some(header.clone()),
            NodeEvent::BestBlock { block, coinbase } => {
                self.block = Some(Arc::clone(block));
                self.coinbase = coinbase.clone();
            }
            NodeEvent::MempoolInfo(info) => self.mempool = Some(info.clone()),
            NodeEvent::FeeEstimate { target, estimate } => {
                self.fees.insert(*target, estimate.clone());
            }
            NodeEvent::Uptime(secs) => self.uptime = Some(*secs),
            NodeEvent::ChainInfo(info) => self.currency = info.currency(),
            _ => return,
        }
        self.state.request_redraw();
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = self.tip_lines();
        lines.push(Line::from(""));
        lines.extend(self.node_lines());

        let paragraph = Paragraph::new(Text::from(lines))
            .style(Style::default().fg(Color::White))
            .block(ui::view_block("monitor"));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScriptPubKey, TxInput, TxOutput};
    use chrono::TimeZone;

    fn block(height: u64, txs: usize) -> Block {
        Block {
            hash: "b1".into(),
            height,
            previous_hash: None,
            next_hash: None,
            size: 1_080,
            weight: 4_000,
            difficulty: 1.0,
            time: 1_000,
            mediantime: None,
            merkleroot: String::new(),
            version_hex: String::new(),
            chainwork: "0100".into(),
            tx: (0..txs).map(|i| format!("t{i}")).collect(),
        }
    }

    fn coinbase(txid: &str, value: f64) -> Transaction {
        Transaction {
            txid: txid.into(),
            hash: txid.into(),
            size: 200,
            vsize: 200,
            version: 2,
            locktime: 0,
            time: None,
            blockhash: None,
            confirmations: None,
            vin: vec![TxInput::Coinbase {
                coinbase: "03".into(),
                sequence: 0,
            }],
            vout: vec![TxOutput {
                value,
                n: 0,
                script: ScriptPubKey::default(),
            }],
        }
    }

    #[test]
    fn test_fee_summary() {
        let summary = FeeSummary::compute(&block(630_000, 3), &coinbase("t0", 6.5)).unwrap();
        assert_eq!(summary.reward, 6.5);
        assert!((summary.fees - 0.25).abs() < 1e-9);
        assert!((summary.mbtc_per_tx.unwrap() - 125.0).abs() < 1e-6);
        assert!(summary.sat_per_kb.is_some());
    }

    #[test]
    fn test_fee_summary_rejects_foreign_coinbase() {
        assert_eq!(FeeSummary::compute(&block(1, 1), &coinbase("other", 50.0)), None);
    }

    #[test]
    fn test_fee_summary_coinbase_only_block() {
        let summary = FeeSummary::compute(&block(1, 1), &coinbase("t0", 50.0)).unwrap();
        assert_eq!(summary.mbtc_per_tx, None);
        assert_eq!(summary.fees, 0.0);
    }

    #[test]
    fn test_describe_age() {
        let now = Utc.timestamp_opt(10_000, 0).unwrap();
        assert_eq!(describe_age(now, 10_000 - 61), "(00:01:01 by stamp)");
        assert_eq!(describe_age(now, 10_000 + 5), "(stamp in future)");
        assert_eq!(describe_age(now, 10_000 - 4 * 3600), "(syncing)");
    }

    #[test]
    fn test_partial_state_tracks_tip() {
        let mut view = MonitorView::new();
        view.on_event(&NodeEvent::BestBlockHash("b1".into()));
        assert!(view.tip_header().is_none());

        view.on_event(&NodeEvent::BestBlock {
            block: Arc::new(block(5, 1)),
            coinbase: Some(Arc::new(coinbase("t0", 50.0))),
        });
        assert!(view.fee_summary().is_some());

        view.on_event(&NodeEvent::BestBlockHash("b2".into()));
        assert!(view.tip_block().is_none());
        assert!(view.fee_summary().is_none());
    }
}
