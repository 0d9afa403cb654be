//! Two-row status header: node version, chain, peers, traffic and balance

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::core::{Bar, BarSlot};
use crate::domain::{ChainInfo, NetTotals, NetworkInfo, NodeEvent, WalletInfo};
use crate::ui;

#[derive(Default)]
pub struct HeaderBar {
    network: Option<NetworkInfo>,
    chain: Option<ChainInfo>,
    peers: Option<usize>,
    totals: Option<NetTotals>,
    wallet: Option<WalletInfo>,
    redraw: bool,
}

impl HeaderBar {
    pub fn new() -> Self {
        Self::default()
    }

    fn chain_color(chain: &str) -> Color {
        match chain {
            "main" => Color::Yellow,
            "test" | "testnet4" => Color::Green,
            "regtest" => Color::Blue,
            _ => Color::Magenta,
        }
    }

    /// `8 peers`, colored by how well connected the node is
    pub fn peer_span(count: usize) -> Span<'static> {
        let noun = if count == 1 { "peer" } else { "peers" };
        let color = match count {
            0 => Color::Red,
            n if n > 8 => Color::Green,
            _ => Color::Yellow,
        };
        Span::styled(format!("{count} {noun}"), Style::default().fg(color))
    }

    /// Balance line, or `wallet disabled` before any wallet data
    pub fn balance_text(&self) -> String {
        let Some(wallet) = &self.wallet else {
            return "wallet disabled".to_string();
        };
        let currency = self.chain.as_ref().map_or("BTC", ChainInfo::currency);
        let mut text = format!("{:.8} {currency}", wallet.balance);
        if wallet.unconfirmed_balance != 0.0 {
            text.push_str(&format!(" ({:+.8} unconfirmed)", wallet.unconfirmed_balance));
        } else if wallet.immature_balance != 0.0 {
            text.push_str(&format!(" ({:.8} immature)", wallet.immature_balance));
        }
        text
    }

    fn first_row(&self) -> Line<'static> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled("chainpeek ", bold)];
        if let Some(network) = &self.network {
            spans.push(Span::raw(format!("v{} ", network.version)));
        }
        if let Some(chain) = &self.chain {
            spans.push(Span::styled(
                format!("({}) ", chain.chain),
                Style::default().fg(Self::chain_color(&chain.chain)),
            ));
        }
        if let Some(peers) = self.peers {
            spans.push(Self::peer_span(peers));
        }
        spans.push(Span::raw("   "));
        spans.push(ui::label("Balance: "));
        spans.push(Span::raw(self.balance_text()));
        Line::from(spans)
    }

    fn second_row(&self) -> Line<'static> {
        let subversion = self
            .network
            .as_ref()
            .map(|n| n.subversion.trim_matches('/').to_string())
            .unwrap_or_else(|| "…".to_string());
        let mut spans = vec![
            Span::raw(format!("{} / {subversion}", std::env::consts::OS)),
        ];
        if let Some(totals) = self.totals {
            spans.push(Span::raw("   "));
            spans.push(ui::label("Up: "));
            spans.push(Span::styled(
                ui::megabytes(totals.totalbytessent),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw(" "));
            spans.push(ui::label("Down: "));
            spans.push(Span::styled(
                ui::megabytes(totals.totalbytesrecv),
                Style::default().fg(Color::Green),
            ));
        }
        Line::from(spans)
    }
}

impl Bar for HeaderBar {
    fn slot(&self) -> BarSlot {
        BarSlot::Top
    }

    fn height(&self) -> u16 {
        2
    }

    fn on_event(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::NetworkInfo(info) => self.network = Some(info.clone()),
            NodeEvent::ChainInfo(info) => self.chain = Some(info.clone()),
            NodeEvent::PeerInfo(peers) => self.peers = Some(peers.len()),
            NodeEvent::NetTotals(totals) => self.totals = Some(*totals),
            NodeEvent::WalletInfo(info) => self.wallet = Some(info.clone()),
            _ => return,
        }
        self.redraw = true;
    }

    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let text = Text::from(vec![self.first_row(), self.second_row()]);
        frame.render_widget(
            Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White)),
            area,
        );
    }
}
