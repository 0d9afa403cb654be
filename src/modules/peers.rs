//! Connected peers table

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Paragraph, Row, Table};
use ratatui::Frame;

use crate::core::{Action, Key, Keypress, Mode, View, ViewState, WindowSize};
use crate::domain::{format_age, NodeEvent, PeerInfo};
use crate::ui;

pub struct PeersView {
    state: ViewState,
    peers: Vec<PeerInfo>,
    offset: usize,
    now: Option<DateTime<Utc>>,
}

impl Default for PeersView {
    fn default() -> Self {
        Self::new()
    }
}

impl PeersView {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            peers: Vec::new(),
            offset: 0,
            now: None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn scroll(&mut self, up: bool) {
        let last = self.peers.len().saturating_sub(1);
        let offset = if up {
            self.offset.saturating_sub(1)
        } else {
            (self.offset + 1).min(last)
        };
        if offset != self.offset {
            self.offset = offset;
            self.state.request_redraw();
        }
    }

    fn row(&self, peer: &PeerInfo) -> Row<'static> {
        let direction = if peer.inbound { "I" } else { " " };
        let age = self
            .now
            .map(|now| format_age(now.timestamp() - peer.conntime))
            .unwrap_or_default();
        let synced = peer
            .synced_headers
            .map(|h| h.to_string())
            .unwrap_or_default();
        Row::new(vec![
            direction.to_string(),
            peer.short_addr(),
            ui::truncate_str(peer.agent(), 38),
            format!("{:.1}MB", peer.bytesrecv as f64 / 1_048_576.0),
            format!("{:.1}MB", peer.bytessent as f64 / 1_048_576.0),
            age,
            synced,
        ])
    }
}

#[async_trait::async_trait]
impl View for PeersView {
    fn mode(&self) -> Mode {
        Mode::Peers
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        match key {
            Key::Up => self.scroll(true),
            Key::Down => self.scroll(false),
            key => return Keypress::Declined(key),
        }
        Keypress::Handled(Action::None)
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.now = Some(now);
        if !self.peers.is_empty() {
            self.state.request_redraw();
        }
    }

    fn on_event(&mut self, event: &NodeEvent) {
        if let NodeEvent::PeerInfo(peers) = event {
            self.peers = peers.clone();
            self.offset = self.offset.min(self.peers.len().saturating_sub(1));
            self.state.request_redraw();
        }
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = ui::view_block(&format!("peers ({})", self.peers.len()));
        if self.peers.is_empty() {
            frame.render_widget(Paragraph::new("waiting for getpeerinfo…").block(block), area);
            return;
        }

        let header = Row::new(vec!["", "Node IP", "Version", "Recv", "Sent", "Time", "Height"])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        let rows: Vec<Row> = self.peers.iter().skip(self.offset).map(|p| self.row(p)).collect();
        let widths = [
            Constraint::Length(1),
            Constraint::Length(20),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}
