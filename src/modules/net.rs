//! Network throughput chart

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::core::{Key, Keypress, Mode, View, ViewState, WindowSize};
use crate::domain::{NetHistory, NodeEvent, Throughput};
use crate::ui;
use crate::ui::widgets::throughput::rate_label;
use crate::ui::widgets::ThroughputChart;

pub struct NetView {
    state: ViewState,
    history: NetHistory,
}

impl Default for NetView {
    fn default() -> Self {
        Self::new()
    }
}

impl NetView {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            history: NetHistory::new(),
        }
    }

    pub fn history(&self) -> &NetHistory {
        &self.history
    }

    /// Latest and peak rates
    pub fn rates(&self) -> Option<(Throughput, Throughput)> {
        let deltas = self.history.deltas();
        let latest = *deltas.last()?;
        let peak = deltas.iter().fold(Throughput { up: 0.0, down: 0.0 }, |peak, d| Throughput {
            up: peak.up.max(d.up),
            down: peak.down.max(d.down),
        });
        Some((latest, peak))
    }
}

#[async_trait::async_trait]
impl View for NetView {
    fn mode(&self) -> Mode {
        Mode::Net
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

    fn on_event(&mut self, event: &NodeEvent) {
        if let NodeEvent::NetTotals(totals) = event {
            self.history.push(*totals);
            self.state.request_redraw();
        }
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = ui::view_block("net");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some((latest, peak)) = self.rates() else {
            frame.render_widget(Paragraph::new("waiting for getnettotals…"), inner);
            return;
        };

        let (summary, chart_area) = ui::layout::summary_and_list(inner, 1);
        let up = Style::default().fg(Color::Cyan);
        let down = Style::default().fg(Color::Green);
        let line = Line::from(vec![
            ui::label("Up: "),
            Span::styled(rate_label(latest.up), up),
            Span::raw("  "),
            ui::label("Down: "),
            Span::styled(rate_label(latest.down), down),
            Span::raw("  "),
            ui::label("Total: "),
            Span::raw(rate_label(latest.total())),
            Span::raw("  "),
            ui::label("Peak: "),
            Span::styled(rate_label(peak.up), up),
            Span::raw(" / "),
            Span::styled(rate_label(peak.down), down),
        ]);
        frame.render_widget(Paragraph::new(line), summary);

        // Newest samples on the right; older ones scroll off the left edge.
        let deltas = self.history.deltas();
        let columns = usize::from(chart_area.width.saturating_sub(ui::widgets::throughput::LABEL_WIDTH));
        let visible = &deltas[deltas.len().saturating_sub(columns)..];
        let chart = ThroughputChart::new(visible).up_style(up).down_style(down);
        frame.render_widget(chart, chart_area);
    }
}
