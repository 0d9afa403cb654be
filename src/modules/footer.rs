//! Mode list and UTC clock

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::core::{Bar, BarSlot, Mode};

#[derive(Default)]
pub struct FooterBar {
    mode: Option<Mode>,
    now: Option<DateTime<Utc>>,
    redraw: bool,
}

impl FooterBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// One span pair per mode: the highlighted letter and the rest of the title.
    pub fn mode_spans(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for mode in Mode::ALL {
            let active = self.mode == Some(mode);
            let base = if active {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            let title = mode.title();
            let split = title.chars().next().map_or(0, char::len_utf8);
            spans.push(Span::styled(
                title[..split].to_string(),
                base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(title[split..].to_string(), base));
            spans.push(Span::raw(" "));
        }
        spans
    }

    pub fn clock(&self) -> Option<String> {
        self.now
            .map(|now| now.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

impl Bar for FooterBar {
    fn slot(&self) -> BarSlot {
        BarSlot::Bottom
    }

    fn on_mode_change(&mut self, mode: Mode) {
        self.mode = Some(mode);
        self.redraw = true;
    }

    fn on_tick(&mut self, now: DateTime<Utc>) {
        self.now = Some(now);
        self.redraw = true;
    }

    fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut spans = self.mode_spans();
        if let Some(clock) = self.clock() {
            let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
            let width = usize::from(area.width);
            let pad = width.saturating_sub(used + clock.len() + 1);
            spans.push(Span::raw(" ".repeat(pad)));
            spans.push(Span::styled(clock, Style::default().fg(Color::Cyan)));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Blue)),
            area,
        );
    }
}
