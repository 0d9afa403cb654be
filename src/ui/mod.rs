use chrono::DateTime;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod widgets;

use crate::core::{BarSlot, ModeDispatcher, WindowSize};

/// Smallest usable terminal
pub const MIN_WINDOW: WindowSize = WindowSize { rows: 10, cols: 20 };

pub fn draw(f: &mut Frame, dispatcher: &ModeDispatcher) {
    let size = f.size();
    if size.height < MIN_WINDOW.rows || size.width < MIN_WINDOW.cols {
        draw_too_small(f, size);
        return;
    }

    let areas = layout::areas(
        size,
        dispatcher.bar_height(BarSlot::Top),
        dispatcher.bar_height(BarSlot::Bottom),
    );
    dispatcher.render_bars(f, areas.header, BarSlot::Top);
    dispatcher.render_view(f, areas.body);
    dispatcher.render_bars(f, areas.footer, BarSlot::Bottom);
}

fn draw_too_small(f: &mut Frame, area: Rect) {
    let message = Paragraph::new(format!(
        "window too small ({}x{} needed)",
        MIN_WINDOW.cols, MIN_WINDOW.rows
    ))
    .style(Style::default().fg(Color::Red))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(message, area);
}

/// Bordered frame around a view body
pub fn view_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ))
}

pub fn label(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

/// Key binding hint, e.g. `[UP/DOWN: browse]`
pub fn hint(text: &str) -> Span<'static> {
    Span::styled(format!("[{text}]"), Style::default().fg(Color::Yellow))
}

pub fn selected(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
}

/// Unix seconds as `YYYY-MM-DDTHH:MM:SS` (UTC)
pub fn timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// `1234567` as `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    value.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
}

/// Megabytes with two decimals
pub fn megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1_048_576.0)
}
