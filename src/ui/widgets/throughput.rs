//! Mirrored bar chart of upload (above the axis) and download (below)

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::domain::Throughput;

/// Columns reserved on the left for the peak labels
pub const LABEL_WIDTH: u16 = 12;

pub struct ThroughputChart<'a> {
    data: &'a [Throughput],
    up_style: Style,
    down_style: Style,
}

impl<'a> ThroughputChart<'a> {
    pub fn new(data: &'a [Throughput]) -> Self {
        Self {
            data,
            up_style: Style::default().fg(Color::Cyan),
            down_style: Style::default().fg(Color::Green),
        }
    }

    pub fn up_style(mut self, style: Style) -> Self {
        self.up_style = style;
        self
    }

    pub fn down_style(mut self, style: Style) -> Self {
        self.down_style = style;
        self
    }
}

/// Rows a bar of `value` occupies in a half of `rows` rows scaled to `max`
pub fn bar_rows(value: f64, max: f64, rows: u16) -> u16 {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    let scaled = (f64::from(rows) * value / max).ceil();
    (scaled as u16).min(rows)
}

/// `1234.5 B/s` as `    1kB/s`
pub fn rate_label(bytes_per_sec: f64) -> String {
    format!("{:>5.0}kB/s", bytes_per_sec / 1024.0)
}

impl<'a> Widget for ThroughputChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width <= LABEL_WIDTH || area.height < 2 || self.data.is_empty() {
            return;
        }

        let up_rows = area.height / 2;
        let down_rows = area.height - up_rows;
        let axis = area.y + up_rows;

        let width = (area.width - LABEL_WIDTH) as usize;
        let start = self.data.len().saturating_sub(width);
        let visible = &self.data[start..];

        let max_up = visible.iter().map(|t| t.up).fold(0.0, f64::max);
        let max_down = visible.iter().map(|t| t.down).fold(0.0, f64::max);
        let max = max_up.max(max_down);
        if max <= 0.0 {
            return;
        }

        let label_style = Style::default().add_modifier(Modifier::BOLD);
        if max_up > 0.0 {
            let rows = bar_rows(max_up, max, up_rows);
            buf.set_string(area.x, axis - rows, rate_label(max_up), label_style);
        }
        if max_down > 0.0 {
            let rows = bar_rows(max_down, max, down_rows);
            buf.set_string(area.x, axis + rows - 1, rate_label(max_down), label_style);
        }

        for (i, sample) in visible.iter().enumerate() {
            let x = area.x + LABEL_WIDTH + i as u16;
            for y in 0..bar_rows(sample.up, max, up_rows) {
                buf.get_mut(x, axis - 1 - y).set_char('█').set_style(self.up_style);
            }
            for y in 0..bar_rows(sample.down, max, down_rows) {
                buf.get_mut(x, axis + y).set_char('█').set_style(self.down_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_rows() {
        assert_eq!(bar_rows(0.0, 10.0, 8), 0);
        assert_eq!(bar_rows(10.0, 10.0, 8), 8);
        assert_eq!(bar_rows(1.0, 10.0, 8), 1);
        assert_eq!(bar_rows(5.0, 0.0, 8), 0);
    }

    #[test]
    fn test_render_mirrors_around_axis() {
        let data = [Throughput { up: 2048.0, down: 1024.0 }];
        let area = Rect::new(0, 0, LABEL_WIDTH + 4, 8);
        let mut buf = Buffer::empty(area);
        ThroughputChart::new(&data).render(area, &mut buf);

        let x = LABEL_WIDTH;
        // Upload fills the whole upper half, download half of the lower one.
        for y in 0..4 {
            assert_eq!(buf.get(x, y).symbol(), "█");
        }
        assert_eq!(buf.get(x, 4).symbol(), "█");
        assert_eq!(buf.get(x, 5).symbol(), "█");
        assert_eq!(buf.get(x, 6).symbol(), " ");
    }
}
