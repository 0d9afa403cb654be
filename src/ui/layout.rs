use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

/// Split the screen into the top bars, the view body and the bottom bars.
pub fn areas(size: Rect, header_rows: u16, footer_rows: u16) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_rows),
            Constraint::Min(0),
            Constraint::Length(footer_rows),
        ])
        .split(size);

    UiAreas {
        size,
        header: vertical[0],
        body: vertical[1],
        footer: vertical[2],
    }
}

/// Split a view body into a fixed-height summary and the remaining list.
pub fn summary_and_list(area: Rect, summary_rows: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(summary_rows), Constraint::Min(0)])
        .split(area);
    (chunks[0], chunks[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_stack() {
        let areas = areas(Rect::new(0, 0, 100, 30), 2, 1);
        assert_eq!(areas.header.height, 2);
        assert_eq!(areas.footer.height, 1);
        assert_eq!(areas.body.y, 2);
        assert_eq!(areas.body.height, 27);
    }
}
