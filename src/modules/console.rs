//! Interactive RPC console

use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::core::{parse_command, Action, Key, Keypress, Mode, View, ViewState, WindowSize};
use crate::infrastructure::rpc::RpcClient;
use crate::ui;

/// Longest command line accepted
pub const MAX_INPUT: usize = 190;

pub struct ConsoleView {
    state: ViewState,
    client: Arc<dyn RpcClient>,
    lines: Vec<String>,
    /// Lines scrolled back from the end
    scroll_back: usize,
    input: Option<String>,
}

impl ConsoleView {
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self {
            state: ViewState::default(),
            client,
            lines: Vec::new(),
            scroll_back: 0,
            input: None,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    fn push_text(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    async fn submit(&mut self, line: String) {
        let Some(command) = parse_command(&line) else {
            return;
        };
        self.push_text(&format!(">>> {}", line.trim()));

        tracing::info!(method = %command.method, "console request");
        let response = match self.client.request(&command.method, command.params).await {
            Ok(result) => pretty(&result),
            Err(err) => err.to_string(),
        };
        self.push_text(&response);
        self.scroll_back = 0;
    }

    /// Keys while the command line is open. Returns `None` for keys it leaves
    /// to the dispatcher.
    async fn edit(&mut self, key: Key) -> Option<()> {
        let input = self.input.as_mut()?;
        match key {
            Key::Tab | Key::Esc => self.input = None,
            Key::Backspace => {
                input.pop();
            }
            Key::Enter => {
                let line = std::mem::take(input);
                self.input = None;
                self.submit(line).await;
            }
            key => {
                let c = key.printable()?;
                if input.chars().count() < MAX_INPUT {
                    input.push(c);
                }
            }
        }
        Some(())
    }
}

/// JSON with four-space indentation; object keys come out sorted.
fn pretty(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

#[async_trait::async_trait]
impl View for ConsoleView {
    fn mode(&self) -> Mode {
        Mode::Console
    }

    fn activate(&mut self) {
        self.state.activate();
    }

    fn deactivate(&mut self) {
        self.input = None;
        self.state.deactivate();
    }

    async fn handle_keypress(&mut self, key: Key) -> Keypress {
        if self.input.is_some() {
            if self.edit(key).await.is_none() {
                return Keypress::Declined(key);
            }
            self.state.request_redraw();
            return Keypress::Handled(Action::None);
        }

        match key {
            Key::Tab => self.input = Some(String::new()),
            Key::Up => {
                let last = self.lines.len().saturating_sub(1);
                self.scroll_back = (self.scroll_back + 1).min(last);
            }
            Key::Down => self.scroll_back = self.scroll_back.saturating_sub(1),
            key => return Keypress::Declined(key),
        }
        self.state.request_redraw();
        Keypress::Handled(Action::None)
    }

    fn on_resize(&mut self, size: WindowSize) {
        self.state.resize(size);
    }

    fn take_redraw(&mut self) -> bool {
        self.state.take_redraw()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let input_rows = usize::from(self.input.is_some());
        let height = usize::from(area.height.saturating_sub(2)).saturating_sub(input_rows);
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);

        let mut lines: Vec<Line> = self.lines[start..end]
            .iter()
            .map(|line| {
                if line.starts_with(">>>") {
                    Line::styled(line.clone(), Style::default().fg(Color::Cyan))
                } else {
                    Line::raw(line.clone())
                }
            })
            .collect();

        match &self.input {
            Some(input) => lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::raw(input.clone()),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ])),
            None if self.lines.is_empty() => {
                lines.push(Line::from(ui::hint("TAB: enter command")));
            }
            None => {}
        }

        let paragraph = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(ui::view_block("console"));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infrastructure::rpc::testing::FixedNode;

    fn console() -> ConsoleView {
        let node = FixedNode::new()
            .with("getblockhash", "100", json!("00ab"))
            .with("getmempoolinfo", "", json!({"size": 3, "bytes": 900}));
        ConsoleView::new(Arc::new(node))
    }

    async fn type_line(view: &mut ConsoleView, line: &str) {
        view.handle_keypress(Key::Tab).await;
        for c in line.chars() {
            view.handle_keypress(Key::Char(c)).await;
        }
        view.handle_keypress(Key::Enter).await;
    }

    #[tokio::test]
    async fn test_submit_appends_request_and_response() {
        let mut view = console();
        type_line(&mut view, "getblockhash 100").await;
        assert_eq!(view.lines(), [">>> getblockhash 100", "\"00ab\""]);
        assert_eq!(view.input(), None);

        type_line(&mut view, "getmempoolinfo").await;
        assert_eq!(
            &view.lines()[2..],
            [">>> getmempoolinfo", "{", "    \"bytes\": 900,", "    \"size\": 3", "}"]
        );
    }

    #[tokio::test]
    async fn test_errors_are_shown() {
        let mut view = console();
        type_line(&mut view, "getblockhash 5").await;
        assert_eq!(view.lines().len(), 2);
        assert!(view.lines()[1].contains("not found"));
    }

    #[tokio::test]
    async fn test_editing_keys() {
        let mut view = console();
        view.handle_keypress(Key::Tab).await;
        for c in "upt".chars() {
            view.handle_keypress(Key::Char(c)).await;
        }
        view.handle_keypress(Key::Backspace).await;
        assert_eq!(view.input(), Some("up"));

        // Mode letters are typed, not interpreted.
        assert_eq!(
            view.handle_keypress(Key::Char('m')).await,
            Keypress::Handled(Action::None)
        );
        assert_eq!(
            view.handle_keypress(Key::Left).await,
            Keypress::Declined(Key::Left)
        );

        view.deactivate();
        assert_eq!(view.input(), None);
    }

    #[tokio::test]
    async fn test_input_is_capped() {
        let mut view = console();
        view.handle_keypress(Key::Tab).await;
        for _ in 0..MAX_INPUT + 10 {
            view.handle_keypress(Key::Char('x')).await;
        }
        assert_eq!(view.input().map(str::len), Some(MAX_INPUT));
    }

    #[tokio::test]
    async fn test_scroll_when_closed() {
        let mut view = console();
        type_line(&mut view, "getmempoolinfo").await;
        view.handle_keypress(Key::Up).await;
        view.handle_keypress(Key::Up).await;
        assert_eq!(view.scroll_back(), 2);
        view.handle_keypress(Key::Down).await;
        assert_eq!(view.scroll_back(), 1);
        assert_eq!(
            view.handle_keypress(Key::Char('n')).await,
            Keypress::Declined(Key::Char('n'))
        );
    }
}
