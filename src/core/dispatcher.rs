//! Mode dispatcher: owns the views and bars and routes input and events

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::Frame;

use super::action::{Action, Target};
use super::key::Key;
use super::mode::Mode;
use super::view::{Bar, BarSlot, Keypress, View, WindowSize};
use crate::domain::NodeEvent;

/// Routes keys to the active view and fans events out to every view and bar.
pub struct ModeDispatcher {
    views: Vec<Box<dyn View>>,
    bars: Vec<Box<dyn Bar>>,
    current: Option<Mode>,
}

impl Default for ModeDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeDispatcher {
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            bars: Vec::new(),
            current: None,
        }
    }

    /// Register a view. A later view for the same mode replaces the earlier one.
    pub fn register_view(&mut self, view: Box<dyn View>) {
        let mode = view.mode();
        self.views.retain(|v| v.mode() != mode);
        self.views.push(view);
    }

    pub fn register_bar(&mut self, bar: Box<dyn Bar>) {
        self.bars.push(bar);
    }

    pub fn current(&self) -> Option<Mode> {
        self.current
    }

    fn view_mut(&mut self, mode: Mode) -> Option<&mut Box<dyn View>> {
        self.views.iter_mut().find(|v| v.mode() == mode)
    }

    fn view(&self, mode: Mode) -> Option<&dyn View> {
        self.views.iter().find(|v| v.mode() == mode).map(|v| v.as_ref())
    }

    /// Switch modes. The outgoing view is deactivated before the incoming one
    /// is activated, then the bars are told in registration order.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.current == Some(mode) {
            return;
        }
        if self.view(mode).is_none() {
            tracing::warn!(%mode, "no view registered for mode");
            return;
        }

        if let Some(outgoing) = self.current {
            if let Some(view) = self.view_mut(outgoing) {
                view.deactivate();
            }
        }
        if let Some(view) = self.view_mut(mode) {
            view.activate();
        }
        self.current = Some(mode);
        tracing::debug!(%mode, "mode changed");

        for bar in &mut self.bars {
            bar.on_mode_change(mode);
        }
    }

    /// Move to the cyclic neighbour of the current mode
    pub fn seek(&mut self, delta: i32) {
        if let Some(current) = self.current {
            self.set_mode(current.seek(delta));
        }
    }

    pub async fn handle_keypress(&mut self, key: Key) -> Action {
        let keypress = match self.current.and_then(|mode| {
            self.views.iter_mut().find(|v| v.mode() == mode)
        }) {
            Some(view) => view.handle_keypress(key).await,
            None => Keypress::Declined(key),
        };

        match keypress {
            Keypress::Handled(Action::Open(target)) => {
                self.open(&target).await;
                Action::None
            }
            Keypress::Handled(action) => action,
            Keypress::Declined(key) => self.handle_global(key),
        }
    }

    fn handle_global(&mut self, key: Key) -> Action {
        match key {
            Key::Left => self.seek(-1),
            Key::Right => self.seek(1),
            Key::Quit => return Action::Quit,
            key => {
                if let Some(mode) = key.printable().and_then(Mode::from_letter) {
                    self.set_mode(mode);
                }
            }
        }
        Action::None
    }

    /// Offer a target to every view, then show the view that browses it.
    /// When no view could load the target the mode stays where it was.
    pub async fn open(&mut self, target: &Target) -> bool {
        let mut accepted = false;
        for view in &mut self.views {
            accepted |= view.open(target).await;
        }
        if accepted {
            self.set_mode(target.mode());
        } else {
            tracing::debug!(?target, "no view accepted target");
        }
        accepted
    }

    pub fn broadcast_resize(&mut self, size: WindowSize) {
        for view in &mut self.views {
            view.on_resize(size);
        }
        for bar in &mut self.bars {
            bar.on_resize(size);
        }
    }

    pub fn broadcast_tick(&mut self, now: DateTime<Utc>) {
        for view in &mut self.views {
            view.on_tick(now);
        }
        for bar in &mut self.bars {
            bar.on_tick(now);
        }
    }

    pub fn broadcast_event(&mut self, event: &NodeEvent) {
        for view in &mut self.views {
            view.on_event(event);
        }
        for bar in &mut self.bars {
            bar.on_event(event);
        }
    }

    /// Whether the active view or any bar asked for a redraw. Clears every
    /// pending request.
    pub fn take_redraw(&mut self) -> bool {
        let mut redraw = false;
        if let Some(mode) = self.current {
            if let Some(view) = self.view_mut(mode) {
                redraw |= view.take_redraw();
            }
        }
        for bar in &mut self.bars {
            redraw |= bar.take_redraw();
        }
        redraw
    }

    /// Total rows claimed by the bars in `slot`
    pub fn bar_height(&self, slot: BarSlot) -> u16 {
        self.bars
            .iter()
            .filter(|bar| bar.slot() == slot)
            .map(|bar| bar.height())
            .sum()
    }

    /// Draw the bars of `slot` stacked from the top of `area`.
    pub fn render_bars(&self, frame: &mut Frame, area: Rect, slot: BarSlot) {
        let mut y = area.y;
        for bar in self.bars.iter().filter(|bar| bar.slot() == slot) {
            let height = bar.height().min(area.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            bar.render(frame, Rect::new(area.x, y, area.width, height));
            y += height;
        }
    }

    pub fn render_view(&self, frame: &mut Frame, area: Rect) {
        if let Some(view) = self.current.and_then(|mode| self.view(mode)) {
            view.render(frame, area);
        }
    }
}
