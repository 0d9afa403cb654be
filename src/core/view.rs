//! View and bar traits driven by the mode dispatcher

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::Frame;

use super::action::{Action, Target};
use super::key::Key;
use super::mode::Mode;
use crate::domain::NodeEvent;

/// Terminal size in cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// Result of offering a key to a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keypress {
    Handled(Action),
    /// The view did not use the key; the dispatcher interprets it globally
    Declined(Key),
}

/// Visibility and redraw bookkeeping shared by every view.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    visible: bool,
    redraw: bool,
    size: WindowSize,
}

impl ViewState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn size(&self) -> WindowSize {
        self.size
    }

    pub fn activate(&mut self) {
        self.visible = true;
        self.redraw = true;
    }

    pub fn deactivate(&mut self) {
        self.visible = false;
        self.redraw = false;
    }

    pub fn resize(&mut self, size: WindowSize) {
        self.size = size;
        self.request_redraw();
    }

    /// Hidden views are redrawn on activation, so requests are dropped.
    pub fn request_redraw(&mut self) {
        if self.visible {
            self.redraw = true;
        }
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
}

/// One mode's screen.
///
/// Every view receives every resize, tick and node event whether or not it is
/// visible, so its state is current the moment it is activated.
#[async_trait::async_trait]
pub trait View: Send {
    fn mode(&self) -> Mode;

    fn activate(&mut self);

    fn deactivate(&mut self);

    async fn handle_keypress(&mut self, key: Key) -> Keypress;

    fn on_resize(&mut self, _size: WindowSize) {}

    fn on_tick(&mut self, _now: DateTime<Utc>) {}

    fn on_event(&mut self, _event: &NodeEvent) {}

    /// Point the view at a target owned by another view. Returns whether the
    /// view now shows it; a view that could not load the target keeps its
    /// previous state.
    async fn open(&mut self, _target: &Target) -> bool {
        false
    }

    fn take_redraw(&mut self) -> bool;

    fn render(&self, frame: &mut Frame, area: Rect);
}

/// Where a bar is drawn relative to the view area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSlot {
    Top,
    Bottom,
}

/// Global observer drawn outside the view area (header, footer)
pub trait Bar: Send {
    fn slot(&self) -> BarSlot;

    /// Rows the bar occupies
    fn height(&self) -> u16 {
        1
    }

    fn on_mode_change(&mut self, _mode: Mode) {}

    fn on_resize(&mut self, _size: WindowSize) {}

    fn on_event(&mut self, _event: &NodeEvent) {}

    fn on_tick(&mut self, _now: DateTime<Utc>) {}

    fn take_redraw(&mut self) -> bool;

    fn render(&self, frame: &mut Frame, area: Rect);
}
