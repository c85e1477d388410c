//! Screen trait for the full-page views hosted by the App.
//!
//! Screens follow the Elm architecture with a single-funnel update pattern:
//! - `init()` queues initial message(s)
//! - `handle_input()` queues messages from user input
//! - `handle_tick()` handles animation ticks
//! - `update()` processes all queued messages
//!
//! Only `update()` can return commands, close the screen, or report errors.

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::command::Command;
use crate::tui::Event;
use crate::ui::Keybinding;

/// Result from `update()`
pub enum UpdateResult {
    /// No action needed
    Idle,
    /// Spawn these commands
    Commands(Vec<Box<dyn Command>>),
    /// Leave this screen
    Close,
    /// Report an error
    Error(String),
}

impl<T: Command> From<T> for UpdateResult {
    fn from(value: T) -> Self {
        Self::Commands(vec![Box::new(value)])
    }
}

/// A full-page view.
///
/// The App calls methods in this order:
///
/// 1. `init()` then `update()` once when the screen is created
/// 2. For each event:
///    - `handle_tick()` if tick event
///    - `handle_input()` if input event, then `update()` if consumed
/// 3. `update()` after any command completes
pub trait Screen {
    /// Queue the startup message(s).
    fn init(&mut self) {}

    /// Advance animations. Never queues messages.
    fn handle_tick(&mut self) {}

    /// Queue messages for a key or mouse event. Returns `true` if consumed.
    fn handle_input(&mut self, event: &Event) -> bool;

    /// Process all queued messages. **This is the single funnel.**
    fn update(&mut self) -> UpdateResult;

    /// Render the current state.
    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Shown in the status bar.
    fn title(&self) -> String;

    /// Key hints for the current state.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}
