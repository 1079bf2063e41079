//! Screen trait and transition type for the game state machine.

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::GameInfo;

/// What a screen asks the controller to do next.
///
/// Screens return this from [`Screen::handle_key`] and [`Screen::update`] to
/// drive the [`GameController`](crate::GameController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTransition {
    /// Stay on the current screen.
    Stay,
    /// Back to the main menu.
    GoToMenu,
    /// Start a fresh level.
    GoToLevel,
    /// Show the report for the game just played.
    GoToReport,
    /// Exit the game.
    Quit,
}

/// Trait implemented by each screen in the game state machine.
///
/// Each screen owns its own state. The shared [`GameInfo`] record is passed
/// in so results survive transitions.
pub trait Screen {
    /// Renders the screen into the provided [`Frame`].
    fn render(&self, frame: &mut Frame, info: &GameInfo);

    /// Handles a key event and returns the resulting [`ScreenTransition`].
    fn handle_key(&mut self, key: KeyEvent, info: &mut GameInfo) -> ScreenTransition;

    /// Advances time-driven state by `elapsed_ms`.
    fn update(&mut self, _elapsed_ms: u64, _info: &mut GameInfo) -> ScreenTransition {
        ScreenTransition::Stay
    }
}
