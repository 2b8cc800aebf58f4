//! Interactive checkbox selector
//!
//! A single-threaded modal loop: render every row, block on the next key,
//! apply it to the [`SelectionState`], repeat until the user confirms. The
//! loop has two states, running and confirmed; only `Confirm` leaves it.
//!
//! Terminal setup is not done here. The caller hands in a ratatui
//! `Terminal` (see [`crate::terminal::TerminalSession`]) and an
//! [`InputSource`], which keeps the loop drivable from tests.

use crate::catalog::{Catalog, InstalledStatus};
use crate::error::{Result, SetupError};
use crate::keymap::Keymap;
use crate::ui::{self, SelectorView};
use crossterm::event::{self, Event, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use std::collections::VecDeque;
use tracing::trace;

/// Input events the selector understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorEvent {
    MoveUp,
    MoveDown,
    ToggleCurrent,
    Confirm,
    /// Unbound input; leaves the state untouched
    Ignored,
}

/// Selector loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorStatus {
    Running,
    Confirmed,
}

/// Cursor position and one selected flag per catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    cursor: usize,
    selected: Vec<bool>,
}

impl SelectionState {
    /// Fresh state: cursor on the first row, nothing selected
    pub fn new(rows: usize) -> Self {
        Self {
            cursor: 0,
            selected: vec![false; rows],
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> &[bool] {
        &self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Apply one event and report whether the session is still running
    pub fn apply(&mut self, event: SelectorEvent) -> SelectorStatus {
        match event {
            SelectorEvent::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            SelectorEvent::MoveDown => {
                if self.cursor + 1 < self.selected.len() {
                    self.cursor += 1;
                }
            }
            SelectorEvent::ToggleCurrent => {
                if let Some(flag) = self.selected.get_mut(self.cursor) {
                    *flag = !*flag;
                }
            }
            SelectorEvent::Confirm => return SelectorStatus::Confirmed,
            SelectorEvent::Ignored => {}
        }
        SelectorStatus::Running
    }

    /// Selection snapshot, one flag per row in catalog order
    pub fn into_selection(self) -> Vec<bool> {
        self.selected
    }
}

/// Blocking source of key presses
pub trait InputSource {
    /// Wait for the next input. `None` means something other than a key
    /// arrived (for example a resize) and the screen should just be redrawn.
    fn next_key(&mut self) -> Result<Option<KeyEvent>>;
}

/// Reads keys from the real terminal
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        match event::read()? {
            Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// Replays a fixed list of keys; fails once they run out instead of blocking
#[derive(Debug, Default)]
pub struct ScriptedInput {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedInput {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        self.keys
            .pop_front()
            .map(Some)
            .ok_or_else(|| SetupError::terminal("input ended before the selection was confirmed"))
    }
}

/// One interactive selection session over a catalog
pub struct Selector<'a> {
    catalog: &'a Catalog,
    installed: InstalledStatus,
    keymap: Keymap,
    state: SelectionState,
}

impl<'a> Selector<'a> {
    /// Start a session. `installed` is the annotation for this render pass.
    pub fn new(catalog: &'a Catalog, installed: InstalledStatus) -> Self {
        Self {
            catalog,
            installed,
            keymap: Keymap::default(),
            state: SelectionState::new(catalog.len()),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Feed one key into the session
    pub fn handle_key(&mut self, key: &KeyEvent) -> SelectorStatus {
        let event = self.keymap.resolve(key);
        trace!(?event, cursor = self.state.cursor(), "Selector input");
        self.state.apply(event)
    }

    fn view(&self) -> SelectorView<'_> {
        SelectorView {
            catalog: self.catalog,
            installed: &self.installed,
            state: &self.state,
            hint: self.keymap.hint_line(),
        }
    }

    /// Run until the user confirms, returning the selection snapshot
    pub fn run<B: Backend, I: InputSource>(
        mut self,
        terminal: &mut Terminal<B>,
        input: &mut I,
    ) -> Result<Vec<bool>> {
        loop {
            {
                let view = self.view();
                terminal.draw(|f| ui::render_selector(f, &view))?;
            }

            let Some(key) = input.next_key()? else {
                continue;
            };
            if self.handle_key(&key) == SelectorStatus::Confirmed {
                return Ok(self.state.into_selection());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new(4);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.selected(), &[false; 4]);
    }

    #[test]
    fn test_move_up_at_top_is_noop() {
        let mut state = SelectionState::new(3);
        let before = state.clone();
        assert_eq!(state.apply(SelectorEvent::MoveUp), SelectorStatus::Running);
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_down_stops_at_bottom() {
        let mut state = SelectionState::new(3);
        for _ in 0..10 {
            state.apply(SelectorEvent::MoveDown);
        }
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn test_toggle_only_touches_current_row() {
        let mut state = SelectionState::new(3);
        state.apply(SelectorEvent::MoveDown);
        state.apply(SelectorEvent::ToggleCurrent);
        assert_eq!(state.selected(), &[false, true, false]);
        state.apply(SelectorEvent::ToggleCurrent);
        assert_eq!(state.selected(), &[false, false, false]);
    }

    #[test]
    fn test_ignored_and_confirm() {
        let mut state = SelectionState::new(2);
        state.apply(SelectorEvent::ToggleCurrent);
        assert_eq!(state.apply(SelectorEvent::Ignored), SelectorStatus::Running);
        assert_eq!(state.apply(SelectorEvent::Confirm), SelectorStatus::Confirmed);
        assert_eq!(state.into_selection(), vec![true, false]);
    }

    #[test]
    fn test_empty_state_does_not_panic() {
        let mut state = SelectionState::new(0);
        state.apply(SelectorEvent::MoveDown);
        state.apply(SelectorEvent::ToggleCurrent);
        assert_eq!(state.cursor(), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_selector_handle_key_uses_keymap() {
        let catalog = Catalog::default();
        let mut selector = Selector::new(&catalog, InstalledStatus::none(catalog.len()));
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(selector.handle_key(&space), SelectorStatus::Running);
        assert!(selector.state().is_selected(0));
        assert_eq!(selector.handle_key(&enter), SelectorStatus::Confirmed);
    }

    #[test]
    fn test_scripted_input_errors_when_exhausted() {
        let mut input = ScriptedInput::new(vec![KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)]);
        assert!(input.next_key().unwrap().is_some());
        assert!(input.next_key().is_err());
    }
}
