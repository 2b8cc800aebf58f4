//! Keybindings for the selector
//!
//! Maps crossterm key events onto [`SelectorEvent`]s. Anything unbound
//! resolves to [`SelectorEvent::Ignored`].

use crate::selector::SelectorEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub event: SelectorEvent,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, event: SelectorEvent, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            event,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        self.key == key.code && key.modifiers == self.modifiers
    }
}

/// Keybinding registry for the checkbox menu
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Keybinding>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

impl Keymap {
    /// Arrow keys move, Space toggles, Enter confirms
    pub fn new() -> Self {
        Self {
            bindings: vec![
                Keybinding::new(KeyCode::Up, SelectorEvent::MoveUp, "↑", "navigate"),
                Keybinding::new(KeyCode::Down, SelectorEvent::MoveDown, "↓", "navigate"),
                Keybinding::new(KeyCode::Char(' '), SelectorEvent::ToggleCurrent, "Space", "select"),
                Keybinding::new(KeyCode::Enter, SelectorEvent::Confirm, "Enter", "confirm"),
            ],
        }
    }

    /// Resolve a key event. Release and repeat events never act.
    pub fn resolve(&self, key: &KeyEvent) -> SelectorEvent {
        if key.kind != KeyEventKind::Press {
            return SelectorEvent::Ignored;
        }
        self.bindings
            .iter()
            .find(|binding| binding.matches(key))
            .map(|binding| binding.event)
            .unwrap_or(SelectorEvent::Ignored)
    }

    /// Hint line shown above the rows
    pub fn hint_line(&self) -> String {
        let arrows: Vec<&str> = self
            .bindings
            .iter()
            .filter(|b| matches!(b.event, SelectorEvent::MoveUp | SelectorEvent::MoveDown))
            .map(|b| b.display.as_str())
            .collect();
        let mut parts = vec![format!("Use {} to navigate.", arrows.join(" "))];
        parts.extend(
            self.bindings
                .iter()
                .filter(|b| matches!(b.event, SelectorEvent::ToggleCurrent | SelectorEvent::Confirm))
                .map(|b| format!("[{}] to {}.", b.display, b.description)),
        );
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(&press(KeyCode::Up)), SelectorEvent::MoveUp);
        assert_eq!(keymap.resolve(&press(KeyCode::Down)), SelectorEvent::MoveDown);
        assert_eq!(keymap.resolve(&press(KeyCode::Char(' '))), SelectorEvent::ToggleCurrent);
        assert_eq!(keymap.resolve(&press(KeyCode::Enter)), SelectorEvent::Confirm);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(&press(KeyCode::Char('q'))), SelectorEvent::Ignored);
        assert_eq!(keymap.resolve(&press(KeyCode::Esc)), SelectorEvent::Ignored);
        assert_eq!(keymap.resolve(&press(KeyCode::Left)), SelectorEvent::Ignored);
    }

    #[test]
    fn test_modified_keys_are_ignored() {
        let keymap = Keymap::new();
        let ctrl_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        let alt_space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::ALT);
        let shift_down = KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT);
        assert_eq!(keymap.resolve(&ctrl_enter), SelectorEvent::Ignored);
        assert_eq!(keymap.resolve(&alt_space), SelectorEvent::Ignored);
        assert_eq!(keymap.resolve(&shift_down), SelectorEvent::Ignored);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let keymap = Keymap::new();
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(keymap.resolve(&release), SelectorEvent::Ignored);
    }

    #[test]
    fn test_hint_line() {
        assert_eq!(
            Keymap::new().hint_line(),
            "Use ↑ ↓ to navigate. [Space] to select. [Enter] to confirm."
        );
    }
}
