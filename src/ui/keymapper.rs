//! Key mapping for terminal input
//!
//! Converts crossterm key events into the actions the run loop understands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Enter
    Submit,
    Insert(char),
    Backspace,
    /// Up: older history entry
    HistoryPrev,
    /// Down: newer history entry
    HistoryNext,
    /// Ctrl+Left
    DeckPrev,
    /// Ctrl+Right
    DeckNext,
    ScrollUp,
    ScrollDown,
    /// Ctrl+T
    ToggleTheme,
    /// Ctrl+C or Ctrl+D
    Quit,
}

/// Key mapper for converting key events to input actions
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent, `None` for keys with no meaning here
    pub fn map(event: &KeyEvent) -> Option<InputAction> {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        match event.code {
            KeyCode::Char(ch) if ctrl && !alt => Self::map_ctrl_char(ch),
            // Alt combinations are not text
            KeyCode::Char(_) if alt => None,
            KeyCode::Char(ch) => Some(InputAction::Insert(ch)),

            KeyCode::Enter => Some(InputAction::Submit),
            KeyCode::Backspace => Some(InputAction::Backspace),

            // Arrow keys
            KeyCode::Up => Some(InputAction::HistoryPrev),
            KeyCode::Down => Some(InputAction::HistoryNext),
            KeyCode::Left if ctrl => Some(InputAction::DeckPrev),
            KeyCode::Right if ctrl => Some(InputAction::DeckNext),

            // Scrollback
            KeyCode::PageUp => Some(InputAction::ScrollUp),
            KeyCode::PageDown => Some(InputAction::ScrollDown),

            _ => None,
        }
    }

    fn map_ctrl_char(ch: char) -> Option<InputAction> {
        match ch.to_ascii_lowercase() {
            'c' | 'd' => Some(InputAction::Quit),
            't' => Some(InputAction::ToggleTheme),
            _ => None,
        }
    }
}
