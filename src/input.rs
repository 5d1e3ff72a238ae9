use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::format::ToggleKind;

/// Result of handling a key in a text-entry mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// Stay in the current mode
    Continue,
    /// Accept the entered text and return to normal mode
    Commit(String),
    /// Drop the entered text and return to normal mode
    Cancel,
}

/// Check for escape key (Esc or Ctrl+[)
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Editor-wide keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Toggle(ToggleKind),
    SelectAll,
}

pub fn shortcut(key: KeyEvent) -> Option<Shortcut> {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        // terminals report Ctrl+Shift+Z either as 'Z' or as 'z' with SHIFT
        KeyCode::Char('Z') => Some(Shortcut::Redo),
        KeyCode::Char('z') if shift => Some(Shortcut::Redo),
        KeyCode::Char('z') => Some(Shortcut::Undo),
        KeyCode::Char('y') => Some(Shortcut::Redo),
        KeyCode::Char('b') => Some(Shortcut::Toggle(ToggleKind::Bold)),
        KeyCode::Char('i') => Some(Shortcut::Toggle(ToggleKind::Italic)),
        KeyCode::Char('u') => Some(Shortcut::Toggle(ToggleKind::Underline)),
        KeyCode::Char('a') => Some(Shortcut::SelectAll),
        _ => None,
    }
}

/// Arrow key as a `(row, col)` step
pub fn arrow_delta(code: KeyCode) -> Option<(isize, isize)> {
    match code {
        KeyCode::Up => Some((-1, 0)),
        KeyCode::Down => Some((1, 0)),
        KeyCode::Left => Some((0, -1)),
        KeyCode::Right => Some((0, 1)),
        _ => None,
    }
}

/// Line editor behind the `:` prompt
pub struct CommandHandler {
    pub buffer: String,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn start(&mut self) {
        self.buffer.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            self.buffer.clear();
            return KeyResult::Cancel;
        }

        match key.code {
            KeyCode::Enter => KeyResult::Commit(std::mem::take(&mut self.buffer)),
            KeyCode::Backspace => {
                // backspace on an empty prompt leaves it, as in vim
                if self.buffer.pop().is_none() {
                    return KeyResult::Cancel;
                }
                KeyResult::Continue
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                KeyResult::Continue
            }
            _ => KeyResult::Continue,
        }
    }
}
