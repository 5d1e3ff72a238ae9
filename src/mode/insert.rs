use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::{is_escape, KeyResult};
use crate::string::{word_end, word_start};
use crate::util::{char_count, insert_char_at, remove_char_at};

/// Direct text entry into the active cell.
/// Note: cursor is a CHARACTER index, not a byte index
pub struct InsertHandler {
    pub buffer: String,
    pub cursor: usize,
    /// Whole buffer selected (Ctrl+A); the next edit replaces it
    pub select_all: bool,
}

impl InsertHandler {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            select_all: false,
        }
    }

    pub fn start_edit(&mut self, initial: String, select_all: bool) {
        self.cursor = char_count(&initial);
        self.buffer = initial;
        self.select_all = select_all;
    }

    pub fn select_all(&mut self) {
        self.select_all = true;
        self.cursor = char_count(&self.buffer);
    }

    fn take_selection(&mut self) -> bool {
        if self.select_all {
            self.select_all = false;
            self.buffer.clear();
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    fn insert(&mut self, c: char) {
        self.take_selection();
        self.buffer = insert_char_at(&self.buffer, self.cursor, c);
        self.cursor += 1;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            return KeyResult::Cancel;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            // Alt+Enter breaks the line; plain Enter commits
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => self.insert('\n'),
            KeyCode::Enter => return KeyResult::Commit(self.buffer.clone()),
            KeyCode::Backspace => {
                if !self.take_selection() && self.cursor > 0 {
                    self.cursor -= 1;
                    if let Some((buffer, _)) = remove_char_at(&self.buffer, self.cursor) {
                        self.buffer = buffer;
                    }
                }
            }
            KeyCode::Delete => {
                if !self.take_selection() {
                    if let Some((buffer, _)) = remove_char_at(&self.buffer, self.cursor) {
                        self.buffer = buffer;
                    }
                }
            }
            KeyCode::Char(c) if !ctrl => self.insert(c),
            KeyCode::Left if ctrl => {
                self.select_all = false;
                self.cursor = word_start(&self.buffer, self.cursor);
            }
            KeyCode::Right if ctrl => {
                self.select_all = false;
                self.cursor = word_end(&self.buffer, self.cursor);
            }
            KeyCode::Left => {
                self.select_all = false;
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.select_all = false;
                self.cursor = std::cmp::min(self.cursor + 1, char_count(&self.buffer));
            }
            KeyCode::Home => {
                self.select_all = false;
                self.cursor = 0;
            }
            KeyCode::End => {
                self.select_all = false;
                self.cursor = char_count(&self.buffer);
            }
            _ => {}
        }

        KeyResult::Continue
    }
}
