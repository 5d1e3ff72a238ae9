use std::cmp;
use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, info};

use crate::editor::CellTableEditor;
use crate::format::{FormatCommand, ToolbarAction};
use crate::input::{arrow_delta, shortcut, CommandHandler, KeyResult, Shortcut};
use crate::mode::command::Command;
use crate::mode::insert::InsertHandler;
use crate::mode::Mode;
use crate::session::Session;
use crate::store::KeyValueStore;
use crate::style::{Style, Theme};
use crate::grid::CellId;
use crate::ui;

const WHEEL_STEP: u32 = 3;

/// Status-line notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Warning(String),
    Error(String),
}

pub struct App {
    pub editor: CellTableEditor,
    pub store: Box<dyn KeyValueStore>,
    pub style: Style,
    pub session: Session,
    pub mode: Mode,
    pub message: Option<Message>,
    pub should_quit: bool,
    /// First surface line shown
    pub scroll: u32,
    pub insert_handler: InsertHandler,
    pub command_handler: CommandHandler,
    /// Saved markup waiting for y/n
    pending_load: Option<String>,
    /// Last known terminal size, for mouse hit-testing
    viewport: Rect,
}

impl App {
    pub fn new(editor: CellTableEditor, store: Box<dyn KeyValueStore>, style: Style, session: Session) -> Self {
        Self {
            editor,
            store,
            style,
            session,
            mode: Mode::Normal,
            message: None,
            should_quit: false,
            scroll: 0,
            insert_handler: InsertHandler::new(),
            command_handler: CommandHandler::new(),
            pending_load: None,
            viewport: Rect::new(0, 0, 80, 24),
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        self.viewport = terminal.size()?;
        while !self.should_quit {
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.message = None;
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        self.viewport = Rect::new(0, 0, width, height);
                        self.clamp_scroll();
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.message = Some(Message::Info(msg.into()));
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.message = Some(Message::Warning(msg.into()));
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.message = Some(Message::Error(msg.into()));
    }

    // === scrolling ===

    fn max_scroll(&self) -> u32 {
        let area = ui::screen_layout(self.viewport).surface;
        ui::place_cells(self.editor.surface(), area.width)
            .height
            .saturating_sub(area.height as u32)
    }

    fn clamp_scroll(&mut self) {
        self.scroll = cmp::min(self.scroll, self.max_scroll());
    }

    /// Scroll so the cell being moved (range corner or active cell) is visible
    fn follow(&mut self, id: Option<CellId>) {
        let Some(id) = id else {
            return;
        };
        let area = ui::screen_layout(self.viewport).surface;
        self.scroll = ui::scroll_to_show(self.editor.surface(), area.width, area.height, self.scroll, id);
    }

    // === key handling ===

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Insert => self.handle_insert_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Confirm => self.handle_confirm_mode(key),
        }
    }

    /// Run an editor shortcut. Returns false when there was nothing for it
    /// to act on, so the key counts as unhandled.
    fn handle_shortcut(&mut self, shortcut: Shortcut) -> bool {
        match shortcut {
            Shortcut::Undo => self.undo(),
            Shortcut::Redo => self.redo(),
            Shortcut::Toggle(kind) => {
                if self.editor.targets().is_empty() {
                    return false;
                }
                self.apply_format(FormatCommand::Toggle(kind));
                true
            }
            Shortcut::SelectAll => match self.editor.active() {
                Some(id) => {
                    self.start_insert(id, true);
                    true
                }
                None => false,
            },
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if let Some(s) = shortcut(key) {
            if !self.handle_shortcut(s) {
                debug!(?s, "shortcut without a target");
            }
            return;
        }

        if let Some((dr, dc)) = arrow_delta(key.code) {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                if self.editor.extend_with_keyboard(dr, dc) {
                    self.follow(self.editor.selection().cursor());
                }
            } else if self.editor.move_active(dr, dc) {
                self.follow(self.editor.active());
            }
            return;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Char('i') => {
                if let Some(id) = self.editor.active() {
                    self.start_insert(id, false);
                }
            }
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_handler.start();
            }
            KeyCode::Char('u') => {
                self.undo();
            }
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => self.editor.clear_selection(),
            KeyCode::PageDown => {
                let page = ui::screen_layout(self.viewport).surface.height as u32;
                self.scroll = cmp::min(self.scroll + page, self.max_scroll());
            }
            KeyCode::PageUp => {
                let page = ui::screen_layout(self.viewport).surface.height as u32;
                self.scroll = self.scroll.saturating_sub(page);
            }
            _ => {}
        }
    }

    fn start_insert(&mut self, id: CellId, select_all: bool) {
        let text = self.editor.cell_text(id).unwrap_or_default();
        self.insert_handler.start_edit(text, select_all);
        self.mode = Mode::Insert;
    }

    /// Write the insert buffer into the active cell
    fn commit_insert(&mut self) {
        self.mode = Mode::Normal;
        let Some(id) = self.editor.active() else {
            return;
        };
        let text = std::mem::take(&mut self.insert_handler.buffer);
        if self.editor.replace_text(id, &text) {
            debug!(?id, "cell text replaced");
        }
    }

    fn handle_insert_mode(&mut self, key: KeyEvent) {
        match shortcut(key) {
            Some(Shortcut::SelectAll) => {
                self.insert_handler.select_all();
                return;
            }
            Some(s) => {
                // formatting and history act on committed content
                self.commit_insert();
                self.handle_shortcut(s);
                return;
            }
            None => {}
        }

        match self.insert_handler.handle_key(key) {
            KeyResult::Commit(text) => {
                self.insert_handler.buffer = text;
                self.commit_insert();
            }
            KeyResult::Cancel => self.mode = Mode::Normal,
            KeyResult::Continue => {}
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) {
        match self.command_handler.handle_key(key) {
            KeyResult::Commit(input) => {
                self.mode = Mode::Normal;
                if !input.trim().is_empty() {
                    self.execute_command(Command::parse(&input));
                }
            }
            KeyResult::Cancel => self.mode = Mode::Normal,
            KeyResult::Continue => {}
        }
    }

    fn handle_confirm_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Normal;
                if let Some(markup) = self.pending_load.take() {
                    match self.editor.apply_markup(&markup) {
                        Ok(()) => {
                            self.clamp_scroll();
                            self.info("Loaded saved content");
                        }
                        Err(e) => self.error(format!("Saved content is unreadable: {}", e)),
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.pending_load = None;
                self.info("Load cancelled");
            }
            _ => {}
        }
    }

    // === commands ===

    fn execute_command(&mut self, cmd: Command) {
        match cmd {
            Command::Write => {
                self.save();
            }
            Command::Load => self.begin_load(),
            Command::Quit => self.quit(),
            Command::ForceQuit => self.should_quit = true,
            Command::WriteQuit => {
                if self.save() {
                    self.should_quit = true;
                }
            }
            Command::Format(format) => self.apply_format(format),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Theme(name) => self.set_theme(&name),
            Command::ThemeList => {
                self.info(format!("Themes: {}", Theme::builtin_names().join(", ")));
            }
            Command::Invalid(msg) => self.error(msg),
            Command::Unknown(input) => self.error(format!("Unknown command: {}", input)),
        }
    }

    fn set_theme(&mut self, name: &str) {
        let theme = match Theme::by_name(name) {
            Some(theme) => Ok(theme),
            None if name.ends_with(".toml") => Theme::from_file(Path::new(name)).map_err(|e| e.to_string()),
            None => Err(format!("Unknown theme: {}", name)),
        };
        match theme {
            Ok(theme) => {
                let msg = format!("Theme: {}", theme.name);
                self.style.set_theme(theme);
                self.info(msg);
            }
            Err(e) => self.error(e),
        }
    }

    fn apply_format(&mut self, command: FormatCommand) {
        let changed = self.editor.apply(&command);
        if changed > 0 {
            self.info(format!("{} ({} cell{})", command.describe(), changed, if changed == 1 { "" } else { "s" }));
        }
    }

    fn undo(&mut self) -> bool {
        if self.editor.undo() {
            self.clamp_scroll();
            true
        } else {
            self.info("Already at oldest change");
            false
        }
    }

    fn redo(&mut self) -> bool {
        if self.editor.redo() {
            self.clamp_scroll();
            true
        } else {
            self.info("Already at newest change");
            false
        }
    }

    fn save(&mut self) -> bool {
        match self.editor.save(self.store.as_mut()) {
            Ok(()) => {
                self.info("Saved");
                true
            }
            Err(e) => {
                self.error(format!("Save failed: {}", e));
                false
            }
        }
    }

    fn begin_load(&mut self) {
        match self.editor.fetch_saved(self.store.as_ref()) {
            Ok(Some(markup)) => {
                self.pending_load = Some(markup);
                self.mode = Mode::Confirm;
            }
            Ok(None) => self.warn("No saved content"),
            Err(e) => self.error(format!("Load failed: {}", e)),
        }
    }

    /// At startup: prompt for saved content only if there is some
    pub fn offer_saved(&mut self) {
        match self.editor.fetch_saved(self.store.as_ref()) {
            Ok(Some(markup)) => {
                self.pending_load = Some(markup);
                self.mode = Mode::Confirm;
            }
            Ok(None) => {}
            Err(e) => self.error(format!("Load failed: {}", e)),
        }
    }

    fn quit(&mut self) {
        if self.editor.is_dirty() {
            self.warn("Unsaved changes! Use :q! to force quit");
        } else {
            info!("quit");
            self.should_quit = true;
        }
    }

    // === mouse handling ===

    fn toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Undo => {
                self.undo();
            }
            ToolbarAction::Redo => {
                self.redo();
            }
            other => {
                if let Some(command) = other.command() {
                    self.apply_format(command);
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if matches!(self.mode, Mode::Command | Mode::Confirm) {
            return;
        }
        let screen = ui::screen_layout(self.viewport);
        let (x, y) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.mode == Mode::Insert {
                    self.commit_insert();
                }
                if let Some(action) = ui::toolbar_hit(screen.toolbar, x, y) {
                    self.toolbar_action(action);
                    return;
                }
                // status and command lines are chrome too
                if !ui::rect_contains(screen.surface, x, y) {
                    return;
                }
                let hit = ui::cell_at(self.editor.surface(), screen.surface, self.scroll, x, y);
                self.editor.pointer_down(hit, mouse.modifiers.contains(KeyModifiers::SHIFT));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.editor.selection().is_selecting() {
                    let hit = ui::cell_at(self.editor.surface(), screen.surface, self.scroll, x, y);
                    self.editor.pointer_move(hit);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.editor.pointer_up(),
            MouseEventKind::ScrollDown => {
                self.scroll = cmp::min(self.scroll + WHEEL_STEP, self.max_scroll());
            }
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(WHEEL_STEP);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod test;
