use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::*;
use crate::format::ToggleKind;
use crate::grid::{Cell, Surface};
use crate::store::{MemoryStore, CONTENT_KEY};

// 80x24 screen: toolbar on row 0, surface rows 1..22, status 22, command 23.
// Cells are 40 wide and 3 tall; table 1 row 0 is on screen rows 2..5.

fn app_with(surface: Surface, store: MemoryStore) -> App {
    let editor = CellTableEditor::new(surface, 50);
    App::new(editor, Box::new(store), Style::default(), Session::new(Some("Ana".to_string()), Some(3)))
}

/// Every cell holds its own coordinates as text
fn filled(rows: usize, cols: usize) -> Surface {
    let mut surface = Surface::blank(1, rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            *surface.cell_mut(CellId::new(0, row, col)).unwrap() = Cell::with_text(&format!("r{row}c{col}"));
        }
    }
    surface
}

fn app() -> App {
    app_with(filled(3, 2), MemoryStore::new())
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(app: &mut App, c: char) {
    app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn command(app: &mut App, cmd: &str) {
    press(app, KeyCode::Char(':'));
    type_str(app, cmd);
    press(app, KeyCode::Enter);
}

fn mouse(app: &mut App, kind: MouseEventKind, x: u16, y: u16, modifiers: KeyModifiers) {
    app.handle_mouse(MouseEvent {
        kind,
        column: x,
        row: y,
        modifiers,
    });
}

fn click(app: &mut App, x: u16, y: u16) {
    mouse(app, MouseEventKind::Down(MouseButton::Left), x, y, KeyModifiers::NONE);
    mouse(app, MouseEventKind::Up(MouseButton::Left), x, y, KeyModifiers::NONE);
}

fn shift_drag(app: &mut App, from: (u16, u16), to: (u16, u16)) {
    mouse(app, MouseEventKind::Down(MouseButton::Left), from.0, from.1, KeyModifiers::SHIFT);
    mouse(app, MouseEventKind::Drag(MouseButton::Left), to.0, to.1, KeyModifiers::SHIFT);
    mouse(app, MouseEventKind::Up(MouseButton::Left), to.0, to.1, KeyModifiers::SHIFT);
}

fn id(row: usize, col: usize) -> CellId {
    CellId::new(0, row, col)
}

fn bold_at(app: &App) -> bool {
    app.editor.toolbar_state().map_or(false, |s| s.is_active(ToggleKind::Bold))
}

#[test]
fn test_type_then_bold_then_undo() {
    let mut app = app();
    press(&mut app, KeyCode::Down);
    assert_eq!(app.editor.active(), Some(id(0, 0)));

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode, Mode::Insert);
    type_str(&mut app, " Pay");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "r0c0 Pay");

    ctrl(&mut app, 'b');
    assert!(bold_at(&app));
    assert_eq!(app.editor.history().len(), 3);

    ctrl(&mut app, 'z');
    assert!(!bold_at(&app));
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "r0c0 Pay");
    ctrl(&mut app, 'y');
    assert!(bold_at(&app));
}

#[test]
fn test_escape_discards_typing() {
    let mut app = app();
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    type_str(&mut app, "draft");
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "r0c0");
    assert_eq!(app.editor.history().len(), 1);
}

#[test]
fn test_select_all_replaces_cell_text() {
    let mut surface = Surface::blank(1, 1, 1);
    *surface.cell_mut(id(0, 0)).unwrap() = Cell::with_text("old");
    let mut app = app_with(surface, MemoryStore::new());

    // nothing active yet
    assert!(!app.handle_shortcut(Shortcut::SelectAll));

    press(&mut app, KeyCode::Down);
    ctrl(&mut app, 'a');
    assert_eq!(app.mode, Mode::Insert);
    type_str(&mut app, "new");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "new");
}

#[test]
fn test_shortcuts_without_target_are_unhandled() {
    let mut app = app();
    assert!(!app.handle_shortcut(Shortcut::Toggle(ToggleKind::Bold)));
    assert!(!app.handle_shortcut(Shortcut::Undo));
    assert!(!app.handle_shortcut(Shortcut::Redo));
    assert_eq!(app.editor.history().len(), 1);
}

#[test]
fn test_click_and_shift_drag_then_toolbar() {
    let mut app = app();
    click(&mut app, 5, 3);
    assert_eq!(app.editor.active(), Some(id(0, 0)));

    shift_drag(&mut app, (45, 6), (5, 9));
    assert_eq!(app.editor.selection().selected().len(), 4);
    // the plain click's cell stays active
    assert_eq!(app.editor.active(), Some(id(0, 0)));

    // "B" is the first toolbar control
    click(&mut app, 1, 0);
    assert_eq!(app.editor.history().len(), 2);
    for cell in [id(1, 0), id(1, 1), id(2, 0), id(2, 1)] {
        let html = crate::doc::markup::write_fragment(&app.editor.surface().cell(cell).unwrap().content);
        assert!(html.contains("<b>"), "{html}");
    }
    assert!(matches!(app.message, Some(Message::Info(_))));
}

#[test]
fn test_click_outside_cells_clears_range() {
    let mut app = app();
    click(&mut app, 5, 3);
    shift_drag(&mut app, (5, 3), (45, 6));
    assert_eq!(app.editor.selection().selected().len(), 4);

    // status bar is chrome: the range survives
    click(&mut app, 5, 22);
    assert_eq!(app.editor.selection().selected().len(), 4);

    // empty surface area below the table
    click(&mut app, 5, 15);
    assert!(app.editor.selection().selected().is_empty());
    assert_eq!(app.editor.active(), Some(id(0, 0)));
}

#[test]
fn test_click_commits_insert() {
    let mut app = app();
    click(&mut app, 5, 3);
    press(&mut app, KeyCode::Enter);
    type_str(&mut app, "!");
    click(&mut app, 45, 3);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "r0c0!");
    assert_eq!(app.editor.active(), Some(id(0, 1)));
}

#[test]
fn test_format_commands() {
    let mut app = app();
    press(&mut app, KeyCode::Down);
    command(&mut app, "size 14");
    assert_eq!(
        app.editor.surface().cell(id(0, 0)).unwrap().style.font_size.as_deref(),
        Some("14px")
    );

    command(&mut app, "align middle");
    assert!(matches!(app.message, Some(Message::Error(_))));

    command(&mut app, "frobnicate");
    assert_eq!(app.message, Some(Message::Error("Unknown command: frobnicate".to_string())));
}

#[test]
fn test_quit_guard_and_save() {
    let mut app = app();
    press(&mut app, KeyCode::Down);
    command(&mut app, "bold");
    assert!(app.editor.is_dirty());

    command(&mut app, "q");
    assert!(!app.should_quit);
    assert!(matches!(app.message, Some(Message::Warning(_))));

    command(&mut app, "w");
    assert!(!app.editor.is_dirty());
    assert!(app.store.get(CONTENT_KEY).unwrap().is_some());

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
}

#[test]
fn test_save_failure_reported() {
    let mut store = MemoryStore::new();
    store.fail_writes = true;
    let mut app = app_with(filled(2, 2), store);
    press(&mut app, KeyCode::Down);
    command(&mut app, "italic");

    command(&mut app, "wq");
    assert!(!app.should_quit);
    assert!(app.editor.is_dirty());
    assert!(matches!(app.message, Some(Message::Error(_))));
}

#[test]
fn test_load_asks_for_confirmation() {
    let mut saved = Surface::blank(1, 2, 2);
    *saved.cell_mut(id(0, 0)).unwrap() = Cell::with_text("Saved");
    let mut store = MemoryStore::new();
    store.set(CONTENT_KEY, &saved.to_markup()).unwrap();
    let mut app = app_with(Surface::blank(1, 2, 2), store);

    command(&mut app, "e");
    assert_eq!(app.mode, Mode::Confirm);
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "");

    command(&mut app, "load");
    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.editor.cell_text(id(0, 0)).unwrap(), "Saved");
    assert!(!app.editor.is_dirty());
    assert_eq!(app.editor.history().len(), 2);
}

#[test]
fn test_load_with_nothing_saved() {
    let mut app = app();
    command(&mut app, "e");
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.message, Some(Message::Warning("No saved content".to_string())));
}

#[test]
fn test_theme_commands() {
    let mut app = app();
    command(&mut app, "theme dark");
    assert_eq!(app.style.theme.name, "dark");
    command(&mut app, "theme neon");
    assert!(matches!(app.message, Some(Message::Error(_))));
    assert_eq!(app.style.theme.name, "dark");
}

#[test]
fn test_scrolling_follows_active_cell() {
    let mut app = app_with(Surface::blank(1, 10, 2), MemoryStore::new());
    // title + 10 rows of 3 + gap = 32 lines in a 21-line view
    for _ in 0..10 {
        press(&mut app, KeyCode::Down);
    }
    assert_eq!(app.editor.active(), Some(id(9, 0)));
    assert_eq!(app.scroll, 10);

    for _ in 0..10 {
        press(&mut app, KeyCode::Up);
    }
    assert_eq!(app.scroll, 0);

    for _ in 0..5 {
        mouse(&mut app, MouseEventKind::ScrollDown, 5, 5, KeyModifiers::NONE);
    }
    assert_eq!(app.scroll, 11);
}
