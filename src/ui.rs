use ratatui::{
    layout::{Alignment as TextAlign, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Message};
use crate::doc::{plain_text, Alignment, Node, StyleProps, Tag};
use crate::format::{ToolbarAction, CONTROLS};
use crate::grid::{Cell, CellId, Surface};
use crate::mode::Mode;
use crate::util::{cell_label, char_count, range_label, truncate_to_width};

const MAX_TEXT_LINES: usize = 3;
const MIN_CELL_WIDTH: u16 = 8;

/// Screen regions, top to bottom
pub struct Screen {
    pub toolbar: Rect,
    pub surface: Rect,
    pub status: Rect,
    pub command: Rect,
}

pub fn screen_layout(area: Rect) -> Screen {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    Screen {
        toolbar: chunks[0],
        surface: chunks[1],
        status: chunks[2],
        command: chunks[3],
    }
}

pub fn rect_contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

// === surface layout ===

/// A cell's box in surface coordinates (`y` counts lines from the top of
/// the whole surface, before scrolling)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub id: CellId,
    pub x: u16,
    pub y: u32,
    pub width: u16,
    pub height: u16,
}

pub struct Placement {
    pub cells: Vec<Placed>,
    /// Table index and line of its title
    pub titles: Vec<(usize, u32)>,
    pub height: u32,
}

fn line_count(cell: &Cell) -> usize {
    plain_text(&cell.content).split('\n').count()
}

/// Tables stacked vertically, each headed by a title line. Columns share the
/// width evenly; a row is as tall as its tallest cell, up to a limit.
pub fn place_cells(surface: &Surface, width: u16) -> Placement {
    let mut cells = Vec::new();
    let mut titles = Vec::new();
    let mut y = 0u32;

    for (g, grid) in surface.grids().iter().enumerate() {
        titles.push((g, y));
        y += 1;
        if grid.cols() == 0 {
            continue;
        }
        let cell_width = (width / grid.cols().min(u16::MAX as usize) as u16).max(MIN_CELL_WIDTH);
        for row in 0..grid.rows() {
            let lines = (0..grid.cols())
                .filter_map(|col| grid.cell(row, col))
                .map(line_count)
                .max()
                .unwrap_or(1)
                .clamp(1, MAX_TEXT_LINES);
            let height = lines as u16 + 2;
            for col in 0..grid.cols() {
                cells.push(Placed {
                    id: CellId::new(g, row, col),
                    x: (col as u16).saturating_mul(cell_width),
                    y,
                    width: cell_width,
                    height,
                });
            }
            y += height as u32;
        }
        y += 1;
    }

    Placement { cells, titles, height: y }
}

/// On-screen rect of a placed cell, if it is wholly visible
pub fn visible_rect(placed: &Placed, area: Rect, scroll: u32) -> Option<Rect> {
    let top = placed.y.checked_sub(scroll)?;
    if top + placed.height as u32 > area.height as u32 {
        return None;
    }
    if placed.x as u32 + placed.width as u32 > area.width as u32 {
        return None;
    }
    Some(Rect::new(area.x + placed.x, area.y + top as u16, placed.width, placed.height))
}

/// The cell under screen position `(x, y)`
pub fn cell_at(surface: &Surface, area: Rect, scroll: u32, x: u16, y: u16) -> Option<CellId> {
    place_cells(surface, area.width)
        .cells
        .iter()
        .find(|p| visible_rect(p, area, scroll).map_or(false, |r| rect_contains(r, x, y)))
        .map(|p| p.id)
}

/// Scroll offset that brings `id` into a view `height` lines tall
pub fn scroll_to_show(surface: &Surface, width: u16, height: u16, scroll: u32, id: CellId) -> u32 {
    let placement = place_cells(surface, width);
    let Some(p) = placement.cells.iter().find(|p| p.id == id) else {
        return scroll;
    };
    let bottom = p.y + p.height as u32;
    if p.y < scroll {
        // keep the table title in view for a first row
        if id.row == 0 {
            p.y.saturating_sub(1)
        } else {
            p.y
        }
    } else if bottom > scroll + height as u32 {
        bottom.saturating_sub(height as u32)
    } else {
        scroll
    }
}

// === toolbar layout ===

/// Control index and rect of every toolbar control that fits
pub fn toolbar_layout(area: Rect) -> Vec<(usize, Rect)> {
    let mut out = Vec::new();
    let mut x = area.x;
    let right = area.x.saturating_add(area.width);
    for (i, control) in CONTROLS.iter().enumerate() {
        let width = control.label.len() as u16 + 2;
        if x.saturating_add(width) > right {
            break;
        }
        out.push((i, Rect::new(x, area.y, width, 1)));
        x = x.saturating_add(width + 1);
    }
    out
}

pub fn toolbar_hit(area: Rect, x: u16, y: u16) -> Option<ToolbarAction> {
    toolbar_layout(area)
        .into_iter()
        .find(|(_, r)| rect_contains(*r, x, y))
        .map(|(i, _)| CONTROLS[i].action)
}

// === cell content ===

/// Terminal color for a CSS color value: names, `#rgb`, `#rrggbb`, `rgb(r,g,b)`
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(inner) = value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        let parts: Vec<u8> = inner.split(',').filter_map(|p| p.trim().parse().ok()).collect();
        return match parts.as_slice() {
            [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
            _ => None,
        };
    }
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 3 {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return format!("#{}", expanded).parse().ok();
        }
    }
    value.to_lowercase().parse().ok()
}

fn css_style(props: &StyleProps) -> Style {
    let mut style = Style::default();
    if let Some(fg) = props.color.as_deref().and_then(parse_color) {
        style = style.fg(fg);
    }
    if let Some(bg) = props.background.as_deref().and_then(parse_color) {
        style = style.bg(bg);
    }
    style
}

fn text_align(align: Option<Alignment>) -> TextAlign {
    match align {
        Some(Alignment::Center) => TextAlign::Center,
        Some(Alignment::Right) => TextAlign::Right,
        _ => TextAlign::Left,
    }
}

/// Accumulates styled spans into lines while walking a cell's tree
struct LineBuilder {
    lines: Vec<Vec<Span<'static>>>,
    indent: usize,
    /// No text on the current line yet
    fresh: bool,
    /// A block ended; the next text starts a new line
    pending_break: bool,
}

impl LineBuilder {
    fn new() -> Self {
        Self { lines: vec![Vec::new()], indent: 0, fresh: true, pending_break: false }
    }

    fn newline(&mut self) {
        self.lines.push(Vec::new());
        self.fresh = true;
        self.pending_break = false;
    }

    fn start_block(&mut self) {
        if !self.fresh {
            self.newline();
        }
        self.pending_break = false;
    }

    fn end_block(&mut self) {
        self.pending_break = !self.fresh;
    }

    fn push(&mut self, text: String, style: Style) {
        if self.pending_break {
            self.newline();
        }
        if let Some(line) = self.lines.last_mut() {
            if self.fresh && line.is_empty() && self.indent > 0 {
                line.push(Span::raw("  ".repeat(self.indent)));
            }
            line.push(Span::styled(text, style));
        }
        self.fresh = false;
    }

    fn walk(&mut self, nodes: &[Node], style: Style) {
        for node in nodes {
            match node {
                Node::Text(t) => self.push(t.clone(), style),
                Node::Break => self.newline(),
                Node::Element(e) => {
                    let st = style.patch(tag_style(e.tag)).patch(css_style(&e.style));
                    match e.tag {
                        Tag::UnorderedList | Tag::OrderedList => {
                            let mut n = 0;
                            for child in &e.children {
                                match child {
                                    Node::Element(li) if li.tag == Tag::ListItem => {
                                        n += 1;
                                        self.start_block();
                                        let marker = if e.tag == Tag::UnorderedList {
                                            "• ".to_string()
                                        } else {
                                            format!("{}. ", n)
                                        };
                                        self.push(marker, st);
                                        self.walk(&li.children, st);
                                    }
                                    other => self.walk(std::slice::from_ref(other), st),
                                }
                            }
                            self.end_block();
                        }
                        Tag::Blockquote => {
                            self.start_block();
                            self.indent += 1;
                            self.walk(&e.children, st);
                            self.indent -= 1;
                            self.end_block();
                        }
                        Tag::Paragraph | Tag::ListItem => {
                            self.start_block();
                            self.walk(&e.children, st);
                            self.end_block();
                        }
                        _ => self.walk(&e.children, st),
                    }
                }
            }
        }
    }
}

fn tag_style(tag: Tag) -> Style {
    let style = Style::default();
    match tag {
        Tag::Bold => style.add_modifier(Modifier::BOLD),
        Tag::Italic => style.add_modifier(Modifier::ITALIC),
        Tag::Underline => style.add_modifier(Modifier::UNDERLINED),
        Tag::Strike => style.add_modifier(Modifier::CROSSED_OUT),
        Tag::Superscript | Tag::Subscript => style.add_modifier(Modifier::DIM),
        _ => style,
    }
}

/// Styled terminal lines for a cell's content
pub fn cell_lines(cell: &Cell) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new();
    builder.walk(&cell.content, Style::default());
    builder.lines.into_iter().map(Line::from).collect()
}

/// The insert-mode buffer with its cursor (or whole-text selection) shown reversed
pub fn edit_lines(buffer: &str, cursor: usize, select_all: bool) -> Vec<Line<'static>> {
    let reversed = Style::default().add_modifier(Modifier::REVERSED);
    let text_style = if select_all { reversed } else { Style::default() };
    let mut lines: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut run = String::new();

    fn flush(lines: &mut [Vec<Span<'static>>], run: &mut String, style: Style) {
        if !run.is_empty() {
            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(std::mem::take(run), style));
            }
        }
    }

    for (i, c) in buffer.chars().enumerate() {
        let at_cursor = !select_all && i == cursor;
        if c == '\n' {
            flush(&mut lines, &mut run, text_style);
            if at_cursor {
                if let Some(line) = lines.last_mut() {
                    line.push(Span::styled(" ", reversed));
                }
            }
            lines.push(Vec::new());
        } else if at_cursor {
            flush(&mut lines, &mut run, text_style);
            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(c.to_string(), reversed));
            }
        } else {
            run.push(c);
        }
    }
    flush(&mut lines, &mut run, text_style);
    if !select_all && cursor >= char_count(buffer) {
        if let Some(line) = lines.last_mut() {
            line.push(Span::styled(" ", reversed));
        }
    }
    lines.into_iter().map(Line::from).collect()
}

// === rendering ===

pub fn render(frame: &mut Frame, app: &App) {
    let screen = screen_layout(frame.size());

    if let Some(bg) = app.style.background() {
        frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.size());
    }

    render_toolbar(frame, app, screen.toolbar);
    render_surface(frame, app, screen.surface);
    render_status_bar(frame, app, screen.status);
    render_command_line(frame, app, screen.command);
}

fn render_toolbar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.editor.toolbar_state();
    let layout = toolbar_layout(area);
    for (i, rect) in &layout {
        let control = &CONTROLS[*i];
        let on = state.as_ref().map_or(false, |s| s.is_on(control.action));
        let style = if on { app.style.toolbar_active() } else { app.style.toolbar() };
        frame.render_widget(Paragraph::new(format!(" {} ", control.label)).style(style), *rect);
    }

    // font and size readout in the space left over
    let used = layout.last().map_or(area.x, |(_, r)| r.x + r.width + 1);
    let Some(state) = state else {
        return;
    };
    let readout = format!(
        " font: {}  size: {}",
        state.font_family.as_deref().unwrap_or("-"),
        state.font_size.as_deref().unwrap_or("-")
    );
    let width = area.x.saturating_add(area.width).saturating_sub(used);
    if width > 0 {
        let text = truncate_to_width(&readout, width as usize);
        frame.render_widget(Paragraph::new(text).style(app.style.toolbar()), Rect::new(used, area.y, width, 1));
    }
}

fn render_surface(frame: &mut Frame, app: &App, area: Rect) {
    let surface = app.editor.surface();
    let placement = place_cells(surface, area.width);

    for (g, y) in &placement.titles {
        let Some(top) = y.checked_sub(app.scroll) else {
            continue;
        };
        if top < area.height as u32 {
            let title = Rect::new(area.x, area.y + top as u16, area.width, 1);
            frame.render_widget(Paragraph::new(format!("Table {}", g + 1)).style(app.style.border()), title);
        }
    }

    for placed in &placement.cells {
        if let Some(rect) = visible_rect(placed, area, app.scroll) {
            render_cell(frame, app, placed.id, rect);
        }
    }
}

fn render_cell(frame: &mut Frame, app: &App, id: CellId, rect: Rect) {
    let Some(cell) = app.editor.surface().cell(id) else {
        return;
    };
    let active = app.editor.active() == Some(id);
    let selected = app.editor.selection().is_selected(id);

    let base = if !cell.editable {
        app.style.cell_locked()
    } else if selected {
        app.style.cell_selection()
    } else if active {
        app.style.cell_active()
    } else {
        app.style.cell()
    };
    let border = if active { app.style.border_active() } else { app.style.border() };

    let lines = if active && app.mode == Mode::Insert {
        let handler = &app.insert_handler;
        edit_lines(&handler.buffer, handler.cursor, handler.select_all)
    } else {
        cell_lines(cell)
    };

    let paragraph = Paragraph::new(lines)
        .style(base.patch(css_style(&cell.style)))
        .alignment(text_align(cell.style.text_align))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(paragraph, rect);
}

fn position_label(app: &App) -> String {
    let selection = app.editor.selection();
    match selection.bounds() {
        Some(bounds) if !selection.selected().is_empty() => {
            format!("{} ({} cells)", range_label(bounds), selection.selected().len())
        }
        _ => app.editor.active().map(cell_label).unwrap_or_else(|| "-".to_string()),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.editor.history();
    let position = position_label(app);
    let history_label = format!(
        "hist {}/{} ",
        history.cursor().map_or(0, |c| c + 1),
        history.len()
    );
    let dirty = if app.editor.is_dirty() { "[+] " } else { "" };

    let left = format!(" {} | {}", app.session.display(), position);
    let mode = format!(" {} ", app.mode.display_name());
    let fill = (area.width as usize)
        .saturating_sub(mode.len() + left.chars().count() + dirty.len() + history_label.len());

    let status = Line::from(vec![
        Span::styled(mode, app.style.status_mode(app.mode)),
        Span::raw(left),
        Span::raw(" ".repeat(fill)),
        Span::styled(dirty, app.style.status_dirty()),
        Span::raw(history_label),
    ]);

    frame.render_widget(Paragraph::new(status).style(app.style.status_bar()), area);
}

fn render_command_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode {
        Mode::Command => Line::from(vec![
            Span::styled(":", app.style.command_prompt()),
            Span::styled(app.command_handler.buffer.clone(), app.style.command_line()),
        ]),
        Mode::Confirm => Line::from(Span::styled(
            "Replace the current tables with the saved content? (y/n)",
            app.style.message_warning(),
        )),
        _ => match &app.message {
            Some(Message::Info(m)) => Line::from(Span::styled(m.clone(), app.style.message_info())),
            Some(Message::Warning(m)) => Line::from(Span::styled(m.clone(), app.style.message_warning())),
            Some(Message::Error(m)) => Line::from(Span::styled(m.clone(), app.style.message_error())),
            None => Line::default(),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}
