use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::doc::node::{nodes_from_text, sole_element};
use crate::doc::{Element, MarkupError, Node};
use crate::format::{apply_to_targets, FormatCommand, RichTextEngine, ToolbarState, TreeEngine};
use crate::grid::{CellId, Surface};
use crate::history::HistoryLog;
use crate::selection::Selection;
use crate::store::{KeyValueStore, StoreError, CONTENT_KEY};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("saved content is unreadable: {0}")]
    Markup(#[from] MarkupError),
}

/// Owns the surface being edited together with its selection and history.
pub struct CellTableEditor {
    surface: Surface,
    selection: Selection,
    history: HistoryLog,
    engine: Box<dyn RichTextEngine>,
    /// Cells that currently respond to the pointer and keyboard
    bindings: BTreeSet<CellId>,
    /// Markup as of the last save or load
    clean: Option<String>,
    restoring: bool,
}

impl CellTableEditor {
    pub fn new(surface: Surface, history_capacity: usize) -> Self {
        Self::with_engine(surface, history_capacity, Box::new(TreeEngine::new()))
    }

    pub fn with_engine(surface: Surface, history_capacity: usize, engine: Box<dyn RichTextEngine>) -> Self {
        let mut editor = Self {
            surface,
            selection: Selection::new(),
            history: HistoryLog::new(history_capacity),
            engine,
            bindings: BTreeSet::new(),
            clean: None,
            restoring: false,
        };
        editor.rebind();
        editor.record_snapshot();
        editor.mark_clean();
        editor
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn active(&self) -> Option<CellId> {
        self.selection.active()
    }

    pub fn is_bound(&self, id: CellId) -> bool {
        self.bindings.contains(&id)
    }

    pub fn is_dirty(&self) -> bool {
        self.history.current() != self.clean.as_deref()
    }

    fn mark_clean(&mut self) {
        self.clean = self.history.current().map(str::to_string);
    }

    fn rebind(&mut self) {
        self.bindings.clear();
        let editable: Vec<CellId> = self.surface.cell_ids().filter(|&id| self.surface.is_editable(id)).collect();
        self.bindings.extend(editable);
    }

    // === selection ===

    pub fn activate_cell(&mut self, id: CellId) -> bool {
        if !self.is_bound(id) {
            return false;
        }
        self.selection.activate(id, &self.surface)
    }

    /// Pointer pressed over `hit` (`None`: outside every cell and the toolbar)
    pub fn pointer_down(&mut self, hit: Option<CellId>, shift: bool) {
        match hit {
            Some(id) if self.is_bound(id) => {
                if shift {
                    self.selection.begin_range(id, &self.surface);
                } else {
                    self.selection.clear();
                    self.selection.activate(id, &self.surface);
                }
            }
            Some(_) | None => self.clear_selection(),
        }
    }

    pub fn pointer_move(&mut self, hit: Option<CellId>) {
        if let Some(id) = hit {
            self.selection.extend_range(id, &self.surface);
        }
    }

    pub fn pointer_up(&mut self) {
        self.selection.end_range();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn targets(&self) -> Vec<CellId> {
        self.selection.targets()
    }

    /// Step `(dr, dc)` from `from`, crossing into the neighbouring table at the
    /// top and bottom edges. Columns clamp.
    fn step(&self, from: CellId, dr: isize, dc: isize) -> Option<CellId> {
        let grid = self.surface.grid(from.grid)?;
        // tables without rows or columns have nowhere to step to
        let last_col = grid.cols().checked_sub(1)?;
        grid.rows().checked_sub(1)?;
        let col = (from.col as isize + dc).clamp(0, last_col as isize) as usize;
        let row = from.row as isize + dr;
        if row < 0 {
            let prev = from.grid.checked_sub(1)?;
            let g = self.surface.grid(prev)?;
            return Some(CellId::new(prev, g.rows().checked_sub(1)?, col.min(g.cols().checked_sub(1)?)));
        }
        if row as usize >= grid.rows() {
            let next = from.grid + 1;
            let g = self.surface.grid(next)?;
            if g.rows() == 0 {
                return None;
            }
            return Some(CellId::new(next, 0, col.min(g.cols().checked_sub(1)?)));
        }
        Some(CellId::new(from.grid, row as usize, col))
    }

    /// Move the active cell, skipping over locked cells in that direction
    pub fn move_active(&mut self, dr: isize, dc: isize) -> bool {
        let Some(mut at) = self.active() else {
            return match self.bindings.iter().next().copied() {
                Some(first) => self.activate_cell(first),
                None => false,
            };
        };
        self.selection.clear();
        loop {
            match self.step(at, dr, dc) {
                Some(next) if next == at => return false,
                Some(next) if self.is_bound(next) => return self.activate_cell(next),
                Some(next) => at = next,
                None => return false,
            }
        }
    }

    /// Shift+arrow: grow the range from the active cell, staying in its grid
    pub fn extend_with_keyboard(&mut self, dr: isize, dc: isize) -> bool {
        let Some(active) = self.active() else {
            return false;
        };
        if self.selection.anchor().is_none() {
            if !self.selection.begin_range(active, &self.surface) {
                return false;
            }
        } else {
            self.selection.resume_range();
        }
        let from = self.selection.cursor().unwrap_or(active);
        let Some(grid) = self.surface.grid(from.grid) else {
            return false;
        };
        let (Some(last_row), Some(last_col)) = (grid.rows().checked_sub(1), grid.cols().checked_sub(1)) else {
            return false;
        };
        let row = (from.row as isize + dr).clamp(0, last_row as isize) as usize;
        let col = (from.col as isize + dc).clamp(0, last_col as isize) as usize;
        let changed = self.selection.extend_range(CellId::new(from.grid, row, col), &self.surface);
        self.selection.end_range();
        changed
    }

    // === editing ===

    /// Apply `command` to the current targets and record one snapshot.
    /// Returns the number of cells changed; zero when there is no target.
    pub fn apply(&mut self, command: &FormatCommand) -> usize {
        let targets = self.targets();
        if targets.is_empty() {
            debug!(command = %command.describe(), "no target");
            return 0;
        }
        let applied = apply_to_targets(self.engine.as_ref(), &mut self.surface, &targets, command);
        if applied > 0 {
            self.record_snapshot();
        }
        applied
    }

    /// Replace the text of a cell, keeping any inline formatting that wraps
    /// the whole content. Records a snapshot when the content changed.
    pub fn replace_text(&mut self, id: CellId, text: &str) -> bool {
        if !self.is_bound(id) {
            return false;
        }
        let Some(cell) = self.surface.cell_mut(id) else {
            return false;
        };
        let content = rewrap(&cell.content, text);
        if content == cell.content {
            return false;
        }
        cell.content = content;
        self.record_snapshot();
        true
    }

    pub fn cell_text(&self, id: CellId) -> Option<String> {
        self.surface.cell(id).map(|c| c.text())
    }

    /// Toolbar state for the active cell, else the first cell of the range
    pub fn toolbar_state(&self) -> Option<ToolbarState> {
        let id = self.active().or_else(|| self.targets().first().copied())?;
        let cell = self.surface.cell(id)?;
        Some(ToolbarState::for_cell(self.engine.as_ref(), cell))
    }

    // === history ===

    pub fn record_snapshot(&mut self) -> bool {
        if self.restoring {
            return false;
        }
        let recorded = self.history.record(self.surface.to_markup());
        if recorded {
            debug!(cursor = ?self.history.cursor(), len = self.history.len(), "snapshot recorded");
        }
        recorded
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(str::to_string) else {
            debug!("nothing to undo");
            return false;
        };
        self.restore(&snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(str::to_string) else {
            debug!("nothing to redo");
            return false;
        };
        self.restore(&snapshot);
        true
    }

    fn restore(&mut self, markup: &str) {
        self.restoring = true;
        match Surface::from_markup(markup) {
            Ok(surface) => self.surface = surface,
            Err(e) => error!(error = %e, "history snapshot failed to parse"),
        }
        self.selection.retain_valid(&self.surface);
        self.rebind();
        self.restoring = false;
        debug!(cursor = ?self.history.cursor(), "restored");
    }

    // === persistence ===

    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let markup = self.surface.to_markup();
        if let Err(e) = store.set(CONTENT_KEY, &markup) {
            warn!(error = %e, "save failed");
            return Err(e);
        }
        info!(bytes = markup.len(), "saved");
        self.mark_clean();
        Ok(())
    }

    /// Saved markup, if the store has any. Nothing is applied yet.
    pub fn fetch_saved(&self, store: &dyn KeyValueStore) -> Result<Option<String>, StoreError> {
        store.get(CONTENT_KEY).map_err(|e| {
            warn!(error = %e, "load failed");
            e
        })
    }

    /// Replace the whole surface with `markup` and record it.
    /// On error the current surface is left untouched.
    pub fn apply_markup(&mut self, markup: &str) -> Result<(), MarkupError> {
        let surface = Surface::from_markup(markup).map_err(|e| {
            warn!(error = %e, "saved markup rejected");
            e
        })?;
        self.surface = surface;
        self.selection.retain_valid(&self.surface);
        self.rebind();
        self.record_snapshot();
        self.mark_clean();
        info!(grids = self.surface.grid_count(), "loaded");
        Ok(())
    }

    /// Fetch and apply in one step, asking `confirm` first
    pub fn load(&mut self, store: &dyn KeyValueStore, confirm: impl FnOnce() -> bool) -> Result<bool, EditorError> {
        let Some(markup) = self.fetch_saved(store)? else {
            return Ok(false);
        };
        if !confirm() {
            return Ok(false);
        }
        self.apply_markup(&markup)?;
        Ok(true)
    }
}

/// New content for `text`, nested inside the same chain of inline elements
/// that wrapped the whole of `content`.
fn rewrap(content: &[Node], text: &str) -> Vec<Node> {
    if text.is_empty() {
        return Vec::new();
    }
    match sole_element(content) {
        Some(e) if !e.tag.is_block() => vec![Node::Element(Element {
            tag: e.tag,
            style: e.style.clone(),
            children: rewrap(&e.children, text),
        })],
        _ => nodes_from_text(text),
    }
}
