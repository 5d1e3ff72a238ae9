use std::cmp;
use std::collections::BTreeSet;

use crate::grid::{CellId, Surface};

/// Normalized rectangle of a range selection within one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub grid: usize,
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl Bounds {
    fn between(a: CellId, b: CellId) -> Self {
        Self {
            grid: a.grid,
            min_row: cmp::min(a.row, b.row),
            max_row: cmp::max(a.row, b.row),
            min_col: cmp::min(a.col, b.col),
            max_col: cmp::max(a.col, b.col),
        }
    }

    pub fn contains(&self, id: CellId) -> bool {
        id.grid == self.grid
            && (self.min_row..=self.max_row).contains(&id.row)
            && (self.min_col..=self.max_col).contains(&id.col)
    }
}

/// Which cells subsequent formatting commands apply to.
///
/// The active cell and the range selection are independent: clearing the
/// range leaves the active cell alone.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    active: Option<CellId>,
    anchor: Option<CellId>,
    cursor: Option<CellId>,
    bounds: Option<Bounds>,
    selecting: bool,
    selected: BTreeSet<CellId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<CellId> {
        self.active
    }

    pub fn anchor(&self) -> Option<CellId> {
        self.anchor
    }

    /// The far corner of the range from the anchor
    pub fn cursor(&self) -> Option<CellId> {
        self.cursor
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn selected(&self) -> &BTreeSet<CellId> {
        &self.selected
    }

    pub fn is_selected(&self, id: CellId) -> bool {
        self.selected.contains(&id)
    }

    /// Make `id` the active cell. Returns false if nothing changed.
    pub fn activate(&mut self, id: CellId, surface: &Surface) -> bool {
        if !surface.is_editable(id) || self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Start a range selection with `id` as anchor and sole member
    pub fn begin_range(&mut self, id: CellId, surface: &Surface) -> bool {
        if !surface.is_editable(id) {
            return false;
        }
        self.clear();
        self.anchor = Some(id);
        self.cursor = Some(id);
        self.bounds = Some(Bounds::between(id, id));
        self.selected.insert(id);
        self.selecting = true;
        true
    }

    /// Re-enter selecting mode keeping the current anchor
    pub fn resume_range(&mut self) -> bool {
        if self.anchor.is_some() && !self.selected.is_empty() {
            self.selecting = true;
        }
        self.selecting
    }

    /// Stretch the rectangle from the anchor to `id`. Ignored outside
    /// selecting mode or when `id` lies in another grid.
    pub fn extend_range(&mut self, id: CellId, surface: &Surface) -> bool {
        if !self.selecting {
            return false;
        }
        let Some(anchor) = self.anchor else {
            return false;
        };
        if anchor.grid != id.grid || !surface.contains(id) {
            return false;
        }

        let bounds = Bounds::between(anchor, id);
        self.selected.clear();
        for row in bounds.min_row..=bounds.max_row {
            for col in bounds.min_col..=bounds.max_col {
                let cell = CellId::new(bounds.grid, row, col);
                if surface.is_editable(cell) {
                    self.selected.insert(cell);
                }
            }
        }
        self.cursor = Some(id);
        self.bounds = Some(bounds);
        true
    }

    /// Pointer release: stop selecting, keep what is selected
    pub fn end_range(&mut self) {
        self.selecting = false;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.cursor = None;
        self.bounds = None;
        self.selecting = false;
    }

    /// Cells a command applies to: the range if any, else the active cell
    pub fn targets(&self) -> Vec<CellId> {
        if !self.selected.is_empty() {
            self.selected.iter().copied().collect()
        } else {
            self.active.into_iter().collect()
        }
    }

    /// Drop references that no longer name an editable cell of `surface`.
    /// The range is dropped whole, since its geometry may no longer hold.
    pub fn retain_valid(&mut self, surface: &Surface) {
        if let Some(active) = self.active {
            if !surface.is_editable(active) {
                self.active = None;
            }
        }
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(row: usize, col: usize) -> CellId {
        CellId::new(0, row, col)
    }

    fn drag(sel: &mut Selection, surface: &Surface, from: CellId, to: CellId) {
        assert!(sel.begin_range(from, surface));
        assert!(sel.extend_range(to, surface));
        sel.end_range();
    }

    fn expected(r0: usize, r1: usize, c0: usize, c1: usize) -> Vec<CellId> {
        let mut out = Vec::new();
        for r in r0..=r1 {
            for c in c0..=c1 {
                out.push(id(r, c));
            }
        }
        out
    }

    #[test]
    fn test_activate_is_idempotent() {
        let surface = Surface::blank(1, 3, 3);
        let mut sel = Selection::new();
        assert!(sel.activate(id(1, 1), &surface));
        assert!(!sel.activate(id(1, 1), &surface));
        assert!(sel.activate(id(0, 2), &surface));
        assert_eq!(sel.active(), Some(id(0, 2)));
    }

    #[test]
    fn test_rectangle_in_all_four_directions() {
        let surface = Surface::blank(1, 5, 5);
        let cases = [
            (id(1, 1), id(3, 2)), // down-right
            (id(3, 2), id(1, 1)), // up-left
            (id(1, 2), id(3, 1)), // down-left
            (id(3, 1), id(1, 2)), // up-right
        ];
        for (from, to) in cases {
            let mut sel = Selection::new();
            drag(&mut sel, &surface, from, to);
            assert_eq!(sel.targets(), expected(1, 3, 1, 2), "drag {:?} -> {:?}", from, to);
        }
    }

    #[test]
    fn test_non_editable_cells_excluded_but_geometry_kept() {
        let mut surface = Surface::blank(1, 3, 3);
        surface.cell_mut(id(1, 1)).unwrap().editable = false;

        let mut sel = Selection::new();
        drag(&mut sel, &surface, id(0, 0), id(2, 2));

        assert_eq!(sel.selected().len(), 8);
        assert!(!sel.is_selected(id(1, 1)));
        assert_eq!(
            sel.bounds(),
            Some(Bounds { grid: 0, min_row: 0, max_row: 2, min_col: 0, max_col: 2 })
        );
    }

    #[test]
    fn test_extend_into_other_grid_ignored() {
        let surface = Surface::blank(2, 3, 3);
        let mut sel = Selection::new();
        sel.begin_range(id(0, 0), &surface);
        sel.extend_range(id(1, 1), &surface);
        assert!(!sel.extend_range(CellId::new(1, 2, 2), &surface));
        assert_eq!(sel.targets(), expected(0, 1, 0, 1));
    }

    #[test]
    fn test_extend_requires_selecting_mode() {
        let surface = Surface::blank(1, 3, 3);
        let mut sel = Selection::new();
        assert!(!sel.extend_range(id(1, 1), &surface));

        drag(&mut sel, &surface, id(0, 0), id(0, 1));
        // released: moving the pointer no longer changes the set
        assert!(!sel.extend_range(id(2, 2), &surface));
        assert_eq!(sel.targets(), expected(0, 0, 0, 1));
    }

    #[test]
    fn test_begin_clears_previous_range() {
        let surface = Surface::blank(1, 3, 3);
        let mut sel = Selection::new();
        drag(&mut sel, &surface, id(0, 0), id(2, 2));
        sel.begin_range(id(1, 1), &surface);
        assert_eq!(sel.targets(), vec![id(1, 1)]);
        assert!(sel.is_selecting());
    }

    #[test]
    fn test_target_resolution() {
        let surface = Surface::blank(1, 3, 3);
        let mut sel = Selection::new();
        assert!(sel.targets().is_empty());

        sel.activate(id(2, 2), &surface);
        assert_eq!(sel.targets(), vec![id(2, 2)]);

        drag(&mut sel, &surface, id(0, 0), id(0, 1));
        assert_eq!(sel.targets(), expected(0, 0, 0, 1));

        sel.clear();
        assert_eq!(sel.targets(), vec![id(2, 2)]);
        assert_eq!(sel.active(), Some(id(2, 2)));
    }

    #[test]
    fn test_resume_keeps_anchor() {
        let surface = Surface::blank(1, 4, 4);
        let mut sel = Selection::new();
        drag(&mut sel, &surface, id(1, 1), id(1, 2));
        assert!(sel.resume_range());
        sel.extend_range(id(2, 2), &surface);
        assert_eq!(sel.targets(), expected(1, 2, 1, 2));
    }

    #[test]
    fn test_retain_valid_after_shape_change() {
        let big = Surface::blank(1, 4, 4);
        let small = Surface::blank(1, 2, 2);
        let mut sel = Selection::new();
        sel.activate(id(3, 3), &big);
        drag(&mut sel, &big, id(0, 0), id(1, 1));

        sel.retain_valid(&small);
        assert_eq!(sel.active(), None);
        assert!(sel.targets().is_empty());
    }
}
