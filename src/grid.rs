use crate::doc::markup::{self, MarkupError, Raw};
use crate::doc::{plain_text, Node, StyleProps};

/// Address of a cell: which table, then row and column within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub grid: usize,
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(grid: usize, row: usize, col: usize) -> Self {
        Self { grid, row, col }
    }
}

/// One editable unit of rich content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: Vec<Node>,
    pub style: StyleProps,
    pub editable: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            style: StyleProps::default(),
            editable: true,
        }
    }
}

impl Cell {
    pub fn with_text(text: &str) -> Self {
        Self {
            content: crate::doc::node::nodes_from_text(text),
            ..Default::default()
        }
    }

    pub fn text(&self) -> String {
        plain_text(&self.content)
    }
}

/// A fixed-shape table of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let row_count = rows.len();
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        Self {
            rows: row_count,
            cols,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.index(row, col).map(move |i| &mut self.cells[i])
    }
}

/// The whole editable surface: every table of the document in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    grids: Vec<Grid>,
}

impl Surface {
    pub fn new(grids: Vec<Grid>) -> Self {
        Self { grids }
    }

    /// `tables` empty tables of `rows` x `cols`
    pub fn blank(tables: usize, rows: usize, cols: usize) -> Self {
        Self {
            grids: (0..tables).map(|_| Grid::new(rows, cols)).collect(),
        }
    }

    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    pub fn grid(&self, idx: usize) -> Option<&Grid> {
        self.grids.get(idx)
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.grids.get(id.grid)?.cell(id.row, id.col)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.grids.get_mut(id.grid)?.cell_mut(id.row, id.col)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    pub fn is_editable(&self, id: CellId) -> bool {
        self.cell(id).map_or(false, |c| c.editable)
    }

    /// Every cell id in document order
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.grids.iter().enumerate().flat_map(|(g, grid)| {
            (0..grid.rows).flat_map(move |r| (0..grid.cols).map(move |c| CellId::new(g, r, c)))
        })
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::from("<surface>");
        for (g, grid) in self.grids.iter().enumerate() {
            out.push_str(&format!("<table data-grid=\"{}\">", g));
            for r in 0..grid.rows {
                out.push_str("<tr>");
                for c in 0..grid.cols {
                    let cell = &grid.cells[r * grid.cols + c];
                    out.push_str("<td");
                    markup::write_style_attr(&mut out, &cell.style);
                    if !cell.editable {
                        out.push_str(" contenteditable=\"false\"");
                    }
                    out.push('>');
                    markup::write_nodes(&mut out, &cell.content);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</table>");
        }
        out.push_str("</surface>");
        out
    }

    /// Rebuild a surface from markup written by `to_markup`, or any markup
    /// with the same table/row/cell structure.
    pub fn from_markup(input: &str) -> Result<Self, MarkupError> {
        let roots = markup::parse_raw(input)?;
        let tables: Vec<Raw> = match significant(roots).into_iter().next() {
            Some(Raw::Element { name, children, .. }) if name == "surface" => significant(children),
            Some(other) => {
                return Err(MarkupError::Unexpected {
                    expected: "surface".to_string(),
                    found: other.name().unwrap_or("#text").to_string(),
                })
            }
            None => return Err(MarkupError::Empty),
        };

        let mut grids = Vec::new();
        for (t, table) in tables.into_iter().enumerate() {
            let rows = expect_children(table, "table")?;
            let mut grid_rows: Vec<Vec<Cell>> = Vec::new();
            for (r, row) in rows.into_iter().enumerate() {
                let cells = expect_children(row, "tr")?;
                let mut parsed = Vec::with_capacity(cells.len());
                for cell in cells {
                    parsed.push(parse_cell(cell)?);
                }
                if let Some(first) = grid_rows.first() {
                    if first.len() != parsed.len() {
                        return Err(MarkupError::Ragged {
                            table: t,
                            row: r,
                            found: parsed.len(),
                            expected: first.len(),
                        });
                    }
                }
                grid_rows.push(parsed);
            }
            grids.push(Grid::from_rows(grid_rows));
        }

        if grids.is_empty() {
            return Err(MarkupError::Empty);
        }
        Ok(Self { grids })
    }
}

/// Drop whitespace-only text between structural elements
fn significant(raw: Vec<Raw>) -> Vec<Raw> {
    raw.into_iter()
        .filter(|r| match r {
            Raw::Text(t) => !t.trim().is_empty(),
            _ => true,
        })
        .collect()
}

fn expect_children(raw: Raw, expected: &str) -> Result<Vec<Raw>, MarkupError> {
    match raw {
        Raw::Element { name, children, .. } if name == expected => Ok(significant(children)),
        other => Err(MarkupError::Unexpected {
            expected: expected.to_string(),
            found: other.name().unwrap_or("#text").to_string(),
        }),
    }
}

fn parse_cell(raw: Raw) -> Result<Cell, MarkupError> {
    let editable = raw.attr("contenteditable") != Some("false");
    let style = raw.attr("style").map(StyleProps::from_css).unwrap_or_default();
    match raw {
        Raw::Element { name, children, .. } if name == "td" || name == "th" => Ok(Cell {
            content: markup::nodes_from_raw(children),
            style,
            editable,
        }),
        other => Err(MarkupError::Unexpected {
            expected: "td".to_string(),
            found: other.name().unwrap_or("#text").to_string(),
        }),
    }
}
