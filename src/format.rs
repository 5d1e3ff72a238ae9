//! Formatting commands and their dispatch over a target set of cells.

pub mod engine;
pub mod toolbar;

use tracing::{debug, warn};

use crate::doc::node::{self, nodes_from_text};
use crate::doc::{plain_text, PropertyKind};
use crate::grid::{CellId, Surface};

pub use engine::{FormatError, RichTextEngine, ToggleKind, TreeEngine};
pub use toolbar::{ToolbarAction, ToolbarState, CONTROLS};

/// One user-initiated formatting operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Toggle(ToggleKind),
    Property(PropertyKind, String),
    /// Background color behind the text, with fallback between engine commands
    Highlight(String),
    ClearFormatting,
}

impl FormatCommand {
    pub fn describe(&self) -> String {
        match self {
            FormatCommand::Toggle(kind) => format!("{:?}", kind),
            FormatCommand::Property(kind, value) => format!("{} {}", kind.display_name(), value),
            FormatCommand::Highlight(color) => format!("highlight {}", color),
            FormatCommand::ClearFormatting => "clear formatting".to_string(),
        }
    }
}

/// Strip every style from the cell and its descendants, keeping only text
pub fn clear_formatting(surface: &mut Surface, id: CellId) {
    let Some(cell) = surface.cell_mut(id) else {
        return;
    };
    cell.style.clear();
    node::for_each_element_mut(&mut cell.content, &mut |e| e.style.clear());
    let text = plain_text(&cell.content);
    cell.content = nodes_from_text(&text);
}

fn highlight(engine: &dyn RichTextEngine, surface: &mut Surface, id: CellId, color: &str) -> Result<(), FormatError> {
    let Some(cell) = surface.cell_mut(id) else {
        return Ok(());
    };
    match engine.apply_property(cell, PropertyKind::HiliteColor, color) {
        Err(FormatError::Unsupported(_)) => {
            debug!(?id, "hilite unsupported, falling back to back color");
            engine.apply_property(cell, PropertyKind::BackColor, color)
        }
        other => other,
    }
}

/// Apply `command` to every target. Returns the number of cells it was
/// applied to; failures on a cell are logged and skipped.
pub fn apply_to_targets(
    engine: &dyn RichTextEngine,
    surface: &mut Surface,
    targets: &[CellId],
    command: &FormatCommand,
) -> usize {
    let mut applied = 0;
    for &id in targets {
        if !surface.is_editable(id) {
            continue;
        }
        let result = match command {
            FormatCommand::ClearFormatting => {
                clear_formatting(surface, id);
                Ok(())
            }
            FormatCommand::Highlight(color) => highlight(engine, surface, id, color),
            FormatCommand::Toggle(kind) => match surface.cell_mut(id) {
                Some(cell) => engine.apply_toggle_style(cell, *kind),
                None => Ok(()),
            },
            FormatCommand::Property(kind, value) => match surface.cell_mut(id) {
                Some(cell) => engine.apply_property(cell, *kind, value),
                None => Ok(()),
            },
        };
        match result {
            Ok(()) => applied += 1,
            Err(e) => warn!(?id, error = %e, "format command skipped"),
        }
    }
    applied
}

#[cfg(test)]
mod test;
