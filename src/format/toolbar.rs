use std::collections::BTreeMap;

use crate::doc::node::for_each_element;
use crate::doc::{Alignment, PropertyKind};
use crate::grid::Cell;

use super::engine::{RichTextEngine, ToggleKind};
use super::FormatCommand;

/// What a toolbar control does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Toggle(ToggleKind),
    Align(Alignment),
    Clear,
    Undo,
    Redo,
}

impl ToolbarAction {
    /// The formatting command behind the control; history controls have none
    pub fn command(&self) -> Option<FormatCommand> {
        match self {
            ToolbarAction::Toggle(kind) => Some(FormatCommand::Toggle(*kind)),
            ToolbarAction::Align(a) => Some(FormatCommand::Property(PropertyKind::Alignment, a.as_str().to_string())),
            ToolbarAction::Clear => Some(FormatCommand::ClearFormatting),
            ToolbarAction::Undo | ToolbarAction::Redo => None,
        }
    }
}

pub struct ToolbarControl {
    pub label: &'static str,
    pub action: ToolbarAction,
}

const fn control(label: &'static str, action: ToolbarAction) -> ToolbarControl {
    ToolbarControl { label, action }
}

pub const CONTROLS: [ToolbarControl; 17] = [
    control("B", ToolbarAction::Toggle(ToggleKind::Bold)),
    control("I", ToolbarAction::Toggle(ToggleKind::Italic)),
    control("U", ToolbarAction::Toggle(ToggleKind::Underline)),
    control("S", ToolbarAction::Toggle(ToggleKind::Strikethrough)),
    control("sup", ToolbarAction::Toggle(ToggleKind::Superscript)),
    control("sub", ToolbarAction::Toggle(ToggleKind::Subscript)),
    control("ul", ToolbarAction::Toggle(ToggleKind::UnorderedList)),
    control("ol", ToolbarAction::Toggle(ToggleKind::OrderedList)),
    control(">>", ToolbarAction::Toggle(ToggleKind::Indent)),
    control("<<", ToolbarAction::Toggle(ToggleKind::Outdent)),
    control("L", ToolbarAction::Align(Alignment::Left)),
    control("C", ToolbarAction::Align(Alignment::Center)),
    control("R", ToolbarAction::Align(Alignment::Right)),
    control("J", ToolbarAction::Align(Alignment::Justify)),
    control("clear", ToolbarAction::Clear),
    control("undo", ToolbarAction::Undo),
    control("redo", ToolbarAction::Redo),
];

/// Active state of the toolbar controls for the current target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarState {
    pub toggles: BTreeMap<ToggleKind, bool>,
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub alignment: Option<Alignment>,
}

impl ToolbarState {
    /// Reflect `cell`. Toggle queries the engine cannot answer read as off.
    pub fn for_cell(engine: &dyn RichTextEngine, cell: &Cell) -> Self {
        let toggles = ToggleKind::ALL
            .iter()
            .map(|&kind| (kind, engine.query_toggle_state(cell, kind).unwrap_or(false)))
            .collect();
        Self {
            toggles,
            font_family: computed(cell, PropertyKind::FontFamily),
            font_size: computed(cell, PropertyKind::FontSize),
            alignment: cell.style.text_align,
        }
    }

    pub fn is_active(&self, kind: ToggleKind) -> bool {
        self.toggles.get(&kind).copied().unwrap_or(false)
    }

    pub fn is_on(&self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::Toggle(kind) => self.is_active(kind),
            ToolbarAction::Align(a) => self.alignment == Some(a),
            _ => false,
        }
    }
}

/// The cell's own value, else the first descendant that sets it
fn computed(cell: &Cell, kind: PropertyKind) -> Option<String> {
    if let Some(v) = cell.style.get(kind) {
        return Some(v);
    }
    let mut found = None;
    for_each_element(&cell.content, &mut |e| {
        if found.is_none() {
            found = e.style.get(kind);
        }
    });
    found
}
