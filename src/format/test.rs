use super::*;
use crate::doc::markup::parse_fragment;
use crate::doc::node::for_each_element;
use crate::doc::{Node, Tag};
use crate::grid::{Cell, CellId, Surface};

fn id(row: usize, col: usize) -> CellId {
    CellId::new(0, row, col)
}

fn surface_with(cells: &[(CellId, &str)]) -> Surface {
    let mut surface = Surface::blank(1, 3, 3);
    for (cell_id, markup) in cells {
        surface.cell_mut(*cell_id).unwrap().content = parse_fragment(markup).unwrap();
    }
    surface
}

fn content(surface: &Surface, cell_id: CellId) -> String {
    crate::doc::markup::write_fragment(&surface.cell(cell_id).unwrap().content)
}

fn toggle(surface: &mut Surface, targets: &[CellId], kind: ToggleKind) -> usize {
    apply_to_targets(&TreeEngine::new(), surface, targets, &FormatCommand::Toggle(kind))
}

// === toggles ===

#[test]
fn test_bold_toggles_on_then_off() {
    let mut surface = surface_with(&[(id(0, 0), "net <i>pay</i>")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Bold);
    assert_eq!(content(&surface, id(0, 0)), "<b>net <i>pay</i></b>");

    toggle(&mut surface, &[id(0, 0)], ToggleKind::Bold);
    assert_eq!(content(&surface, id(0, 0)), "net <i>pay</i>");
}

#[test]
fn test_partially_bold_becomes_fully_bold() {
    let mut surface = surface_with(&[(id(0, 0), "<b>a</b>b")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Bold);
    assert_eq!(content(&surface, id(0, 0)), "<b>ab</b>");
}

#[test]
fn test_toggle_on_mixed_targets_is_per_cell() {
    let mut surface = surface_with(&[(id(0, 0), "<u>x</u>"), (id(0, 1), "y")]);
    let applied = toggle(&mut surface, &[id(0, 0), id(0, 1)], ToggleKind::Underline);
    assert_eq!(applied, 2);
    assert_eq!(content(&surface, id(0, 0)), "x");
    assert_eq!(content(&surface, id(0, 1)), "<u>y</u>");
}

#[test]
fn test_superscript_replaces_subscript() {
    let mut surface = surface_with(&[(id(0, 0), "<sub>2</sub>")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Superscript);
    assert_eq!(content(&surface, id(0, 0)), "<sup>2</sup>");
}

#[test]
fn test_toggle_on_empty_cell_is_noop() {
    let mut surface = Surface::blank(1, 1, 1);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Italic);
    assert!(surface.cell(id(0, 0)).unwrap().content.is_empty());
}

#[test]
fn test_list_toggle() {
    let mut surface = surface_with(&[(id(0, 0), "one<br/>two")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::UnorderedList);
    assert_eq!(content(&surface, id(0, 0)), "<ul><li>one</li><li>two</li></ul>");

    // switching list kind keeps the items
    toggle(&mut surface, &[id(0, 0)], ToggleKind::OrderedList);
    assert_eq!(content(&surface, id(0, 0)), "<ol><li>one</li><li>two</li></ol>");

    toggle(&mut surface, &[id(0, 0)], ToggleKind::OrderedList);
    assert_eq!(content(&surface, id(0, 0)), "one<br/>two");
}

#[test]
fn test_indent_outdent() {
    let mut surface = surface_with(&[(id(0, 0), "clause")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Indent);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Indent);
    assert_eq!(content(&surface, id(0, 0)), "<blockquote><blockquote>clause</blockquote></blockquote>");

    toggle(&mut surface, &[id(0, 0)], ToggleKind::Outdent);
    assert_eq!(content(&surface, id(0, 0)), "<blockquote>clause</blockquote>");
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Outdent);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Outdent);
    assert_eq!(content(&surface, id(0, 0)), "clause");
}

// === properties ===

#[test]
fn test_font_family_reaches_every_descendant() {
    let mut surface = surface_with(&[(
        id(0, 0),
        "<span style=\"font-family:Arial;\">a<b style=\"font-family:Courier;\">b</b></span><i>c</i>",
    )]);
    let cmd = FormatCommand::Property(PropertyKind::FontFamily, "SimSun".to_string());
    apply_to_targets(&TreeEngine::new(), &mut surface, &[id(0, 0)], &cmd);

    let cell = surface.cell(id(0, 0)).unwrap();
    assert_eq!(cell.style.font_family.as_deref(), Some("SimSun"));
    let mut seen = 0;
    for_each_element(&cell.content, &mut |e| {
        seen += 1;
        assert_eq!(e.style.font_family.as_deref(), Some("SimSun"));
    });
    assert_eq!(seen, 3);
}

#[test]
fn test_alignment_stays_on_cell() {
    let mut surface = surface_with(&[(id(0, 0), "<span>a</span>")]);
    let cmd = FormatCommand::Property(PropertyKind::Alignment, "center".to_string());
    apply_to_targets(&TreeEngine::new(), &mut surface, &[id(0, 0)], &cmd);

    assert_eq!(content(&surface, id(0, 0)), "<span>a</span>");
    assert_eq!(surface.cell(id(0, 0)).unwrap().style.to_css(), "text-align:center;");
}

#[test]
fn test_invalid_property_value_skips_cell() {
    let mut surface = surface_with(&[(id(0, 0), "a")]);
    let cmd = FormatCommand::Property(PropertyKind::Alignment, "diagonal".to_string());
    let applied = apply_to_targets(&TreeEngine::new(), &mut surface, &[id(0, 0)], &cmd);
    assert_eq!(applied, 0);
    assert!(surface.cell(id(0, 0)).unwrap().style.is_empty());
}

#[test]
fn test_highlight_falls_back_silently() {
    let mut primary = surface_with(&[(id(0, 0), "due")]);
    let mut fallback = primary.clone();
    let cmd = FormatCommand::Highlight("yellow".to_string());

    let n = apply_to_targets(&TreeEngine::new(), &mut primary, &[id(0, 0)], &cmd);
    assert_eq!(n, 1);

    let engine = TreeEngine::new().without(PropertyKind::HiliteColor);
    let n = apply_to_targets(&engine, &mut fallback, &[id(0, 0)], &cmd);
    assert_eq!(n, 1);

    assert_eq!(primary, fallback);
    assert_eq!(content(&fallback, id(0, 0)), "<span style=\"background-color:yellow;\">due</span>");
}

#[test]
fn test_highlight_with_no_engine_support_is_skipped() {
    let mut surface = surface_with(&[(id(0, 0), "due")]);
    let engine = TreeEngine::new()
        .without(PropertyKind::HiliteColor)
        .without(PropertyKind::BackColor);
    let n = apply_to_targets(&engine, &mut surface, &[id(0, 0)], &FormatCommand::Highlight("red".to_string()));
    assert_eq!(n, 0);
    assert_eq!(content(&surface, id(0, 0)), "due");
}

// === clear formatting ===

#[test]
fn test_clear_formatting_three_cells() {
    let mut surface = surface_with(&[
        (id(0, 0), "<b style=\"color:red;\">Base</b> pay"),
        (id(0, 1), "<ul><li>one</li><li><i>two</i></li></ul>"),
        (id(0, 2), "<span style=\"font-size:20px;\">x</span><br/>y"),
    ]);
    let engine = TreeEngine::new();
    let targets = [id(0, 0), id(0, 1), id(0, 2)];
    for (i, &cell_id) in targets.iter().enumerate() {
        let cell = surface.cell_mut(cell_id).unwrap();
        cell.style.set(PropertyKind::FontFamily, ["Arial", "Serif", "Mono"][i]);
        cell.style.set(PropertyKind::FontSize, ["10px", "12px", "14px"][i]);
        cell.style.set(PropertyKind::Color, ["red", "blue", "green"][i]);
        cell.style.set(PropertyKind::Alignment, ["left", "center", "right"][i]);
    }
    let before: Vec<String> = targets.iter().map(|&c| surface.cell(c).unwrap().text()).collect();

    let n = apply_to_targets(&engine, &mut surface, &targets, &FormatCommand::ClearFormatting);
    assert_eq!(n, 3);

    for (i, &cell_id) in targets.iter().enumerate() {
        let cell = surface.cell(cell_id).unwrap();
        assert!(cell.style.is_empty());
        assert!(cell.content.iter().all(|n| !matches!(n, Node::Element(_))));
        assert_eq!(cell.text(), before[i]);
    }
    assert_eq!(content(&surface, id(0, 1)), "one<br/>two");
}

// === dispatch ===

#[test]
fn test_no_targets_is_noop() {
    let mut surface = surface_with(&[(id(0, 0), "a")]);
    let before = surface.clone();
    let n = toggle(&mut surface, &[], ToggleKind::Bold);
    assert_eq!(n, 0);
    assert_eq!(surface, before);
}

#[test]
fn test_locked_cells_skipped() {
    let mut surface = surface_with(&[(id(0, 0), "a")]);
    surface.cell_mut(id(0, 0)).unwrap().editable = false;
    assert_eq!(toggle(&mut surface, &[id(0, 0)], ToggleKind::Bold), 0);
    assert_eq!(content(&surface, id(0, 0)), "a");
}

// === toolbar ===

#[test]
fn test_toolbar_reflects_cell() {
    let mut cell = Cell::default();
    cell.content = parse_fragment("<b><span style=\"font-size:18px;\">x</span></b>").unwrap();
    cell.style.set(PropertyKind::Alignment, "right");

    let state = ToolbarState::for_cell(&TreeEngine::new(), &cell);
    assert!(state.is_active(ToggleKind::Bold));
    assert!(!state.is_active(ToggleKind::Italic));
    // indent cannot be queried and reads as inactive
    assert!(!state.is_active(ToggleKind::Indent));
    assert_eq!(state.font_size.as_deref(), Some("18px"));
    assert_eq!(state.font_family, None);
    assert_eq!(state.alignment, Some(crate::doc::Alignment::Right));

    assert!(state.is_on(ToolbarAction::Align(crate::doc::Alignment::Right)));
    assert!(!state.is_on(ToolbarAction::Align(crate::doc::Alignment::Left)));
    assert!(!state.is_on(ToolbarAction::Undo));
}

#[test]
fn test_every_format_control_maps_to_a_command() {
    for control in CONTROLS.iter() {
        let history = matches!(control.action, ToolbarAction::Undo | ToolbarAction::Redo);
        assert_eq!(control.action.command().is_none(), history, "{}", control.label);
    }
}

#[test]
fn test_wrap_keeps_tag_single() {
    let mut surface = surface_with(&[(id(0, 0), "<i>a</i>b")]);
    toggle(&mut surface, &[id(0, 0)], ToggleKind::Italic);
    let cell = surface.cell(id(0, 0)).unwrap();
    let mut italics = 0;
    for_each_element(&cell.content, &mut |e| {
        if e.tag == Tag::Italic {
            italics += 1;
        }
    });
    assert_eq!(italics, 1);
}
