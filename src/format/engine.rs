use std::collections::HashSet;

use thiserror::Error;

use crate::doc::node::{self, all_text_within, has_text, join_lines, sole_element, sole_element_index, split_lines, unwrap_tag};
use crate::doc::{Element, Node, PropertyKind, StyleProps, Tag};
use crate::grid::Cell;

/// Toggle-style formatting applied to a cell's whole content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToggleKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    UnorderedList,
    OrderedList,
    Indent,
    Outdent,
}

impl ToggleKind {
    pub const ALL: [ToggleKind; 10] = [
        ToggleKind::Bold,
        ToggleKind::Italic,
        ToggleKind::Underline,
        ToggleKind::Strikethrough,
        ToggleKind::Superscript,
        ToggleKind::Subscript,
        ToggleKind::UnorderedList,
        ToggleKind::OrderedList,
        ToggleKind::Indent,
        ToggleKind::Outdent,
    ];

    /// Inline tag the toggle wraps content in, if it is an inline style
    fn inline_tag(&self) -> Option<Tag> {
        match self {
            ToggleKind::Bold => Some(Tag::Bold),
            ToggleKind::Italic => Some(Tag::Italic),
            ToggleKind::Underline => Some(Tag::Underline),
            ToggleKind::Strikethrough => Some(Tag::Strike),
            ToggleKind::Superscript => Some(Tag::Superscript),
            ToggleKind::Subscript => Some(Tag::Subscript),
            _ => None,
        }
    }

    fn list_tag(&self) -> Option<Tag> {
        match self {
            ToggleKind::UnorderedList => Some(Tag::UnorderedList),
            ToggleKind::OrderedList => Some(Tag::OrderedList),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),
    #[error("state of {0:?} cannot be queried")]
    UnsupportedQuery(ToggleKind),
    #[error("invalid value {value:?} for {kind}")]
    InvalidValue { kind: &'static str, value: String },
}

/// Formatting capability over a cell's content.
///
/// Every call treats the whole cell content as the selected range.
pub trait RichTextEngine {
    fn apply_toggle_style(&self, cell: &mut Cell, kind: ToggleKind) -> Result<(), FormatError>;

    fn apply_property(&self, cell: &mut Cell, kind: PropertyKind, value: &str) -> Result<(), FormatError>;

    fn query_toggle_state(&self, cell: &Cell, kind: ToggleKind) -> Result<bool, FormatError>;
}

/// Engine that edits the styled-text tree directly
#[derive(Debug, Default, Clone)]
pub struct TreeEngine {
    unsupported: HashSet<PropertyKind>,
}

impl TreeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that rejects `kind`, like a runtime lacking that command
    pub fn without(mut self, kind: PropertyKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    fn wrap_inline(content: Vec<Node>, tag: Tag) -> Vec<Node> {
        vec![Node::element(tag, unwrap_tag(content, tag))]
    }

    fn toggle_inline(cell: &mut Cell, tag: Tag, on: bool) {
        let content = std::mem::take(&mut cell.content);
        cell.content = if on {
            unwrap_tag(content, tag)
        } else {
            // superscript and subscript exclude each other
            let content = match tag {
                Tag::Superscript => unwrap_tag(content, Tag::Subscript),
                Tag::Subscript => unwrap_tag(content, Tag::Superscript),
                _ => content,
            };
            Self::wrap_inline(content, tag)
        };
    }

    fn toggle_list(cell: &mut Cell, tag: Tag, on: bool) {
        let content = std::mem::take(&mut cell.content);
        let existing = sole_element(&content)
            .filter(|e| matches!(e.tag, Tag::UnorderedList | Tag::OrderedList))
            .map(list_lines);
        let lines = match existing {
            Some(lines) => lines,
            None => split_lines(content),
        };

        cell.content = if on {
            join_lines(lines)
        } else {
            let items = lines
                .into_iter()
                .map(|line| Node::element(Tag::ListItem, line))
                .collect();
            vec![Node::element(tag, items)]
        };
    }

    fn indent(cell: &mut Cell) {
        let content = std::mem::take(&mut cell.content);
        cell.content = vec![Node::element(Tag::Blockquote, content)];
    }

    fn outdent(cell: &mut Cell) {
        let Some(idx) = sole_element_index(&cell.content) else {
            return;
        };
        let is_quote = matches!(&cell.content[idx], Node::Element(e) if e.tag == Tag::Blockquote);
        if !is_quote {
            return;
        }
        if let Node::Element(e) = cell.content.remove(idx) {
            cell.content = e.children;
        }
    }

    fn highlight(cell: &mut Cell, color: &str) {
        if let Some(idx) = sole_element_index(&cell.content) {
            if let Node::Element(e) = &mut cell.content[idx] {
                if e.tag == Tag::Span {
                    e.style.set(PropertyKind::BackColor, color);
                    return;
                }
            }
        }
        let content = std::mem::take(&mut cell.content);
        let mut span = Element::new(Tag::Span, content);
        span.style.set(PropertyKind::BackColor, color);
        cell.content = vec![Node::Element(span)];
    }
}

fn list_lines(list: &Element) -> Vec<Vec<Node>> {
    list.children
        .iter()
        .filter_map(|n| match n {
            Node::Element(li) if li.tag == Tag::ListItem => Some(li.children.clone()),
            _ => None,
        })
        .filter(|line| has_text(line))
        .collect()
}

impl RichTextEngine for TreeEngine {
    fn apply_toggle_style(&self, cell: &mut Cell, kind: ToggleKind) -> Result<(), FormatError> {
        if !has_text(&cell.content) {
            return Ok(());
        }
        if let Some(tag) = kind.inline_tag() {
            let on = self.query_toggle_state(cell, kind)?;
            Self::toggle_inline(cell, tag, on);
        } else if let Some(tag) = kind.list_tag() {
            let on = self.query_toggle_state(cell, kind)?;
            Self::toggle_list(cell, tag, on);
        } else if kind == ToggleKind::Indent {
            Self::indent(cell);
        } else {
            Self::outdent(cell);
        }
        Ok(())
    }

    fn apply_property(&self, cell: &mut Cell, kind: PropertyKind, value: &str) -> Result<(), FormatError> {
        if self.unsupported.contains(&kind) {
            return Err(FormatError::Unsupported(kind.display_name()));
        }
        match kind {
            PropertyKind::HiliteColor | PropertyKind::BackColor => {
                if !StyleProps::default().set(kind, value) {
                    return Err(FormatError::InvalidValue {
                        kind: kind.display_name(),
                        value: value.to_string(),
                    });
                }
                if has_text(&cell.content) {
                    Self::highlight(cell, value);
                }
            }
            _ => {
                if !cell.style.set(kind, value) {
                    return Err(FormatError::InvalidValue {
                        kind: kind.display_name(),
                        value: value.to_string(),
                    });
                }
                // nested spans must not keep a stale font
                if matches!(kind, PropertyKind::FontFamily | PropertyKind::FontSize) {
                    node::for_each_element_mut(&mut cell.content, &mut |e| {
                        e.style.set(kind, value);
                    });
                }
            }
        }
        Ok(())
    }

    fn query_toggle_state(&self, cell: &Cell, kind: ToggleKind) -> Result<bool, FormatError> {
        if let Some(tag) = kind.inline_tag() {
            return Ok(all_text_within(&cell.content, &|e| e.tag == tag));
        }
        if let Some(tag) = kind.list_tag() {
            return Ok(sole_element(&cell.content).map_or(false, |e| e.tag == tag));
        }
        Err(FormatError::UnsupportedQuery(kind))
    }
}
