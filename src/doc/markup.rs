//! XHTML-like markup for cell content and whole surfaces.
//!
//! The writer is deterministic: attributes and style properties always come
//! out in the same order, so equal trees serialize to equal strings. The
//! reader accepts anything well-formed and maps unknown tags to spans.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::node::{Element, Node, Tag};
use super::props::StyleProps;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("unexpected <{found}>, expected <{expected}>")]
    Unexpected { expected: String, found: String },
    #[error("table {table} is not rectangular (row {row} has {found} cells, expected {expected})")]
    Ragged {
        table: usize,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("surface contains no tables")]
    Empty,
}

/// Generic element tree produced by the reader
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<Raw>,
    },
    Text(String),
}

impl Raw {
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Raw::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Raw::Text(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Raw::Element { name, .. } => Some(name.as_str()),
            Raw::Text(_) => None,
        }
    }
}

struct Frame {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Raw>,
}

fn read_start(e: &BytesStart) -> Result<(String, Vec<(String, String)>), quick_xml::Error> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok((name, attrs))
}

fn xml_err(reader: &Reader<&[u8]>, source: quick_xml::Error) -> MarkupError {
    MarkupError::Xml {
        position: reader.buffer_position(),
        source,
    }
}

/// Parse markup into a list of top-level raw nodes
pub fn parse_raw(input: &str) -> Result<Vec<Raw>, MarkupError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut roots: Vec<Raw> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| xml_err(&reader, e))?;
        let finished: Option<Raw> = match event {
            Event::Start(e) => {
                let (name, attrs) = read_start(&e).map_err(|err| xml_err(&reader, err))?;
                stack.push(Frame { name, attrs, children: Vec::new() });
                None
            }
            Event::Empty(e) => {
                let (name, attrs) = read_start(&e).map_err(|err| xml_err(&reader, err))?;
                Some(Raw::Element { name, attrs, children: Vec::new() })
            }
            Event::End(_) => match stack.pop() {
                Some(frame) => Some(Raw::Element {
                    name: frame.name,
                    attrs: frame.attrs,
                    children: frame.children,
                }),
                None => None,
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| xml_err(&reader, e))?;
                Some(Raw::Text(text.into_owned()))
            }
            Event::CData(c) => Some(Raw::Text(String::from_utf8_lossy(&c.into_inner()).into_owned())),
            Event::Eof => break,
            // comments, declarations, processing instructions
            _ => None,
        };

        if let Some(raw) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(raw),
                None => roots.push(raw),
            }
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(MarkupError::Unclosed(frame.name));
    }
    Ok(roots)
}

/// Convert raw nodes to cell content
pub fn nodes_from_raw(raw: Vec<Raw>) -> Vec<Node> {
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        match item {
            Raw::Text(t) => {
                if let Some(Node::Text(prev)) = out.last_mut() {
                    prev.push_str(&t);
                } else if !t.is_empty() {
                    out.push(Node::Text(t));
                }
            }
            Raw::Element { name, attrs, children } => {
                if name.eq_ignore_ascii_case("br") {
                    out.push(Node::Break);
                    continue;
                }
                let style = attrs
                    .iter()
                    .find(|(k, _)| k == "style")
                    .map(|(_, v)| StyleProps::from_css(v))
                    .unwrap_or_default();
                out.push(Node::Element(Element {
                    tag: Tag::from_name(&name),
                    style,
                    children: nodes_from_raw(children),
                }));
            }
        }
    }
    out
}

/// Parse a cell content fragment
pub fn parse_fragment(input: &str) -> Result<Vec<Node>, MarkupError> {
    Ok(nodes_from_raw(parse_raw(input)?))
}

pub fn write_fragment(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

pub fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&escape(t.as_str())),
            Node::Break => out.push_str("<br/>"),
            Node::Element(e) => {
                out.push('<');
                out.push_str(e.tag.name());
                write_style_attr(out, &e.style);
                out.push('>');
                write_nodes(out, &e.children);
                out.push_str("</");
                out.push_str(e.tag.name());
                out.push('>');
            }
        }
    }
}

pub fn write_style_attr(out: &mut String, style: &StyleProps) {
    if style.is_empty() {
        return;
    }
    out.push_str(" style=\"");
    out.push_str(&escape(style.to_css().as_str()));
    out.push('"');
}
