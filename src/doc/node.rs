use super::props::StyleProps;

/// Element kinds allowed inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Bold,
    Italic,
    Underline,
    Strike,
    Superscript,
    Subscript,
    Span,
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    Blockquote,
}

impl Tag {
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Underline => "u",
            Tag::Strike => "s",
            Tag::Superscript => "sup",
            Tag::Subscript => "sub",
            Tag::Span => "span",
            Tag::Paragraph => "p",
            Tag::UnorderedList => "ul",
            Tag::OrderedList => "ol",
            Tag::ListItem => "li",
            Tag::Blockquote => "blockquote",
        }
    }

    /// Map a markup tag name. Unknown names degrade to a plain span.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "b" | "strong" => Tag::Bold,
            "i" | "em" => Tag::Italic,
            "u" => Tag::Underline,
            "s" | "strike" | "del" => Tag::Strike,
            "sup" => Tag::Superscript,
            "sub" => Tag::Subscript,
            "p" | "div" => Tag::Paragraph,
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "blockquote" => Tag::Blockquote,
            _ => Tag::Span,
        }
    }

    /// Block tags start a new line when rendered as text
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::Paragraph | Tag::UnorderedList | Tag::OrderedList | Tag::ListItem | Tag::Blockquote
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub style: StyleProps,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: Tag, children: Vec<Node>) -> Self {
        Self { tag, style: StyleProps::default(), children }
    }
}

/// One node of a cell's styled-text tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Break,
    Element(Element),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn element(tag: Tag, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag, children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Node::Text(t) => t.trim().is_empty(),
            _ => false,
        }
    }
}

/// Rendered text of a node list: breaks and block boundaries become newlines.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_plain(nodes, &mut out);
    out
}

fn write_plain(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Break => out.push('\n'),
            Node::Element(e) => {
                if e.tag.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                write_plain(&e.children, out);
            }
        }
    }
}

/// Inverse of `plain_text` for unformatted content: lines joined by breaks
pub fn nodes_from_text(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::Break);
        }
        if !line.is_empty() {
            nodes.push(Node::Text(line.to_string()));
        }
    }
    nodes
}

pub fn has_text(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| match n {
        Node::Text(t) => !t.trim().is_empty(),
        Node::Break => false,
        Node::Element(e) => has_text(&e.children),
    })
}

/// Visit every element below `nodes`, depth first
pub fn for_each_element_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Element)) {
    for node in nodes.iter_mut() {
        if let Node::Element(e) = node {
            f(e);
            for_each_element_mut(&mut e.children, f);
        }
    }
}

pub fn for_each_element(nodes: &[Node], f: &mut dyn FnMut(&Element)) {
    for node in nodes {
        if let Node::Element(e) = node {
            f(e);
            for_each_element(&e.children, f);
        }
    }
}

/// True if every non-blank text run sits under an element matching `pred`
pub fn all_text_within(nodes: &[Node], pred: &dyn Fn(&Element) -> bool) -> bool {
    fn walk(nodes: &[Node], inside: bool, pred: &dyn Fn(&Element) -> bool, seen: &mut bool) -> bool {
        for node in nodes {
            match node {
                Node::Text(t) if !t.trim().is_empty() => {
                    *seen = true;
                    if !inside {
                        return false;
                    }
                }
                Node::Element(e) => {
                    if !walk(&e.children, inside || pred(e), pred, seen) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }
    let mut seen = false;
    walk(nodes, false, pred, &mut seen) && seen
}

/// Replace every element with `tag` by its children
pub fn unwrap_tag(nodes: Vec<Node>, tag: Tag) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(mut e) => {
                let children = unwrap_tag(std::mem::take(&mut e.children), tag);
                if e.tag == tag {
                    out.extend(children);
                } else {
                    e.children = children;
                    out.push(Node::Element(e));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// The single top-level element of `nodes`, ignoring whitespace-only text
pub fn sole_element(nodes: &[Node]) -> Option<&Element> {
    let mut found = None;
    for node in nodes {
        if node.is_blank() {
            continue;
        }
        match node {
            Node::Element(e) if found.is_none() => found = Some(e),
            _ => return None,
        }
    }
    found
}

pub fn sole_element_index(nodes: &[Node]) -> Option<usize> {
    let mut found = None;
    for (i, node) in nodes.iter().enumerate() {
        if node.is_blank() {
            continue;
        }
        match node {
            Node::Element(_) if found.is_none() => found = Some(i),
            _ => return None,
        }
    }
    found
}

/// Split content into lines at breaks and block boundaries, keeping inline
/// formatting of each line.
pub fn split_lines(nodes: Vec<Node>) -> Vec<Vec<Node>> {
    let mut lines: Vec<Vec<Node>> = vec![Vec::new()];
    for node in nodes {
        match node {
            Node::Break => lines.push(Vec::new()),
            Node::Element(e) if e.tag.is_block() => {
                if lines.last().map_or(false, |l| !l.is_empty()) {
                    lines.push(Vec::new());
                }
                let inner = split_lines(e.children);
                let count = inner.len();
                for (i, line) in inner.into_iter().enumerate() {
                    if let Some(last) = lines.last_mut() {
                        last.extend(line);
                    }
                    if i + 1 < count {
                        lines.push(Vec::new());
                    }
                }
                lines.push(Vec::new());
            }
            other => {
                if let Some(last) = lines.last_mut() {
                    last.push(other);
                }
            }
        }
    }
    lines.retain(|l| has_text(l));
    lines
}

/// Join lines back together with breaks
pub fn join_lines(lines: Vec<Vec<Node>>) -> Vec<Node> {
    let mut out = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            out.push(Node::Break);
        }
        out.extend(line);
    }
    out
}
