use std::fmt;

/// Horizontal alignment of a cell's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Some(Alignment::Left),
            "center" | "centre" | "c" => Some(Alignment::Center),
            "right" | "r" => Some(Alignment::Right),
            "justify" | "j" => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A style property that can be set on a cell or an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    FontFamily,
    FontSize,
    LineHeight,
    ParagraphSpacing,
    Alignment,
    Color,
    /// Inline highlight behind the selected text
    HiliteColor,
    /// Background behind the selected block
    BackColor,
}

impl PropertyKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            PropertyKind::FontFamily => "font",
            PropertyKind::FontSize => "size",
            PropertyKind::LineHeight => "line height",
            PropertyKind::ParagraphSpacing => "spacing",
            PropertyKind::Alignment => "align",
            PropertyKind::Color => "color",
            PropertyKind::HiliteColor => "highlight",
            PropertyKind::BackColor => "background",
        }
    }
}

/// Characters that delimit declarations or the attribute holding them
const CSS_RESERVED: [char; 8] = [';', ':', '"', '\'', '<', '>', '{', '}'];

/// Inline style properties of a cell or element.
///
/// Serialized as a CSS declaration list in a fixed property order, so two
/// equal values always produce the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleProps {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub line_height: Option<String>,
    pub paragraph_spacing: Option<String>,
    pub text_align: Option<Alignment>,
    pub color: Option<String>,
    pub background: Option<String>,
}

impl StyleProps {
    pub fn is_empty(&self) -> bool {
        *self == StyleProps::default()
    }

    pub fn clear(&mut self) {
        *self = StyleProps::default();
    }

    /// Set a property from its textual value. Returns false if the value
    /// is not valid for the property: an unknown alignment, or text that
    /// would not survive a round trip through `to_css`.
    pub fn set(&mut self, kind: PropertyKind, value: &str) -> bool {
        let value = value.trim();
        if value.chars().any(|c| CSS_RESERVED.contains(&c) || c.is_control()) {
            return false;
        }
        let owned = if value.is_empty() { None } else { Some(value.to_string()) };
        match kind {
            PropertyKind::FontFamily => self.font_family = owned,
            PropertyKind::FontSize => self.font_size = owned,
            PropertyKind::LineHeight => self.line_height = owned,
            PropertyKind::ParagraphSpacing => self.paragraph_spacing = owned,
            PropertyKind::Color => self.color = owned,
            PropertyKind::HiliteColor | PropertyKind::BackColor => self.background = owned,
            PropertyKind::Alignment => {
                if value.is_empty() {
                    self.text_align = None;
                } else {
                    match Alignment::parse(value) {
                        Some(align) => self.text_align = Some(align),
                        None => return false,
                    }
                }
            }
        }
        true
    }

    pub fn get(&self, kind: PropertyKind) -> Option<String> {
        match kind {
            PropertyKind::FontFamily => self.font_family.clone(),
            PropertyKind::FontSize => self.font_size.clone(),
            PropertyKind::LineHeight => self.line_height.clone(),
            PropertyKind::ParagraphSpacing => self.paragraph_spacing.clone(),
            PropertyKind::Alignment => self.text_align.map(|a| a.as_str().to_string()),
            PropertyKind::Color => self.color.clone(),
            PropertyKind::HiliteColor | PropertyKind::BackColor => self.background.clone(),
        }
    }

    /// Render as `name:value;` pairs
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        let mut push = |name: &str, value: &str| {
            out.push_str(name);
            out.push(':');
            out.push_str(value);
            out.push(';');
        };
        if let Some(v) = &self.font_family {
            push("font-family", v);
        }
        if let Some(v) = &self.font_size {
            push("font-size", v);
        }
        if let Some(v) = &self.line_height {
            push("line-height", v);
        }
        if let Some(v) = &self.paragraph_spacing {
            push("margin-bottom", v);
        }
        if let Some(v) = &self.text_align {
            push("text-align", v.as_str());
        }
        if let Some(v) = &self.color {
            push("color", v);
        }
        if let Some(v) = &self.background {
            push("background-color", v);
        }
        out
    }

    /// Parse a CSS declaration list. Unknown properties are dropped.
    pub fn from_css(css: &str) -> Self {
        let mut props = StyleProps::default();
        for decl in css.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let kind = match name.trim().to_lowercase().as_str() {
                "font-family" => PropertyKind::FontFamily,
                "font-size" => PropertyKind::FontSize,
                "line-height" => PropertyKind::LineHeight,
                "margin-bottom" => PropertyKind::ParagraphSpacing,
                "text-align" => PropertyKind::Alignment,
                "color" => PropertyKind::Color,
                "background-color" | "background" => PropertyKind::BackColor,
                _ => continue,
            };
            props.set(kind, value);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_order_is_fixed() {
        let mut a = StyleProps::default();
        a.set(PropertyKind::Color, "red");
        a.set(PropertyKind::FontFamily, "Serif");

        let mut b = StyleProps::default();
        b.set(PropertyKind::FontFamily, "Serif");
        b.set(PropertyKind::Color, "red");

        assert_eq!(a.to_css(), b.to_css());
        assert_eq!(a.to_css(), "font-family:Serif;color:red;");
    }

    #[test]
    fn test_from_css_drops_unknown() {
        let props = StyleProps::from_css("font-weight: bold; text-align: center ;color:#333");
        assert_eq!(props.text_align, Some(Alignment::Center));
        assert_eq!(props.color.as_deref(), Some("#333"));
        assert_eq!(props.font_family, None);
    }

    #[test]
    fn test_invalid_alignment_rejected() {
        let mut props = StyleProps::default();
        assert!(!props.set(PropertyKind::Alignment, "sideways"));
        assert_eq!(props.text_align, None);
        assert!(props.set(PropertyKind::Alignment, "right"));
        assert_eq!(props.get(PropertyKind::Alignment).as_deref(), Some("right"));
    }

    #[test]
    fn test_empty_value_unsets() {
        let mut props = StyleProps::default();
        props.set(PropertyKind::FontSize, "14px");
        props.set(PropertyKind::FontSize, "  ");
        assert!(props.is_empty());
    }

    #[test]
    fn test_delimiters_in_value_rejected() {
        let mut props = StyleProps::default();
        assert!(!props.set(PropertyKind::FontFamily, "Times; color:red"));
        assert!(!props.set(PropertyKind::FontFamily, "Arial\"><b>"));
        assert!(props.is_empty());

        // a rejected value leaves the previous one in place
        props.set(PropertyKind::Color, "blue");
        assert!(!props.set(PropertyKind::Color, "red;font-size:40px"));
        assert_eq!(props.to_css(), "color:blue;");
        assert_eq!(StyleProps::from_css(&props.to_css()), props);
    }
}
