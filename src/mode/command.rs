use regex::Regex;

use crate::doc::{Alignment, PropertyKind};
use crate::format::{FormatCommand, ToggleKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Write,
    Load,
    Quit,
    ForceQuit,
    WriteQuit,
    Format(FormatCommand),
    Undo,
    Redo,
    Theme(String),
    ThemeList,
    /// Known command with an unusable argument
    Invalid(String),
    Unknown(String),
}

const LENGTH: &str = r"^\d+(\.\d+)?(px|pt|em|rem|%)?$";
const COLOR: &str = r"^(#[0-9a-fA-F]{3}|#[0-9a-fA-F]{6}|[a-zA-Z]+|rgb\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*\))$";

const FONT: &str = r"^[\p{L}\p{N} ,._-]+$";

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).map_or(false, |re| re.is_match(value))
}

/// Bare numbers are taken as pixels
fn with_unit(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        format!("{}px", value)
    } else {
        value.to_string()
    }
}

fn toggle(name: &str) -> Option<ToggleKind> {
    Some(match name {
        "bold" | "b" => ToggleKind::Bold,
        "italic" | "i" => ToggleKind::Italic,
        "underline" | "u" => ToggleKind::Underline,
        "strike" | "s" => ToggleKind::Strikethrough,
        "sup" => ToggleKind::Superscript,
        "sub" => ToggleKind::Subscript,
        "ul" => ToggleKind::UnorderedList,
        "ol" => ToggleKind::OrderedList,
        "indent" => ToggleKind::Indent,
        "outdent" => ToggleKind::Outdent,
        _ => return None,
    })
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        if let Some(kind) = toggle(name) {
            if arg.is_empty() {
                return Command::Format(FormatCommand::Toggle(kind));
            }
        }

        match name {
            "font" | "size" | "lh" | "spacing" | "align" | "color" | "hl" if arg.is_empty() => {
                Command::Invalid(format!("{} needs a value", name))
            }
            "font" => {
                if !matches(FONT, arg) {
                    return Command::Invalid(format!("invalid font '{}'", arg));
                }
                Command::Format(FormatCommand::Property(PropertyKind::FontFamily, arg.to_string()))
            }
            "size" | "lh" | "spacing" => {
                if !matches(LENGTH, arg) {
                    return Command::Invalid(format!("invalid length '{}'", arg));
                }
                let (kind, value) = match name {
                    "size" => (PropertyKind::FontSize, with_unit(arg)),
                    "spacing" => (PropertyKind::ParagraphSpacing, with_unit(arg)),
                    // a bare line height is a multiplier
                    _ => (PropertyKind::LineHeight, arg.to_string()),
                };
                Command::Format(FormatCommand::Property(kind, value))
            }
            "align" => match Alignment::parse(arg) {
                Some(a) => Command::Format(FormatCommand::Property(PropertyKind::Alignment, a.as_str().to_string())),
                None => Command::Invalid(format!("alignment must be left, center, right or justify, not '{}'", arg)),
            },
            "color" | "hl" => {
                if !matches(COLOR, arg) {
                    return Command::Invalid(format!("invalid color '{}'", arg));
                }
                if name == "color" {
                    Command::Format(FormatCommand::Property(PropertyKind::Color, arg.to_string()))
                } else {
                    Command::Format(FormatCommand::Highlight(arg.to_string()))
                }
            }
            "theme" if !arg.is_empty() => Command::Theme(arg.to_string()),
            "theme" | "themes" => Command::ThemeList,
            _ if !arg.is_empty() => Command::Unknown(trimmed.to_string()),
            "w" | "save" => Command::Write,
            "e" | "load" => Command::Load,
            "q" => Command::Quit,
            "q!" => Command::ForceQuit,
            "wq" | "x" => Command::WriteQuit,
            "clear" => Command::Format(FormatCommand::ClearFormatting),
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}
