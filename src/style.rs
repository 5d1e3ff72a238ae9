use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ConfigError;
use crate::mode::Mode;

/// Color that can be serialized/deserialized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// Named color: "red", "blue", "cyan", etc.
    Named(NamedColor),
    /// RGB color: [255, 128, 0]
    Rgb([u8; 3]),
    /// 256-color index: 42
    Indexed(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
    Reset,
}

impl From<NamedColor> for Color {
    fn from(n: NamedColor) -> Color {
        match n {
            NamedColor::Black => Color::Black,
            NamedColor::Red => Color::Red,
            NamedColor::Green => Color::Green,
            NamedColor::Yellow => Color::Yellow,
            NamedColor::Blue => Color::Blue,
            NamedColor::Magenta => Color::Magenta,
            NamedColor::Cyan => Color::Cyan,
            NamedColor::Gray => Color::Gray,
            NamedColor::DarkGray => Color::DarkGray,
            NamedColor::LightRed => Color::LightRed,
            NamedColor::LightGreen => Color::LightGreen,
            NamedColor::LightYellow => Color::LightYellow,
            NamedColor::LightBlue => Color::LightBlue,
            NamedColor::LightMagenta => Color::LightMagenta,
            NamedColor::LightCyan => Color::LightCyan,
            NamedColor::White => Color::White,
            NamedColor::Reset => Color::Reset,
        }
    }
}

impl From<ThemeColor> for Color {
    fn from(tc: ThemeColor) -> Color {
        match tc {
            ThemeColor::Named(n) => n.into(),
            ThemeColor::Rgb([r, g, b]) => Color::Rgb(r, g, b),
            ThemeColor::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Style definition for a single element
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<ThemeColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: ThemeColor) -> Self {
        Self { fg: Some(color), ..Default::default() }
    }

    pub fn with_bg(mut self, color: ThemeColor) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut style = RatStyle::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg.into());
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg.into());
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

/// Complete theme configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    #[serde(default)]
    pub background: Option<ThemeColor>,

    // Cells
    pub cell: ElementStyle,
    pub cell_active: ElementStyle,
    pub cell_selection: ElementStyle,
    pub cell_locked: ElementStyle,
    pub border: ElementStyle,
    pub border_active: ElementStyle,

    // Toolbar
    pub toolbar: ElementStyle,
    pub toolbar_active: ElementStyle,

    // Status bar
    pub status_bar: ElementStyle,
    pub status_mode_normal: ElementStyle,
    pub status_mode_insert: ElementStyle,
    pub status_mode_command: ElementStyle,
    pub status_dirty: ElementStyle,

    // Messages
    pub message_info: ElementStyle,
    pub message_warning: ElementStyle,
    pub message_error: ElementStyle,

    // Command line
    pub command_line: ElementStyle,
    pub command_prompt: ElementStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn dark() -> Self {
        use NamedColor::*;
        Self {
            name: "dark".to_string(),
            background: Some(ThemeColor::Named(Black)),
            cell: ElementStyle::fg(ThemeColor::Named(White)),
            cell_active: ElementStyle::fg(ThemeColor::Named(White)).with_bg(ThemeColor::Named(Blue)),
            cell_selection: ElementStyle::fg(ThemeColor::Named(White)).with_bg(ThemeColor::Named(DarkGray)),
            cell_locked: ElementStyle::fg(ThemeColor::Named(Gray)).with_dim(),
            border: ElementStyle::fg(ThemeColor::Named(DarkGray)),
            border_active: ElementStyle::fg(ThemeColor::Named(LightCyan)).with_bold(),
            toolbar: ElementStyle::fg(ThemeColor::Named(Gray)),
            toolbar_active: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightCyan))
                .with_bold(),
            status_bar: ElementStyle::fg(ThemeColor::Named(White)).with_bg(ThemeColor::Named(DarkGray)),
            status_mode_normal: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightBlue))
                .with_bold(),
            status_mode_insert: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightGreen))
                .with_bold(),
            status_mode_command: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightYellow))
                .with_bold(),
            status_dirty: ElementStyle::fg(ThemeColor::Named(LightRed)).with_bold(),
            message_info: ElementStyle::fg(ThemeColor::Named(White)),
            message_warning: ElementStyle::fg(ThemeColor::Named(LightYellow)),
            message_error: ElementStyle::fg(ThemeColor::Named(LightRed)).with_bold(),
            command_line: ElementStyle::fg(ThemeColor::Named(White)),
            command_prompt: ElementStyle::fg(ThemeColor::Named(LightCyan)),
        }
    }

    /// Light theme (default)
    pub fn light() -> Self {
        use NamedColor::*;
        Self {
            name: "light".to_string(),
            background: None,
            cell: ElementStyle::fg(ThemeColor::Named(Black)),
            cell_active: ElementStyle::fg(ThemeColor::Named(Black)).with_bg(ThemeColor::Named(LightBlue)),
            cell_selection: ElementStyle::fg(ThemeColor::Named(Black)).with_bg(ThemeColor::Named(LightCyan)),
            cell_locked: ElementStyle::fg(ThemeColor::Named(DarkGray)).with_dim(),
            border: ElementStyle::fg(ThemeColor::Named(Gray)),
            border_active: ElementStyle::fg(ThemeColor::Named(Blue)).with_bold(),
            toolbar: ElementStyle::fg(ThemeColor::Named(DarkGray)),
            toolbar_active: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Blue))
                .with_bold(),
            status_bar: ElementStyle::fg(ThemeColor::Named(Black)).with_bg(ThemeColor::Named(Gray)),
            status_mode_normal: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Blue))
                .with_bold(),
            status_mode_insert: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Green))
                .with_bold(),
            status_mode_command: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(Yellow))
                .with_bold(),
            status_dirty: ElementStyle::fg(ThemeColor::Named(Red)).with_bold(),
            message_info: ElementStyle::fg(ThemeColor::Named(Black)),
            message_warning: ElementStyle::fg(ThemeColor::Named(Yellow)),
            message_error: ElementStyle::fg(ThemeColor::Named(Red)).with_bold(),
            command_line: ElementStyle::fg(ThemeColor::Named(Black)),
            command_prompt: ElementStyle::fg(ThemeColor::Named(Blue)),
        }
    }

    pub fn solarized_dark() -> Self {
        let base03 = ThemeColor::Rgb([0, 43, 54]);
        let base02 = ThemeColor::Rgb([7, 54, 66]);
        let base01 = ThemeColor::Rgb([88, 110, 117]);
        let base0 = ThemeColor::Rgb([131, 148, 150]);
        let base1 = ThemeColor::Rgb([147, 161, 161]);
        let yellow = ThemeColor::Rgb([181, 137, 0]);
        let orange = ThemeColor::Rgb([203, 75, 22]);
        let red = ThemeColor::Rgb([220, 50, 47]);
        let blue = ThemeColor::Rgb([38, 139, 210]);
        let cyan = ThemeColor::Rgb([42, 161, 152]);
        let green = ThemeColor::Rgb([133, 153, 0]);

        Self {
            name: "solarized-dark".to_string(),
            background: Some(base03),
            cell: ElementStyle::fg(base0),
            cell_active: ElementStyle::fg(base1).with_bg(base02).with_bold(),
            cell_selection: ElementStyle::fg(base03).with_bg(cyan),
            cell_locked: ElementStyle::fg(base01).with_dim(),
            border: ElementStyle::fg(base01),
            border_active: ElementStyle::fg(blue).with_bold(),
            toolbar: ElementStyle::fg(base01),
            toolbar_active: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            status_bar: ElementStyle::fg(base1).with_bg(base02),
            status_mode_normal: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            status_mode_insert: ElementStyle::fg(base03).with_bg(green).with_bold(),
            status_mode_command: ElementStyle::fg(base03).with_bg(yellow).with_bold(),
            status_dirty: ElementStyle::fg(red).with_bold(),
            message_info: ElementStyle::fg(base0),
            message_warning: ElementStyle::fg(orange),
            message_error: ElementStyle::fg(red).with_bold(),
            command_line: ElementStyle::fg(base0),
            command_prompt: ElementStyle::fg(cyan),
        }
    }

    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "solarized" | "solarized-dark" => Some(Self::solarized_dark()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["dark", "light", "solarized-dark"]
    }
}

/// Runtime style manager
#[derive(Default)]
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn cell(&self) -> RatStyle {
        self.theme.cell.to_ratatui()
    }

    pub fn cell_active(&self) -> RatStyle {
        self.theme.cell_active.to_ratatui()
    }

    pub fn cell_selection(&self) -> RatStyle {
        self.theme.cell_selection.to_ratatui()
    }

    pub fn cell_locked(&self) -> RatStyle {
        self.theme.cell_locked.to_ratatui()
    }

    pub fn border(&self) -> RatStyle {
        self.theme.border.to_ratatui()
    }

    pub fn border_active(&self) -> RatStyle {
        self.theme.border_active.to_ratatui()
    }

    pub fn toolbar(&self) -> RatStyle {
        self.theme.toolbar.to_ratatui()
    }

    pub fn toolbar_active(&self) -> RatStyle {
        self.theme.toolbar_active.to_ratatui()
    }

    pub fn status_bar(&self) -> RatStyle {
        self.theme.status_bar.to_ratatui()
    }

    pub fn status_mode(&self, mode: Mode) -> RatStyle {
        match mode {
            Mode::Normal => self.theme.status_mode_normal.to_ratatui(),
            Mode::Insert => self.theme.status_mode_insert.to_ratatui(),
            Mode::Command | Mode::Confirm => self.theme.status_mode_command.to_ratatui(),
        }
    }

    pub fn status_dirty(&self) -> RatStyle {
        self.theme.status_dirty.to_ratatui()
    }

    pub fn message_info(&self) -> RatStyle {
        self.theme.message_info.to_ratatui()
    }

    pub fn message_warning(&self) -> RatStyle {
        self.theme.message_warning.to_ratatui()
    }

    pub fn message_error(&self) -> RatStyle {
        self.theme.message_error.to_ratatui()
    }

    pub fn command_line(&self) -> RatStyle {
        self.theme.command_line.to_ratatui()
    }

    pub fn command_prompt(&self) -> RatStyle {
        self.theme.command_prompt.to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.into())
    }
}
