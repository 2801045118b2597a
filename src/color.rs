//! Style strings for labels, titles and panels.
//!
//! A style string is a space separated list of words such as `"bold cyan"`
//! or `"dim #808080"`. Unknown words are ignored.

use std::fmt::Display;

use crossterm::style::{Attribute, Color, ContentStyle, StyledContent};

/// Parse a color string into a terminal color.
///
/// Supports:
/// - The eight ANSI names (black, red, green, yellow, blue, magenta, cyan,
///   white) and their `bright_` variants
/// - gray/grey, plus orange, purple, pink, brown as 24-bit colors
/// - Hex: `#RGB` (expanded to `#RRGGBB`), `#RRGGBB`
/// - Case-insensitive, trims whitespace
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else {
        parse_named(s)
    }
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            (r * 17, g * 17, b * 17)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            (r, g, b)
        }
        _ => return None,
    };
    Some(Color::Rgb { r, g, b })
}

fn parse_named(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "black"          => Some(Color::Black),
        "red"            => Some(Color::DarkRed),
        "green"          => Some(Color::DarkGreen),
        "yellow"         => Some(Color::DarkYellow),
        "blue"           => Some(Color::DarkBlue),
        "magenta"        => Some(Color::DarkMagenta),
        "cyan"           => Some(Color::DarkCyan),
        "white"          => Some(Color::Grey),
        "bright_black"   => Some(Color::DarkGrey),
        "bright_red"     => Some(Color::Red),
        "bright_green"   => Some(Color::Green),
        "bright_yellow"  => Some(Color::Yellow),
        "bright_blue"    => Some(Color::Blue),
        "bright_magenta" => Some(Color::Magenta),
        "bright_cyan"    => Some(Color::Cyan),
        "bright_white"   => Some(Color::White),
        "gray" | "grey"  => Some(Color::DarkGrey),
        "orange"         => Some(Color::Rgb { r: 255, g: 165, b: 0 }),
        "purple"         => Some(Color::Rgb { r: 128, g: 0, b: 128 }),
        "pink"           => Some(Color::Rgb { r: 255, g: 192, b: 203 }),
        "brown"          => Some(Color::Rgb { r: 139, g: 69, b: 19 }),
        _                => None,
    }
}

/// A parsed style string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub foreground: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextStyle {
    /// Parse a style string like `"bold cyan"`.
    ///
    /// The last color word wins. Unknown words are skipped.
    pub fn parse(words: &str) -> Self {
        let mut style = Self::default();
        for word in words.split_whitespace() {
            match word.to_lowercase().as_str() {
                "bold" => style.bold = true,
                "dim" => style.dim = true,
                "italic" => style.italic = true,
                "underline" => style.underline = true,
                other => {
                    if let Some(color) = parse_color(other) {
                        style.foreground = Some(color);
                    }
                }
            }
        }
        style
    }

    /// Bold text in the given color (the `"bold <color>"` style).
    pub fn bold_color(color: &str) -> Self {
        Self {
            bold: true,
            ..Self::parse(color)
        }
    }

    /// Check if the style changes nothing.
    #[inline]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// The equivalent crossterm style.
    pub fn content_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        style.foreground_color = self.foreground;
        if self.bold {
            style.attributes.set(Attribute::Bold);
        }
        if self.dim {
            style.attributes.set(Attribute::Dim);
        }
        if self.italic {
            style.attributes.set(Attribute::Italic);
        }
        if self.underline {
            style.attributes.set(Attribute::Underlined);
        }
        style
    }

    /// Wrap `content` in this style for printing.
    pub fn apply<D: Display>(&self, content: D) -> StyledContent<D> {
        self.content_style().apply(content)
    }
}
