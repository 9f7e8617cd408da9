//! Cell styles: colors and text modifiers.

use serde::{Deserialize, Serialize};
use tracing::trace;
use vellum_core::{Props, Value};

/// Terminal color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Terminal default
    #[default]
    Reset,
    /// Black
    Black,
    /// Red
    Red,
    /// Green
    Green,
    /// Yellow
    Yellow,
    /// Blue
    Blue,
    /// Magenta
    Magenta,
    /// Cyan
    Cyan,
    /// White
    White,
    /// Gray
    Gray,
    /// 256-color palette index
    Indexed(u8),
    /// True color
    Rgb(u8, u8, u8),
}

/// Error from [`Color::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// Not `#rgb` or `#rrggbb`
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
    /// Unknown color name
    #[error("unknown color: {0}")]
    UnknownName(String),
}

impl Color {
    /// Parse a color name, `#rgb`, or `#rrggbb`.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(s.to_string()));
        }
        let color = match s.to_ascii_lowercase().as_str() {
            "default" | "reset" | "none" => Self::Reset,
            "black" => Self::Black,
            "red" => Self::Red,
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "blue" => Self::Blue,
            "magenta" | "purple" => Self::Magenta,
            "cyan" => Self::Cyan,
            "white" => Self::White,
            "gray" | "grey" => Self::Gray,
            _ => return Err(ColorParseError::UnknownName(s.to_string())),
        };
        Ok(color)
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::Rgb(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
            )),
            3 => {
                let short = |i: usize| channel(hex.get(i..=i)?).map(|v| v * 17);
                Some(Self::Rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    /// Read a color from a prop value. Integers are palette indices.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => u8::try_from(*i).ok().map(Self::Indexed),
            Value::Str(s) => match Self::parse(s) {
                Ok(color) => Some(color),
                Err(err) => {
                    trace!(%err, "ignoring color prop");
                    None
                }
            },
            _ => None,
        }
    }
}

/// Text modifiers for terminal cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Bold text.
    pub const BOLD: Self = Self(1 << 0);
    /// Italic text.
    pub const ITALIC: Self = Self(1 << 1);
    /// Underlined text.
    pub const UNDERLINE: Self = Self(1 << 2);
    /// Strikethrough text.
    pub const STRIKETHROUGH: Self = Self(1 << 3);
    /// Dim text.
    pub const DIM: Self = Self(1 << 4);
    /// Reversed colors.
    pub const REVERSE: Self = Self(1 << 5);

    const PROPS: [(&'static str, Self); 6] = [
        ("bold", Self::BOLD),
        ("italic", Self::ITALIC),
        ("underline", Self::UNDERLINE),
        ("strikethrough", Self::STRIKETHROUGH),
        ("dim", Self::DIM),
        ("reverse", Self::REVERSE),
    ];

    /// Check if no modifier is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if all modifiers in `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Add modifiers.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Remove modifiers.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Get raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Foreground, background and modifiers of painted cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text modifiers
    pub modifiers: Modifiers,
}

impl Style {
    /// Create a style with the given foreground.
    #[must_use]
    pub const fn fg(fg: Color) -> Self {
        Self {
            fg,
            bg: Color::Reset,
            modifiers: Modifiers::NONE,
        }
    }

    /// Set the background.
    #[must_use]
    pub const fn on(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Add modifiers.
    #[must_use]
    pub const fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = self.modifiers.with(modifiers);
        self
    }

    /// Style of an element's content, inheriting from `parent`.
    ///
    /// `color` sets the foreground, `background` the background, and boolean
    /// props such as `bold` toggle modifiers; unset props inherit.
    #[must_use]
    pub fn cascade(parent: Self, props: &Props) -> Self {
        let mut style = parent;
        if let Some(fg) = props.get("color").and_then(Color::from_value) {
            style.fg = fg;
        }
        if let Some(bg) = props.get("background").and_then(Color::from_value) {
            style.bg = bg;
        }
        for (key, flag) in Modifiers::PROPS {
            match props.get(key).and_then(Value::as_bool) {
                Some(true) => style.modifiers |= flag,
                Some(false) => style.modifiers = style.modifiers.without(flag),
                None => {}
            }
        }
        style
    }

    /// Style used for an element's border: `border-color` overrides the
    /// foreground.
    #[must_use]
    pub fn border(self, props: &Props) -> Self {
        match props.get("border-color").and_then(Color::from_value) {
            Some(fg) => Self { fg, ..self },
            None => self,
        }
    }
}
