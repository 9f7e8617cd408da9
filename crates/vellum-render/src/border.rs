//! Box-drawing glyphs and box outlines as text runs.

use vellum_core::Rect;
use vellum_layout::{Border, BorderKind};

/// Glyph set for one border kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    /// Horizontal edge
    pub horizontal: char,
    /// Vertical edge
    pub vertical: char,
    /// Top-left corner
    pub top_left: char,
    /// Top-right corner
    pub top_right: char,
    /// Bottom-left corner
    pub bottom_left: char,
    /// Bottom-right corner
    pub bottom_right: char,
}

impl BorderGlyphs {
    const SINGLE: Self = Self::new(['─', '│', '┌', '┐', '└', '┘']);
    const DOUBLE: Self = Self::new(['═', '║', '╔', '╗', '╚', '╝']);
    const ROUNDED: Self = Self::new(['─', '│', '╭', '╮', '╰', '╯']);
    const THICK: Self = Self::new(['━', '┃', '┏', '┓', '┗', '┛']);

    const fn new(g: [char; 6]) -> Self {
        Self {
            horizontal: g[0],
            vertical: g[1],
            top_left: g[2],
            top_right: g[3],
            bottom_left: g[4],
            bottom_right: g[5],
        }
    }

    /// Glyphs for `kind`. [`BorderKind::None`] gets the single set.
    #[must_use]
    pub const fn for_kind(kind: BorderKind) -> Self {
        match kind {
            BorderKind::Double => Self::DOUBLE,
            BorderKind::Rounded => Self::ROUNDED,
            BorderKind::Thick => Self::THICK,
            BorderKind::Single | BorderKind::None => Self::SINGLE,
        }
    }
}

/// A horizontal run of text at an absolute cell position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Column of the first cell
    pub x: u16,
    /// Row
    pub y: u16,
    /// Content
    pub text: String,
}

impl TextRun {
    /// Create a run.
    #[must_use]
    pub fn new(x: u16, y: u16, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// The outline of `rect` as text runs: one run per horizontal edge, one
/// single-glyph run per vertical edge cell.
///
/// A corner is drawn where both adjoining sides are present; where only one
/// is, that side's edge glyph continues through the corner cell.
#[must_use]
pub fn box_runs(rect: Rect, border: &Border) -> Vec<TextRun> {
    if rect.is_empty() || !border.is_visible() {
        return Vec::new();
    }
    let g = BorderGlyphs::for_kind(border.kind);
    let corner = |horizontal_side: bool, vertical_side: bool, glyph: char| {
        match (horizontal_side, vertical_side) {
            (true, true) => Some(glyph),
            (true, false) => Some(g.horizontal),
            (false, true) => Some(g.vertical),
            (false, false) => None,
        }
    };
    let right = rect.x + rect.width - 1;
    let bottom = rect.y + rect.height - 1;

    let edge_row = |y: u16, side: bool, left_glyph: Option<char>, right_glyph: Option<char>| {
        if !side {
            return None;
        }
        let mut text = String::new();
        text.extend(left_glyph);
        let inner = usize::from(rect.width).saturating_sub(2);
        text.extend(std::iter::repeat(g.horizontal).take(inner));
        if rect.width > 1 {
            text.extend(right_glyph);
        }
        let x = if left_glyph.is_some() { rect.x } else { rect.x + 1 };
        (!text.is_empty()).then(|| TextRun::new(x, y, text))
    };

    let mut runs = Vec::new();
    runs.extend(edge_row(
        rect.y,
        border.top,
        corner(border.top, border.left, g.top_left),
        corner(border.top, border.right, g.top_right),
    ));

    let first_inner = if border.top { rect.y + 1 } else { rect.y };
    let last_inner = if border.bottom && rect.height > 1 {
        bottom
    } else {
        bottom + 1
    };
    for y in first_inner..last_inner {
        if border.left {
            runs.push(TextRun::new(rect.x, y, g.vertical));
        }
        if border.right && (rect.width > 1 || !border.left) {
            runs.push(TextRun::new(right, y, g.vertical));
        }
    }

    if rect.height > 1 || !border.top {
        runs.extend(edge_row(
            bottom,
            border.bottom,
            corner(border.bottom, border.left, g.bottom_left),
            corner(border.bottom, border.right, g.bottom_right),
        ));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Border {
        Border {
            kind: BorderKind::Single,
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    fn texts(runs: &[TextRun]) -> Vec<(u16, u16, &str)> {
        runs.iter().map(|r| (r.x, r.y, r.text.as_str())).collect()
    }

    #[test]
    fn test_full_box() {
        let runs = box_runs(Rect::new(1, 1, 4, 3), &single());
        assert_eq!(
            texts(&runs),
            vec![
                (1, 1, "┌──┐"),
                (1, 2, "│"),
                (4, 2, "│"),
                (1, 3, "└──┘"),
            ]
        );
    }

    #[test]
    fn test_rounded_glyphs() {
        let border = Border {
            kind: BorderKind::Rounded,
            ..single()
        };
        let runs = box_runs(Rect::new(0, 0, 2, 2), &border);
        assert_eq!(texts(&runs), vec![(0, 0, "╭╮"), (0, 1, "╰╯")]);
    }

    #[test]
    fn test_top_only() {
        let border = Border {
            right: false,
            bottom: false,
            left: false,
            ..single()
        };
        let runs = box_runs(Rect::new(0, 0, 3, 3), &border);
        assert_eq!(texts(&runs), vec![(0, 0, "───")]);
    }

    #[test]
    fn test_left_only() {
        let border = Border {
            top: false,
            right: false,
            bottom: false,
            ..single()
        };
        let runs = box_runs(Rect::new(2, 0, 3, 2), &border);
        assert_eq!(texts(&runs), vec![(2, 0, "│"), (2, 1, "│")]);
    }

    #[test]
    fn test_one_cell_box() {
        let runs = box_runs(Rect::new(0, 0, 1, 1), &single());
        assert_eq!(texts(&runs), vec![(0, 0, "┌")]);
    }

    #[test]
    fn test_invisible_border_has_no_runs() {
        assert!(box_runs(Rect::new(0, 0, 5, 5), &Border::default()).is_empty());
        assert!(box_runs(Rect::new(0, 0, 0, 5), &single()).is_empty());
    }
}
