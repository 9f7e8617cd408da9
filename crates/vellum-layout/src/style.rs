//! Box style resolved from element props.
//!
//! Props are kebab-case and read leniently; anything unparseable falls back to
//! the default for that property. Negative or non-finite numbers are clamped
//! to zero and logged at `trace`.

use serde::{Deserialize, Serialize};
use tracing::trace;
use vellum_core::{Props, Value};

use crate::grid::{parse_tracks, TrackSize};

/// A length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// Determined by content or the parent
    #[default]
    Auto,
    /// Fixed number of cells
    Cells(u16),
    /// Percentage of the parent's content size
    Percent(f32),
}

impl Dimension {
    /// Resolve against the parent's size. `Auto` has no definite value.
    #[must_use]
    pub fn resolve(&self, parent: u16) -> Option<u16> {
        match self {
            Self::Auto => None,
            Self::Cells(n) => Some(*n),
            Self::Percent(p) => Some(percent_of(parent, *p)),
        }
    }

    /// Check if this dimension is `Auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Parse `"12"`, `"50%"`, `"auto"` or a number.
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        if let Some(s) = value.as_str() {
            let s = s.trim();
            if s.eq_ignore_ascii_case("auto") {
                return Some(Self::Auto);
            }
            if let Some(pct) = s.strip_suffix('%') {
                let p: f64 = pct.trim().parse().ok()?;
                return Some(Self::Percent(clamp_f64(p, "percent") as f32));
            }
        }
        value.as_f64().map(|n| Self::Cells(to_cells(n)))
    }
}

/// `p` percent of `parent`, rounded down.
#[must_use]
pub fn percent_of(parent: u16, p: f32) -> u16 {
    let cells = (f64::from(parent) * f64::from(p) / 100.0).floor();
    to_cells(cells)
}

/// Per-side amounts in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edges {
    /// Top side
    pub top: u16,
    /// Right side
    pub right: u16,
    /// Bottom side
    pub bottom: u16,
    /// Left side
    pub left: u16,
}

impl Edges {
    /// No edges.
    pub const ZERO: Self = Self::all(0);

    /// Same amount on every side.
    #[must_use]
    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    /// Left plus right.
    #[must_use]
    pub const fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    /// Top plus bottom.
    #[must_use]
    pub const fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }

    /// Add two edge sets side by side.
    #[must_use]
    pub const fn plus(&self, other: &Self) -> Self {
        Self {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderKind {
    /// No border
    #[default]
    None,
    /// Thin single line
    Single,
    /// Double line
    Double,
    /// Single line with rounded corners
    Rounded,
    /// Heavy line
    Thick,
}

impl BorderKind {
    /// Parse a border prop value. Booleans map to `Single` / `None`.
    #[must_use]
    pub fn parse(value: &Value) -> Self {
        if let Value::Bool(b) = value {
            return if *b { Self::Single } else { Self::None };
        }
        match value.to_string().trim().to_ascii_lowercase().as_str() {
            "none" | "false" | "0" => Self::None,
            "double" => Self::Double,
            "rounded" | "round" => Self::Rounded,
            "thick" | "heavy" | "bold" => Self::Thick,
            "single" | "true" | "1" | "solid" => Self::Single,
            other => {
                trace!(value = other, "unknown border style, using single");
                Self::Single
            }
        }
    }
}

/// Border style plus which sides are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Border {
    /// Line style
    pub kind: BorderKind,
    /// Top side present
    pub top: bool,
    /// Right side present
    pub right: bool,
    /// Bottom side present
    pub bottom: bool,
    /// Left side present
    pub left: bool,
}

impl Border {
    /// Check if any side is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self.kind, BorderKind::None)
            && (self.top || self.right || self.bottom || self.left)
    }

    /// Space taken by the border: one cell per present side.
    #[must_use]
    pub const fn edges(&self) -> Edges {
        if !self.is_visible() {
            return Edges::ZERO;
        }
        Edges {
            top: self.top as u16,
            right: self.right as u16,
            bottom: self.bottom as u16,
            left: self.left as u16,
        }
    }

    /// Read `border` and `border-{side}` from props.
    #[must_use]
    pub fn from_props(props: &Props) -> Self {
        let mut border = props.get("border").map_or_else(Self::default, |v| {
            let kind = BorderKind::parse(v);
            let on = kind != BorderKind::None;
            Self {
                kind,
                top: on,
                right: on,
                bottom: on,
                left: on,
            }
        });

        let sides = [
            ("border-top", &mut border.top),
            ("border-right", &mut border.right),
            ("border-bottom", &mut border.bottom),
            ("border-left", &mut border.left),
        ];
        let mut any_side = false;
        for (key, side) in sides {
            if let Some(on) = props.get(key).and_then(Value::as_bool) {
                *side = on;
                any_side |= on;
            }
        }
        if any_side && border.kind == BorderKind::None {
            border.kind = BorderKind::Single;
        }
        border
    }
}

/// Layout algorithm for an element's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Display {
    /// Flexbox along `direction`
    #[default]
    Flex,
    /// Two-dimensional track grid
    Grid,
}

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexDirection {
    /// Left to right
    Row,
    /// Top to bottom
    #[default]
    Column,
}

impl FlexDirection {
    /// Check if the main axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row)
    }
}

/// Main axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Justify {
    /// Pack items at the start
    #[default]
    Start,
    /// Center items
    Center,
    /// Pack items at the end
    End,
    /// Leftover space between items, none at the edges
    SpaceBetween,
    /// Equal space around each item (half at the edges)
    SpaceAround,
    /// Equal space between items and at the edges
    SpaceEvenly,
}

impl Justify {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "start" | "flex-start" => Self::Start,
            "center" => Self::Center,
            "end" | "flex-end" => Self::End,
            "space-between" => Self::SpaceBetween,
            "space-around" => Self::SpaceAround,
            "space-evenly" => Self::SpaceEvenly,
            _ => return None,
        })
    }
}

/// Cross axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    /// Align to the start
    Start,
    /// Center
    Center,
    /// Align to the end
    End,
    /// Fill the line
    #[default]
    Stretch,
}

impl Align {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "start" | "flex-start" => Self::Start,
            "center" => Self::Center,
            "end" | "flex-end" => Self::End,
            "stretch" => Self::Stretch,
            _ => return None,
        })
    }
}

/// Everything layout reads from one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    /// Explicit width
    pub width: Dimension,
    /// Explicit height
    pub height: Dimension,
    /// Minimum width
    pub min_width: Dimension,
    /// Maximum width
    pub max_width: Dimension,
    /// Minimum height
    pub min_height: Dimension,
    /// Maximum height
    pub max_height: Dimension,
    /// Outer spacing
    pub margin: Edges,
    /// Inner spacing
    pub padding: Edges,
    /// Border
    pub border: Border,
    /// Child layout algorithm
    pub display: Display,
    /// Flex main axis
    pub direction: FlexDirection,
    /// Break flex items into lines
    pub wrap: bool,
    /// Main axis alignment
    pub justify: Justify,
    /// Default cross alignment of children
    pub align_items: Align,
    /// Cross alignment override for this item
    pub align_self: Option<Align>,
    /// Gap between columns (flex row main axis, grid columns)
    pub column_gap: u16,
    /// Gap between rows (flex column main axis, grid rows)
    pub row_gap: u16,
    /// Share of surplus space
    pub flex_grow: f64,
    /// Share of deficit
    pub flex_shrink: f64,
    /// Initial main size
    pub flex_basis: Dimension,
    /// Grid column tracks
    pub grid_columns: Vec<TrackSize>,
    /// Grid row tracks
    pub grid_rows: Vec<TrackSize>,
    /// Explicit grid row (0-based)
    pub grid_row: Option<usize>,
    /// Explicit grid column (0-based)
    pub grid_column: Option<usize>,
    /// Rows spanned
    pub grid_row_span: usize,
    /// Columns spanned
    pub grid_column_span: usize,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_height: Dimension::Auto,
            margin: Edges::ZERO,
            padding: Edges::ZERO,
            border: Border::default(),
            display: Display::Flex,
            direction: FlexDirection::Column,
            wrap: false,
            justify: Justify::Start,
            align_items: Align::Stretch,
            align_self: None,
            column_gap: 0,
            row_gap: 0,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            grid_columns: Vec::new(),
            grid_rows: Vec::new(),
            grid_row: None,
            grid_column: None,
            grid_row_span: 1,
            grid_column_span: 1,
        }
    }
}

impl BoxStyle {
    /// Resolve the style of an element from its tag and props.
    ///
    /// A `row` tag defaults to a horizontal main axis; everything else
    /// defaults to a column.
    #[must_use]
    pub fn from_element(tag: &str, props: &Props) -> Self {
        let mut style = Self::default();
        if matches!(tag, "row" | "hstack") {
            style.direction = FlexDirection::Row;
        }

        let dim = |key: &str| props.get(key).and_then(Dimension::parse);
        let cells = |key: &str| props.get(key).and_then(Value::as_f64).map(to_cells);
        let word = |key: &str| {
            props
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_ascii_lowercase())
        };

        style.width = dim("width").unwrap_or_default();
        style.height = dim("height").unwrap_or_default();
        style.min_width = dim("min-width").unwrap_or_default();
        style.max_width = dim("max-width").unwrap_or_default();
        style.min_height = dim("min-height").unwrap_or_default();
        style.max_height = dim("max-height").unwrap_or_default();
        style.margin = edges(props, "margin");
        style.padding = edges(props, "padding");
        style.border = Border::from_props(props);

        if word("display").as_deref() == Some("grid") {
            style.display = Display::Grid;
        }
        match word("direction").or_else(|| word("flex-direction")).as_deref() {
            Some("row") => style.direction = FlexDirection::Row,
            Some("column") => style.direction = FlexDirection::Column,
            _ => {}
        }
        style.wrap = props.get("wrap").is_some_and(|v| {
            v.as_bool()
                .unwrap_or_else(|| v.as_str().is_some_and(|s| s.trim() == "wrap"))
        });
        if let Some(justify) = word("justify-content").as_deref().and_then(Justify::parse) {
            style.justify = justify;
        }
        if let Some(align) = word("align-items").as_deref().and_then(Align::parse) {
            style.align_items = align;
        }
        style.align_self = word("align-self").as_deref().and_then(Align::parse);

        let gap = cells("gap").unwrap_or(0);
        style.column_gap = cells("column-gap").unwrap_or(gap);
        style.row_gap = cells("row-gap").unwrap_or(gap);

        if let Some(grow) = props.get("flex-grow").and_then(Value::as_f64) {
            style.flex_grow = clamp_f64(grow, "flex-grow");
        }
        if let Some(shrink) = props.get("flex-shrink").and_then(Value::as_f64) {
            style.flex_shrink = clamp_f64(shrink, "flex-shrink");
        }
        style.flex_basis = dim("flex-basis").unwrap_or_default();

        if let Some(spec) = props.get("grid-template-columns") {
            style.grid_columns = parse_tracks(&spec.to_string());
        }
        if let Some(spec) = props.get("grid-template-rows") {
            style.grid_rows = parse_tracks(&spec.to_string());
        }
        let index = |key: &str| cells(key).map(usize::from);
        style.grid_row = index("grid-row");
        style.grid_column = index("grid-column");
        style.grid_row_span = index("grid-row-span").unwrap_or(1).max(1);
        style.grid_column_span = index("grid-column-span").unwrap_or(1).max(1);

        style
    }

    /// Border plus padding.
    #[must_use]
    pub fn chrome(&self) -> Edges {
        self.border.edges().plus(&self.padding)
    }

    /// Gap along the flex main axis.
    #[must_use]
    pub const fn main_gap(&self) -> u16 {
        if self.direction.is_row() {
            self.column_gap
        } else {
            self.row_gap
        }
    }

    /// Gap between flex lines.
    #[must_use]
    pub const fn cross_gap(&self) -> u16 {
        if self.direction.is_row() {
            self.row_gap
        } else {
            self.column_gap
        }
    }

    /// Clamp a width to `min-width` / `max-width`.
    #[must_use]
    pub fn clamp_width(&self, width: u16, parent: u16) -> u16 {
        clamp_between(width, self.min_width.resolve(parent), self.max_width.resolve(parent))
    }

    /// Clamp a height to `min-height` / `max-height`.
    #[must_use]
    pub fn clamp_height(&self, height: u16, parent: u16) -> u16 {
        clamp_between(
            height,
            self.min_height.resolve(parent),
            self.max_height.resolve(parent),
        )
    }
}

/// Clamp with optional bounds. A minimum wins over a smaller maximum.
#[must_use]
pub fn clamp_between(value: u16, min: Option<u16>, max: Option<u16>) -> u16 {
    let value = max.map_or(value, |m| value.min(m));
    min.map_or(value, |m| value.max(m))
}

fn edges(props: &Props, prefix: &str) -> Edges {
    let all = props
        .get(prefix)
        .and_then(Value::as_f64)
        .map_or(0, to_cells);
    let side = |name: &str| {
        props
            .get(&format!("{prefix}-{name}"))
            .and_then(Value::as_f64)
            .map_or(all, to_cells)
    };
    Edges {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

fn clamp_f64(n: f64, what: &str) -> f64 {
    if n.is_finite() && n >= 0.0 {
        n
    } else {
        trace!(value = n, what, "clamping invalid layout value to zero");
        0.0
    }
}

/// Convert a number to whole cells, clamping invalid values to zero.
#[must_use]
pub fn to_cells(n: f64) -> u16 {
    let n = clamp_f64(n, "cells");
    n.round().min(f64::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, Value)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    // =========================================================================
    // Dimension Tests
    // =========================================================================

    #[test]
    fn test_dimension_parse() {
        assert_eq!(Dimension::parse(&Value::from(12)), Some(Dimension::Cells(12)));
        assert_eq!(
            Dimension::parse(&Value::from("50%")),
            Some(Dimension::Percent(50.0))
        );
        assert_eq!(Dimension::parse(&Value::from("auto")), Some(Dimension::Auto));
        assert_eq!(Dimension::parse(&Value::from("wide")), None);
    }

    #[test]
    fn test_dimension_negative_clamps_to_zero() {
        assert_eq!(Dimension::parse(&Value::from(-5)), Some(Dimension::Cells(0)));
        assert_eq!(
            Dimension::parse(&Value::Float(f64::NAN)),
            Some(Dimension::Cells(0))
        );
    }

    #[test]
    fn test_dimension_resolve() {
        assert_eq!(Dimension::Percent(50.0).resolve(81), Some(40));
        assert_eq!(Dimension::Cells(7).resolve(81), Some(7));
        assert_eq!(Dimension::Auto.resolve(81), None);
    }

    // =========================================================================
    // Border Tests
    // =========================================================================

    #[test]
    fn test_border_kinds() {
        assert_eq!(BorderKind::parse(&Value::from(true)), BorderKind::Single);
        assert_eq!(BorderKind::parse(&Value::from(false)), BorderKind::None);
        assert_eq!(BorderKind::parse(&Value::from("double")), BorderKind::Double);
        assert_eq!(BorderKind::parse(&Value::from("rounded")), BorderKind::Rounded);
        assert_eq!(BorderKind::parse(&Value::from("thick")), BorderKind::Thick);
        assert_eq!(BorderKind::parse(&Value::from("none")), BorderKind::None);
    }

    #[test]
    fn test_border_sides() {
        let border = Border::from_props(&props(&[
            ("border", Value::from("double")),
            ("border-left", Value::from(false)),
        ]));
        assert_eq!(border.kind, BorderKind::Double);
        assert_eq!(border.edges(), Edges { top: 1, right: 1, bottom: 1, left: 0 });
    }

    #[test]
    fn test_border_side_only() {
        let border = Border::from_props(&props(&[("border-bottom", Value::from(true))]));
        assert_eq!(border.kind, BorderKind::Single);
        assert_eq!(border.edges(), Edges { top: 0, right: 0, bottom: 1, left: 0 });
    }

    #[test]
    fn test_no_border_takes_no_space() {
        assert_eq!(Border::from_props(&Props::new()).edges(), Edges::ZERO);
    }

    // =========================================================================
    // BoxStyle Tests
    // =========================================================================

    #[test]
    fn test_style_defaults() {
        let style = BoxStyle::from_element("box", &Props::new());
        assert_eq!(style.direction, FlexDirection::Column);
        assert_eq!(style.align_items, Align::Stretch);
        assert_eq!(style.justify, Justify::Start);
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.grid_column_span, 1);
    }

    #[test]
    fn test_style_row_tag() {
        let style = BoxStyle::from_element("row", &Props::new());
        assert_eq!(style.direction, FlexDirection::Row);
        let style = BoxStyle::from_element("row", &props(&[("direction", Value::from("column"))]));
        assert_eq!(style.direction, FlexDirection::Column);
    }

    #[test]
    fn test_style_spacing() {
        let style = BoxStyle::from_element(
            "box",
            &props(&[
                ("padding", Value::from(1)),
                ("padding-left", Value::from(3)),
                ("margin-top", Value::from(2)),
                ("border", Value::from(true)),
            ]),
        );
        assert_eq!(style.padding, Edges { top: 1, right: 1, bottom: 1, left: 3 });
        assert_eq!(style.margin, Edges { top: 2, right: 0, bottom: 0, left: 0 });
        assert_eq!(style.chrome(), Edges { top: 2, right: 2, bottom: 2, left: 4 });
    }

    #[test]
    fn test_style_flex_props() {
        let style = BoxStyle::from_element(
            "row",
            &props(&[
                ("justify-content", Value::from("space-between")),
                ("align-items", Value::from("center")),
                ("align-self", Value::from("end")),
                ("flex-grow", Value::from(2)),
                ("flex-shrink", Value::from(-1)),
                ("flex-basis", Value::from("25%")),
                ("gap", Value::from(1)),
                ("row-gap", Value::from(2)),
                ("wrap", Value::from(true)),
            ]),
        );
        assert_eq!(style.justify, Justify::SpaceBetween);
        assert_eq!(style.align_items, Align::Center);
        assert_eq!(style.align_self, Some(Align::End));
        assert_eq!(style.flex_grow, 2.0);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(style.flex_basis, Dimension::Percent(25.0));
        assert_eq!(style.column_gap, 1);
        assert_eq!(style.row_gap, 2);
        assert_eq!(style.main_gap(), 1);
        assert_eq!(style.cross_gap(), 2);
        assert!(style.wrap);
    }

    #[test]
    fn test_style_grid_props() {
        let style = BoxStyle::from_element(
            "box",
            &props(&[
                ("display", Value::from("grid")),
                ("grid-template-columns", Value::from("10 1fr")),
                ("grid-row", Value::from(1)),
                ("grid-column-span", Value::from(2)),
            ]),
        );
        assert_eq!(style.display, Display::Grid);
        assert_eq!(style.grid_columns, vec![TrackSize::Cells(10), TrackSize::Fr(1.0)]);
        assert_eq!(style.grid_row, Some(1));
        assert_eq!(style.grid_column, None);
        assert_eq!(style.grid_column_span, 2);
    }

    #[test]
    fn test_clamp_between() {
        assert_eq!(clamp_between(50, Some(10), Some(30)), 30);
        assert_eq!(clamp_between(5, Some(10), Some(30)), 10);
        assert_eq!(clamp_between(5, Some(10), Some(3)), 10);
        assert_eq!(clamp_between(5, None, None), 5);
    }
}
