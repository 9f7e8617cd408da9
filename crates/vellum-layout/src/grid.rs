//! Track grid layout.
//!
//! This module provides the pieces of `display: grid`:
//! - Track sizes in cells, percent, `auto` and `fr` units
//! - Track sizing against an available length
//! - Row-major auto-placement that skips occupied cells

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::distribute::apportion;
use crate::style::{percent_of, to_cells};

/// A track size specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackSize {
    /// Fixed number of cells
    Cells(u16),
    /// Percentage of the available length
    Percent(f32),
    /// Largest single-span content in the track
    Auto,
    /// Fraction of the space left after all other tracks
    Fr(f32),
}

impl Default for TrackSize {
    fn default() -> Self {
        Self::Fr(1.0)
    }
}

impl TrackSize {
    /// Parse one token: `"10"`, `"25%"`, `"auto"`, `"2fr"`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(fr) = token.strip_suffix("fr") {
            let fr: f32 = fr.parse().ok()?;
            return (fr.is_finite() && fr >= 0.0).then_some(Self::Fr(fr));
        }
        if let Some(pct) = token.strip_suffix('%') {
            let pct: f32 = pct.parse().ok()?;
            return (pct.is_finite() && pct >= 0.0).then_some(Self::Percent(pct));
        }
        token.parse::<f64>().ok().map(|n| Self::Cells(to_cells(n)))
    }
}

/// Parse a whitespace-separated track list. Unknown tokens are skipped.
#[must_use]
pub fn parse_tracks(spec: &str) -> Vec<TrackSize> {
    spec.split_whitespace()
        .filter_map(|token| {
            let track = TrackSize::parse(token);
            if track.is_none() {
                trace!(token, "ignoring unparseable grid track");
            }
            track
        })
        .collect()
}

/// Where a grid item wants to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridItem {
    /// Explicit row (0-based)
    pub row: Option<usize>,
    /// Explicit column (0-based)
    pub column: Option<usize>,
    /// Rows spanned (at least 1)
    pub row_span: usize,
    /// Columns spanned (at least 1)
    pub column_span: usize,
}

impl GridItem {
    /// Create a new grid item with auto placement.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            row: None,
            column: None,
            row_span: 1,
            column_span: 1,
        }
    }

    /// Place in a specific row.
    #[must_use]
    pub const fn row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Place in a specific column.
    #[must_use]
    pub const fn column(mut self, col: usize) -> Self {
        self.column = Some(col);
        self
    }

    /// Span multiple rows.
    #[must_use]
    pub const fn span_rows(mut self, span: usize) -> Self {
        self.row_span = span;
        self
    }

    /// Span multiple columns.
    #[must_use]
    pub const fn span_columns(mut self, span: usize) -> Self {
        self.column_span = span;
        self
    }
}

/// A placed item: top-left cell and spans clamped to the column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlacement {
    /// Top row
    pub row: usize,
    /// Left column
    pub column: usize,
    /// Rows spanned
    pub row_span: usize,
    /// Columns spanned
    pub column_span: usize,
}

impl GridPlacement {
    /// One past the last row covered.
    #[must_use]
    pub const fn row_end(&self) -> usize {
        self.row + self.row_span
    }

    /// One past the last column covered.
    #[must_use]
    pub const fn column_end(&self) -> usize {
        self.column + self.column_span
    }
}

/// Place items in a grid with `col_count` columns.
///
/// Items with both an explicit row and column go exactly there. All other
/// items are placed row-major into the first free area large enough for their
/// span, honoring an explicit row or column if only one is given.
#[must_use]
pub fn auto_place_items(col_count: usize, items: &[GridItem]) -> Vec<GridPlacement> {
    let col_count = col_count.max(1);
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut placements = vec![None; items.len()];

    let clamp = |item: &GridItem| {
        let column_span = item.column_span.clamp(1, col_count);
        let column = item
            .column
            .map(|c| c.min(col_count - column_span));
        (column, column_span, item.row_span.max(1))
    };

    // Explicitly positioned items claim their cells first
    for (i, item) in items.iter().enumerate() {
        let (column, column_span, row_span) = clamp(item);
        if let (Some(row), Some(column)) = (item.row, column) {
            let placement = GridPlacement {
                row,
                column,
                row_span,
                column_span,
            };
            mark(&mut occupied, &placement, col_count);
            placements[i] = Some(placement);
        }
    }

    for (i, item) in items.iter().enumerate() {
        if placements[i].is_some() {
            continue;
        }
        let (column, column_span, row_span) = clamp(item);
        let (row, column) =
            find_next_position(&mut occupied, col_count, item.row, column, row_span, column_span);
        let placement = GridPlacement {
            row,
            column,
            row_span,
            column_span,
        };
        mark(&mut occupied, &placement, col_count);
        placements[i] = Some(placement);
    }

    placements
        .into_iter()
        .map(|p| {
            p.unwrap_or(GridPlacement {
                row: 0,
                column: 0,
                row_span: 1,
                column_span: 1,
            })
        })
        .collect()
}

fn find_next_position(
    occupied: &mut Vec<Vec<bool>>,
    col_count: usize,
    fixed_row: Option<usize>,
    fixed_col: Option<usize>,
    row_span: usize,
    col_span: usize,
) -> (usize, usize) {
    let mut row = fixed_row.unwrap_or(0);
    loop {
        ensure_rows(occupied, row + row_span, col_count);
        let columns: Vec<usize> = match fixed_col {
            Some(col) => vec![col],
            None => (0..=(col_count - col_span)).collect(),
        };
        for col in columns {
            if can_place(occupied, row, col, row_span, col_span) {
                return (row, col);
            }
        }
        if fixed_row.is_some() && fixed_col.is_none() {
            // Row is full: overlap at the row start rather than move rows
            return (row, 0);
        }
        row += 1;
    }
}

fn ensure_rows(occupied: &mut Vec<Vec<bool>>, rows: usize, col_count: usize) {
    while occupied.len() < rows {
        occupied.push(vec![false; col_count]);
    }
}

fn can_place(
    occupied: &[Vec<bool>],
    row: usize,
    col: usize,
    row_span: usize,
    col_span: usize,
) -> bool {
    (row..row + row_span).all(|r| {
        (col..col + col_span).all(|c| {
            occupied
                .get(r)
                .and_then(|cells| cells.get(c))
                .is_some_and(|taken| !taken)
        })
    })
}

fn mark(occupied: &mut Vec<Vec<bool>>, placement: &GridPlacement, col_count: usize) {
    ensure_rows(occupied, placement.row_end(), col_count);
    for r in placement.row..placement.row_end() {
        for c in placement.column..placement.column_end().min(col_count) {
            occupied[r][c] = true;
        }
    }
}

/// Computed track positions along one axis: `(start, size)` per track,
/// relative to the grid's content origin.
pub type Tracks = Vec<(u16, u16)>;

/// Size tracks along one axis.
///
/// Cell, percent and auto tracks are sized first (`content[i]` is the largest
/// single-span content in track `i`); whatever remains of `available` after
/// those and the gaps is split among `fr` tracks by fraction.
#[must_use]
pub fn compute_track_sizes(tracks: &[TrackSize], available: u16, gap: u16, content: &[u16]) -> Tracks {
    if tracks.is_empty() {
        return Vec::new();
    }

    let gaps = u32::from(gap) * (tracks.len() as u32 - 1);
    let mut sizes: Vec<u32> = Vec::with_capacity(tracks.len());
    let mut fixed: u32 = 0;

    for (i, track) in tracks.iter().enumerate() {
        let size = match track {
            TrackSize::Cells(n) => u32::from(*n),
            TrackSize::Percent(p) => u32::from(percent_of(available, *p)),
            TrackSize::Auto => u32::from(content.get(i).copied().unwrap_or(0)),
            TrackSize::Fr(_) => 0,
        };
        fixed += size;
        sizes.push(size);
    }

    let remaining = u32::from(available).saturating_sub(fixed + gaps);
    let fractions: Vec<f64> = tracks
        .iter()
        .map(|t| match t {
            TrackSize::Fr(fr) => f64::from(*fr),
            _ => 0.0,
        })
        .collect();
    for (size, share) in sizes.iter_mut().zip(apportion(remaining, &fractions)) {
        *size += share;
    }

    let mut result = Vec::with_capacity(tracks.len());
    let mut position: u32 = 0;
    for (i, size) in sizes.into_iter().enumerate() {
        let clamp = |v: u32| v.min(u32::from(u16::MAX)) as u16;
        result.push((clamp(position), clamp(size)));
        position += size;
        if i + 1 < tracks.len() {
            position += u32::from(gap);
        }
    }
    result
}

/// Start and length covered by `span` tracks beginning at `first`.
///
/// Gaps between the spanned tracks are included. Spans past the last track
/// are cut at the end of the grid.
#[must_use]
pub fn span_extent(tracks: &Tracks, first: usize, span: usize) -> (u16, u16) {
    let Some(&(start, _)) = tracks.get(first) else {
        let end = tracks.last().map_or(0, |(s, l)| s.saturating_add(*l));
        return (end, 0);
    };
    let last = (first + span.max(1) - 1).min(tracks.len() - 1);
    let (last_start, last_size) = tracks[last];
    (start, last_start.saturating_add(last_size).saturating_sub(start))
}

/// Total length covered by all tracks.
#[must_use]
pub fn tracks_length(tracks: &Tracks) -> u16 {
    tracks.last().map_or(0, |(start, size)| start.saturating_add(*size))
}
