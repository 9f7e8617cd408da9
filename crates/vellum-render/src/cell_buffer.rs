//! In-memory cell grid implementing [`Surface`].
//!
//! Uses `CompactString` to inline cell symbols, so a steady-state repaint
//! does not allocate per cell.

use bitvec::prelude::*;
use compact_str::CompactString;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;
use vellum_core::Rect;
use vellum_layout::Border;

use crate::border::box_runs;
use crate::clip::ClipStack;
use crate::style::Style;
use crate::surface::Surface;

/// A single terminal cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Grapheme shown in this cell
    pub symbol: CompactString,
    /// Colors and modifiers
    pub style: Style,
    /// Display width of the symbol (1 or 2, 0 for the tail of a wide glyph)
    width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: CompactString::const_new(" "),
            style: Style::default(),
            width: 1,
        }
    }
}

impl Cell {
    /// Create a cell holding `symbol`.
    #[must_use]
    pub fn new(symbol: &str, style: Style) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            style,
            width: symbol.width().clamp(1, 2) as u8,
        }
    }

    fn set(&mut self, symbol: &str, style: Style, width: u8) {
        self.symbol.clear();
        self.symbol.push_str(symbol);
        self.style = style;
        self.width = width;
    }

    fn make_continuation(&mut self, style: Style) {
        self.symbol.clear();
        self.style = style;
        self.width = 0;
    }

    /// Check if this cell is the tail of a wide glyph.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Display width of the symbol.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Reset to a blank cell.
    pub fn reset(&mut self) {
        self.set(" ", Style::default(), 1);
    }
}

/// Grid of cells with per-cell dirty bits and a clip stack.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    dirty: BitVec,
    clip: ClipStack,
}

impl PartialEq for CellBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl CellBuffer {
    /// Create a blank buffer.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            cells: vec![Cell::default(); size],
            width,
            height,
            dirty: bitvec![0; size],
            clip: ClipStack::new(Rect::new(0, 0, width, height)),
        }
    }

    /// Get total cell count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the buffer has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// Get a cell.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[self.index(x, y)])
    }

    /// Symbol at `(x, y)`, or `""` outside the buffer and on wide-glyph tails.
    #[must_use]
    pub fn symbol(&self, x: u16, y: u16) -> &str {
        self.get(x, y).map_or("", |cell| cell.symbol.as_str())
    }

    /// Text of one row. Wide-glyph tails contribute nothing.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width).map(|x| self.symbol(x, y)).collect()
    }

    /// All rows as text.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }

    /// Positions where `self` and `other` differ. Buffers of different sizes
    /// are compared over their common area.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<(u16, u16)> {
        let mut out = Vec::new();
        for y in 0..self.height.min(other.height) {
            for x in 0..self.width.min(other.width) {
                if self.get(x, y) != other.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Count dirty cells.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones()
    }

    /// Iterate over dirty cells as `(x, y)`.
    pub fn iter_dirty(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let width = usize::from(self.width.max(1));
        self.dirty
            .iter_ones()
            .map(move |i| ((i % width) as u16, (i / width) as u16))
    }

    /// Clear dirty flags, typically after a backend has flushed them.
    pub fn clear_dirty(&mut self) {
        self.dirty.fill(false);
    }

    /// Resize the buffer, dropping all content and clip frames.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
        self.dirty.fill(true);
    }

    /// Current clip depth.
    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clip.depth()
    }

    fn mark(&mut self, idx: usize) {
        self.dirty.set(idx, true);
    }

    /// Write one grapheme of `width` cells at `(x, y)`, repairing any wide
    /// glyph it partially overwrites.
    fn put(&mut self, x: u16, y: u16, grapheme: &str, style: Style, width: u8) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let lead = idx - 1;
            self.cells[lead].reset();
            self.mark(lead);
        }
        let covered = usize::from(width.max(1));
        // A wide glyph whose tail we overwrite loses its tail
        let after = idx + covered;
        if usize::from(x) + covered < usize::from(self.width)
            && self.cells[after].is_continuation()
        {
            self.cells[after].reset();
            self.mark(after);
        }

        self.cells[idx].set(grapheme, style, width);
        self.mark(idx);
        if width == 2 {
            self.cells[idx + 1].make_continuation(style);
            self.mark(idx + 1);
        }
    }

    fn visible(&self, x: u16, y: u16, width: u16) -> bool {
        let clip = self.clip.current();
        y >= clip.y
            && y < clip.bottom()
            && x >= clip.x
            && u32::from(x) + u32::from(width) <= u32::from(clip.right())
    }
}

impl Surface for CellBuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn write_text(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let mut column = u32::from(x);
        for grapheme in text.graphemes(true) {
            let width = grapheme.width().min(2) as u16;
            if width == 0 {
                continue;
            }
            if column > u32::from(u16::MAX) {
                break;
            }
            let cx = column as u16;
            if self.visible(cx, y, width) {
                self.put(cx, y, grapheme, style, width as u8);
            }
            column += u32::from(width);
        }
    }

    fn fill_rect(&mut self, rect: Rect, fill: char, style: Style) {
        let Some(area) = rect.intersection(&self.clip.current()) else {
            return;
        };
        let mut buf = [0u8; 4];
        let symbol: &str = fill.encode_utf8(&mut buf);
        let width = symbol.width().clamp(1, 2) as u16;
        for y in area.y..area.bottom() {
            let mut x = area.x;
            while u32::from(x) + u32::from(width) <= u32::from(area.right()) {
                self.put(x, y, symbol, style, width as u8);
                x += width;
            }
        }
    }

    fn draw_box(&mut self, rect: Rect, style: Style, border: &Border) {
        for run in box_runs(rect, border) {
            self.write_text(run.x, run.y, &run.text, style);
        }
    }

    fn set_clip_region(&mut self, rect: Rect) {
        self.clip.push(rect);
    }

    fn reset_clip_region(&mut self) {
        self.clip.pop();
    }
}
