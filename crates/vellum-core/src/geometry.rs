//! Geometric primitives in terminal cell coordinates: [`Size`], [`Rect`].
//!
//! All coordinates are non-negative integer cells. Arithmetic that could leave
//! the `u16` range saturates instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A size in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in columns
    pub width: u16,
    /// Height in rows
    pub height: u16,
}

impl Size {
    /// Zero size
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Create a new size.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if this size can contain another size.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

/// An axis-aligned rectangle in terminal cells.
///
/// The right and bottom edges are exclusive: a rect at `x = 2` with
/// `width = 3` covers columns 2, 3 and 4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Column of the left edge
    pub x: u16,
    /// Row of the top edge
    pub y: u16,
    /// Width in columns
    pub width: u16,
    /// Height in rows
    pub height: u16,
}

impl Rect {
    /// Empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from a size at the origin.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Get the size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// A rect with zero width or height covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a cell is inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if `other` lies entirely inside this rectangle.
    ///
    /// Empty rectangles cover no cells and are contained anywhere.
    #[must_use]
    pub const fn contains_rect(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle shares at least one cell with another.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Calculate intersection with another rectangle.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Self::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Intersection, or an empty rect at this rect's origin when disjoint.
    #[must_use]
    pub fn clip_to(&self, other: &Self) -> Self {
        self.intersection(other)
            .unwrap_or_else(|| Self::new(self.x, self.y, 0, 0))
    }

    /// Bounding box of both rectangles. Empty rectangles are ignored.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Self::new(x, y, right - x, bottom - y)
    }

    /// Check if two rectangles share an edge with overlapping extent.
    ///
    /// `(0,0,5,5)` and `(5,0,5,5)` touch along `x = 5` and overlap on rows
    /// 0..5, so they are adjacent. Corner contact alone is not adjacency.
    #[must_use]
    pub const fn is_adjacent(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let rows_overlap = self.y < other.bottom() && other.y < self.bottom();
        let cols_overlap = self.x < other.right() && other.x < self.right();
        let touch_x = self.right() == other.x || other.right() == self.x;
        let touch_y = self.bottom() == other.y || other.bottom() == self.y;
        (touch_x && rows_overlap) || (touch_y && cols_overlap)
    }

    /// Shrink by per-side amounts, saturating at zero size.
    #[must_use]
    pub const fn inset(&self, top: u16, right: u16, bottom: u16, left: u16) -> Self {
        let horizontal = left.saturating_add(right);
        let vertical = top.saturating_add(bottom);
        Self::new(
            self.x.saturating_add(left),
            self.y.saturating_add(top),
            self.width.saturating_sub(horizontal),
            self.height.saturating_sub(vertical),
        )
    }

    /// Move by a signed offset, clamping at the origin.
    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        let clamp = |v: i32| v.clamp(0, i32::from(u16::MAX)) as u16;
        Self::new(
            clamp(i32::from(self.x) + dx),
            clamp(i32::from(self.y) + dy),
            self.width,
            self.height,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
