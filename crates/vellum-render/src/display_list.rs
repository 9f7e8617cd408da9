//! Recorded paint operations for one pass.
//!
//! Every pass records what it sends to the surface. The list can be checked
//! against the paint discipline with [`DisplayList::verify`] and replayed onto
//! any other [`Surface`].

use vellum_core::Rect;
use vellum_layout::Border;

use crate::clip::{text_width, ClipStack};
use crate::error::InvariantViolation;
use crate::style::Style;
use crate::surface::Surface;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayOp {
    /// Blank an area before repainting it
    Clear(Rect),
    /// `set_clip_region`
    PushClip(Rect),
    /// `reset_clip_region`
    PopClip,
    /// `fill_rect`
    FillRect {
        /// Filled area
        rect: Rect,
        /// Fill character
        fill: char,
        /// Cell style
        style: Style,
        /// Paint layer
        z: i32,
    },
    /// `write_text`
    WriteText {
        /// Start column
        x: u16,
        /// Row
        y: u16,
        /// Single-line text
        text: String,
        /// Cell style
        style: Style,
        /// Paint layer
        z: i32,
    },
    /// `draw_box`
    DrawBox {
        /// Box bounds
        rect: Rect,
        /// Border style
        style: Style,
        /// Sides and line kind
        border: Border,
        /// Paint layer
        z: i32,
    },
}

impl DisplayOp {
    /// Area covered by a draw. `None` for clip ops.
    #[must_use]
    pub fn area(&self) -> Option<Rect> {
        match self {
            Self::Clear(rect) | Self::FillRect { rect, .. } | Self::DrawBox { rect, .. } => {
                Some(*rect)
            }
            Self::WriteText { x, y, text, .. } => Some(Rect::new(*x, *y, text_width(text), 1)),
            Self::PushClip(_) | Self::PopClip => None,
        }
    }

    /// Paint layer of a draw. `None` for clears and clip ops.
    #[must_use]
    pub const fn z(&self) -> Option<i32> {
        match self {
            Self::FillRect { z, .. } | Self::WriteText { z, .. } | Self::DrawBox { z, .. } => {
                Some(*z)
            }
            Self::Clear(_) | Self::PushClip(_) | Self::PopClip => None,
        }
    }

    /// Check if this op paints cells.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.z().is_some()
    }
}

/// Ordered paint operations of one pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    screen: Rect,
    ops: Vec<DisplayOp>,
}

impl DisplayList {
    /// Create an empty list for a screen.
    #[must_use]
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            ops: Vec::new(),
        }
    }

    /// Append an op.
    pub fn push(&mut self, op: DisplayOp) {
        self.ops.push(op);
    }

    /// Recorded ops.
    #[must_use]
    pub fn ops(&self) -> &[DisplayOp] {
        &self.ops
    }

    /// Number of ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Screen the list was recorded for.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }

    /// Number of draws.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_draw()).count()
    }

    /// Number of clip pushes and pops.
    #[must_use]
    pub fn clip_counts(&self) -> (usize, usize) {
        self.ops.iter().fold((0, 0), |(push, pop), op| match op {
            DisplayOp::PushClip(_) => (push + 1, pop),
            DisplayOp::PopClip => (push, pop + 1),
            _ => (push, pop),
        })
    }

    /// Check the paint discipline.
    ///
    /// - every pop has a matching push and the stack ends empty
    /// - every draw lies inside the active clip
    /// - draw z never decreases
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let mut clip = ClipStack::new(self.screen);
        let mut highest: Option<i32> = None;

        for (op, entry) in self.ops.iter().enumerate() {
            match entry {
                DisplayOp::PushClip(rect) => {
                    clip.push(*rect);
                }
                DisplayOp::PopClip => {
                    if clip.pop().is_none() {
                        return Err(InvariantViolation::PopWithoutPush { op });
                    }
                }
                _ => {}
            }

            if let Some(rect) = entry.area() {
                let active = clip.current();
                if !rect.is_empty() && !active.contains_rect(&rect) {
                    return Err(InvariantViolation::ClipEscape {
                        op,
                        rect,
                        clip: active,
                    });
                }
            }

            if let Some(z) = entry.z() {
                if let Some(previous) = highest.filter(|&previous| z < previous) {
                    return Err(InvariantViolation::ZRegression {
                        op,
                        previous,
                        current: z,
                    });
                }
                highest = Some(z);
            }
        }

        if clip.is_empty() {
            Ok(())
        } else {
            Err(InvariantViolation::UnbalancedClip { depth: clip.depth() })
        }
    }

    /// Issue every op to `surface`.
    pub fn replay<S: Surface + ?Sized>(&self, surface: &mut S) {
        for op in &self.ops {
            match op {
                DisplayOp::Clear(rect) => surface.fill_rect(*rect, ' ', Style::default()),
                DisplayOp::PushClip(rect) => surface.set_clip_region(*rect),
                DisplayOp::PopClip => surface.reset_clip_region(),
                DisplayOp::FillRect {
                    rect, fill, style, ..
                } => surface.fill_rect(*rect, *fill, *style),
                DisplayOp::WriteText {
                    x, y, text, style, ..
                } => surface.write_text(*x, *y, text, *style),
                DisplayOp::DrawBox {
                    rect,
                    style,
                    border,
                    ..
                } => surface.draw_box(*rect, *style, border),
            }
        }
    }
}
