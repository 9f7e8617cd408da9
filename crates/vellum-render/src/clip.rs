//! Clip stack and clip-aware trimming of paint primitives.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;
use vellum_core::Rect;
use vellum_layout::Border;

use crate::border::{box_runs, TextRun};

/// Stack of clip frames. The active clip is the intersection of every frame
/// with the screen, so a push can only shrink the visible area.
#[derive(Debug, Clone)]
pub struct ClipStack {
    screen: Rect,
    frames: Vec<Rect>,
}

impl ClipStack {
    /// Create an empty stack over `screen`.
    #[must_use]
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            frames: Vec::new(),
        }
    }

    /// The active clip.
    #[must_use]
    pub fn current(&self) -> Rect {
        self.frames.last().copied().unwrap_or(self.screen)
    }

    /// Push `rect`, returning the new active clip.
    pub fn push(&mut self, rect: Rect) -> Rect {
        let next = self.current().clip_to(&rect);
        self.frames.push(next);
        next
    }

    /// Pop the top frame. `None` when the stack is already empty.
    pub fn pop(&mut self) -> Option<Rect> {
        self.frames.pop()
    }

    /// Number of pushed frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if no frame is pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Screen bounds.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }
}

/// Display width of `text` in cells.
#[must_use]
pub fn text_width(text: &str) -> u16 {
    text.width().min(usize::from(u16::MAX)) as u16
}

/// Trim a single-line text run to `clip`.
///
/// Graphemes that do not lie entirely inside the clip are dropped, so a wide
/// character straddling an edge disappears rather than being split. Returns
/// the surviving run with its new start column, or `None` if nothing is
/// visible.
///
/// ```
/// use vellum_core::Rect;
/// use vellum_render::truncate_text;
///
/// let run = truncate_text("Hello World", 8, 0, Rect::new(0, 0, 10, 5)).unwrap();
/// assert_eq!((run.x, run.text.as_str()), (8, "He"));
/// ```
#[must_use]
pub fn truncate_text(text: &str, x: u16, y: u16, clip: Rect) -> Option<TextRun> {
    if clip.is_empty() || y < clip.y || y >= clip.bottom() {
        return None;
    }
    let left = u32::from(clip.x);
    let right = u32::from(clip.right());

    let mut column = u32::from(x);
    let mut start = None;
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        let width = grapheme.width() as u32;
        if width == 0 {
            continue;
        }
        let from = column;
        column += width;
        if from < left {
            continue;
        }
        if column > right {
            break;
        }
        start.get_or_insert(from);
        out.push_str(grapheme);
    }
    start.map(|s| TextRun::new(s as u16, y, out))
}

/// How a box is painted under a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxPaint {
    /// The box lies inside the clip and is drawn as a whole
    Whole,
    /// The box crosses the clip; only these trimmed border runs are visible
    Runs(Vec<TextRun>),
}

/// Clamp a box outline to `clip`.
#[must_use]
pub fn clip_box(rect: Rect, border: &Border, clip: Rect) -> BoxPaint {
    if clip.contains_rect(&rect) {
        return BoxPaint::Whole;
    }
    let runs = box_runs(rect, border)
        .into_iter()
        .filter_map(|run| truncate_text(&run.text, run.x, run.y, clip))
        .collect();
    BoxPaint::Runs(runs)
}
