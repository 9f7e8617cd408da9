//! Text measurement in terminal cells.

use unicode_width::UnicodeWidthStr;
use vellum_core::Size;

/// Lines of a text node. A trailing `\r` on a line is dropped.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Display width of one line.
#[must_use]
pub fn line_width(line: &str) -> u16 {
    line.width().min(usize::from(u16::MAX)) as u16
}

/// Size of a text node: widest line by display width, and the line count.
///
/// Empty text measures zero in both directions.
#[must_use]
pub fn measure_text(text: &str) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }
    let (width, height) = lines(text).fold((0u16, 0u16), |(w, h), line| {
        (w.max(line_width(line)), h.saturating_add(1))
    });
    Size::new(width, height)
}
