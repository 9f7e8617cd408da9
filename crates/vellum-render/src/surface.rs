//! The terminal surface contract.

use vellum_core::Rect;
use vellum_layout::Border;

use crate::style::Style;

/// Cell-level paint primitives provided by a terminal backend.
///
/// Coordinates are absolute cells. Clip regions nest:
/// [`set_clip_region`](Surface::set_clip_region) pushes a region that is
/// intersected with the current one and
/// [`reset_clip_region`](Surface::reset_clip_region) restores the previous.
/// The renderer never issues a draw outside the active region, but a surface
/// may still discard cells that fall outside it.
pub trait Surface {
    /// Width in cells.
    fn width(&self) -> u16;

    /// Height in cells.
    fn height(&self) -> u16;

    /// Write one line of text starting at `(x, y)`.
    fn write_text(&mut self, x: u16, y: u16, text: &str, style: Style);

    /// Fill `rect` with `fill` in `style`.
    fn fill_rect(&mut self, rect: Rect, fill: char, style: Style);

    /// Draw a box outline along the edge of `rect`.
    fn draw_box(&mut self, rect: Rect, style: Style, border: &Border);

    /// Push a clip region.
    fn set_clip_region(&mut self, rect: Rect);

    /// Pop the most recent clip region.
    fn reset_clip_region(&mut self);

    /// Screen bounds.
    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }
}
