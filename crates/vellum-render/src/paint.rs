//! Paint items and their emission into a display list.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use vellum_core::{NodeData, Rect, Value};
use vellum_layout::{lines, Border};

use crate::clip::{clip_box, truncate_text, BoxPaint, ClipStack};
use crate::dirty::merge_regions;
use crate::display_list::{DisplayList, DisplayOp};
use crate::element::{ElementArena, ElementId};
use crate::style::Style;

/// What one paint item draws.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Draw {
    Fill { rect: Rect, fill: char, style: Style },
    Box { rect: Rect, style: Style, border: Border },
    Text { x: u16, y: u16, text: String, style: Style },
}

impl Draw {
    /// Shapes paint before text at the same layer.
    const fn rank(&self) -> u8 {
        match self {
            Self::Fill { .. } | Self::Box { .. } => 0,
            Self::Text { .. } => 1,
        }
    }
}

/// A draw with its ordering key and the area it may touch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PaintItem {
    pub(crate) z: i32,
    pub(crate) order: usize,
    pub(crate) clip: Rect,
    pub(crate) draw: Draw,
}

impl PaintItem {
    fn key(&self) -> (i32, u8, usize) {
        (self.z, self.draw.rank(), self.order)
    }
}

/// Collect the paint items of every element, in paint order.
///
/// Items sort by layer, then shapes before text, then tree order.
pub(crate) fn collect(arena: &ElementArena) -> Vec<PaintItem> {
    let mut items = Vec::new();
    for (order, id) in arena.preorder().into_iter().enumerate() {
        element_items(arena, id, order, &mut items);
    }
    items.sort_by_key(PaintItem::key);
    items
}

fn element_items(arena: &ElementArena, id: ElementId, order: usize, out: &mut Vec<PaintItem>) {
    let Some(el) = arena.get(id) else {
        return;
    };
    if el.clip.is_empty() {
        return;
    }
    let item = |draw| PaintItem {
        z: el.z,
        order,
        clip: el.clip,
        draw,
    };

    match &el.data {
        NodeData::Element { props, .. } => {
            let fill = props.get("fill").and_then(Value::as_str);
            if fill.is_some() || props.contains_key("background") {
                out.push(item(Draw::Fill {
                    rect: el.rect,
                    fill: fill.and_then(|s| s.chars().next()).unwrap_or(' '),
                    style: el.style,
                }));
            }
            let border = Border::from_props(props);
            if border.is_visible() {
                out.push(item(Draw::Box {
                    rect: el.rect,
                    style: el.style.border(props),
                    border,
                }));
            }
        }
        NodeData::Text(text) => {
            for (i, line) in lines(text).enumerate() {
                let Ok(offset) = u16::try_from(i) else {
                    break;
                };
                if line.is_empty() {
                    continue;
                }
                out.push(item(Draw::Text {
                    x: el.rect.x,
                    y: el.rect.y.saturating_add(offset),
                    text: line.to_string(),
                    style: el.style,
                }));
            }
        }
        NodeData::Fragment | NodeData::Clipping(_) | NodeData::Empty => {}
    }
}

/// Widen `regions` until no edge cuts through a double-width glyph.
///
/// Clearing one cell of a wide glyph blanks its other cell, and a clipped
/// repaint drops any glyph crossing the clip, so a split glyph would vanish.
pub(crate) fn widen_regions(regions: Vec<Rect>, items: &[PaintItem]) -> Vec<Rect> {
    let mut regions = regions;
    loop {
        let mut changed = false;
        for region in &mut regions {
            for item in items {
                let wider = widen_for(*region, item);
                if wider != *region {
                    *region = wider;
                    changed = true;
                }
            }
        }
        if !changed {
            return regions;
        }
        regions = merge_regions(&regions);
    }
}

fn widen_for(region: Rect, item: &PaintItem) -> Rect {
    if !item.clip.intersects(&region) {
        return region;
    }
    let mut left = region.x;
    let mut right = region.right();
    match &item.draw {
        Draw::Text { x, y, text, .. } => {
            if *y < region.y || *y >= region.bottom() {
                return region;
            }
            let (clip_left, clip_right) = (u32::from(item.clip.x), u32::from(item.clip.right()));
            let mut column = u32::from(*x);
            for grapheme in text.graphemes(true) {
                let width = grapheme.width() as u32;
                let from = column;
                column += width;
                // Glyphs outside the item's own clip are never drawn
                if width < 2 || from < clip_left || column > clip_right {
                    continue;
                }
                let (from, to) = (from as u16, column as u16);
                if from < left && to > left {
                    left = from;
                }
                if from < right && to > right {
                    right = to;
                }
            }
        }
        // Wide fills tile from the left edge of their visible area
        Draw::Fill { rect, fill, .. } if fill.width().unwrap_or(0) >= 2 => {
            let Some(area) = rect.intersection(&item.clip) else {
                return region;
            };
            if !area.intersects(&region) {
                return region;
            }
            left = left.min(area.x);
            right = right.max(area.right());
        }
        Draw::Fill { .. } | Draw::Box { .. } => return region,
    }
    Rect::new(left, region.y, right - left, region.height)
}

/// Records draws into a display list, clamping each to the active clip.
pub(crate) struct Painter<'a> {
    list: &'a mut DisplayList,
    clip: ClipStack,
}

impl<'a> Painter<'a> {
    pub(crate) fn new(list: &'a mut DisplayList) -> Self {
        let clip = ClipStack::new(list.screen());
        Self { list, clip }
    }

    pub(crate) fn clear(&mut self, rect: Rect) {
        self.list.push(DisplayOp::Clear(rect));
    }

    pub(crate) fn push_clip(&mut self, rect: Rect) {
        self.clip.push(rect);
        self.list.push(DisplayOp::PushClip(rect));
    }

    pub(crate) fn pop_clip(&mut self) {
        if self.clip.pop().is_some() {
            self.list.push(DisplayOp::PopClip);
        }
    }

    /// Paint one item inside its own clip.
    pub(crate) fn paint(&mut self, item: &PaintItem) {
        self.push_clip(item.clip);
        self.draw(item);
        self.pop_clip();
    }

    fn draw(&mut self, item: &PaintItem) {
        let active = self.clip.current();
        let z = item.z;
        match &item.draw {
            Draw::Fill { rect, fill, style } => {
                if let Some(visible) = rect.intersection(&active) {
                    self.list.push(DisplayOp::FillRect {
                        rect: visible,
                        fill: *fill,
                        style: *style,
                        z,
                    });
                }
            }
            Draw::Text { x, y, text, style } => {
                if let Some(run) = truncate_text(text, *x, *y, active) {
                    self.list.push(DisplayOp::WriteText {
                        x: run.x,
                        y: run.y,
                        text: run.text,
                        style: *style,
                        z,
                    });
                }
            }
            Draw::Box {
                rect,
                style,
                border,
            } => match clip_box(*rect, border, active) {
                BoxPaint::Whole => self.list.push(DisplayOp::DrawBox {
                    rect: *rect,
                    style: *style,
                    border: *border,
                    z,
                }),
                BoxPaint::Runs(runs) => {
                    for run in runs {
                        self.list.push(DisplayOp::WriteText {
                            x: run.x,
                            y: run.y,
                            text: run.text,
                            style: *style,
                            z,
                        });
                    }
                }
            },
        }
    }
}
