//! Layout engine implementation.
//!
//! Two passes per node: `measure` (bottom-up, memoized) computes the size a
//! node wants inside some available space; `arrange` (top-down) assigns every
//! node its absolute rectangle.

use std::ops::Range;

use tracing::trace;
use vellum_core::{Path, Rect, Size, VirtualNode};

use crate::cache::{CacheKey, LayoutCache};
use crate::flex::{break_lines, justify_offsets, resolve_flexible_lengths, FlexItem};
use crate::grid::{
    auto_place_items, compute_track_sizes, span_extent, tracks_length, GridItem, GridPlacement,
    TrackSize, Tracks,
};
use crate::style::{Align, BoxStyle, Display, Edges};
use crate::text::measure_text;

/// Computed geometry of one node.
///
/// The children mirror the virtual node's children one-to-one, so a [`Path`]
/// into the virtual tree addresses the same node here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutNode {
    /// Border box in absolute cells
    pub rect: Rect,
    /// Content box (inside border and padding)
    pub content: Rect,
    /// Child geometry, in virtual tree order
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            content: rect,
            children: Vec::new(),
        }
    }

    /// Union of this node's rect and all descendant rects.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.children
            .iter()
            .fold(self.rect, |acc, child| acc.union(&child.bounds()))
    }

    /// Resolve a path relative to this node.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }
}

/// Layout result for a whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTree {
    /// Viewport the tree was laid out in
    pub viewport: Size,
    /// Geometry of the root
    pub root: LayoutNode,
}

impl LayoutTree {
    /// Geometry of the node at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&LayoutNode> {
        self.root.get(path)
    }

    /// Rectangle of the node at `path`.
    #[must_use]
    pub fn rect(&self, path: &Path) -> Option<Rect> {
        self.get(path).map(|node| node.rect)
    }

    /// All `(path, rect)` pairs in pre-order.
    #[must_use]
    pub fn rects(&self) -> Vec<(Path, Rect)> {
        let mut out = Vec::new();
        let mut path = Path::root();
        collect_rects(&self.root, &mut path, &mut out);
        out
    }
}

fn collect_rects(node: &LayoutNode, path: &mut Path, out: &mut Vec<(Path, Rect)>) {
    out.push((path.clone(), node.rect));
    for (i, child) in node.children.iter().enumerate() {
        path.push(i);
        collect_rects(child, path, out);
        path.pop();
    }
}

/// Layout engine with per-pass measure memoization.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    cache: LayoutCache,
}

impl LayoutEngine {
    /// Create a new layout engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute layout for the tree within `viewport`.
    pub fn compute(&mut self, root: &VirtualNode, viewport: Size) -> LayoutTree {
        self.cache.clear();
        let bounds = Rect::from_size(viewport);

        let root_layout = match root {
            VirtualNode::Element(el) => {
                let style = BoxStyle::from_element(&el.tag, &el.props);
                let outer = inset(bounds, &style.margin);
                let width = style
                    .width
                    .resolve(viewport.width)
                    .unwrap_or(outer.width);
                let height = style
                    .height
                    .resolve(viewport.height)
                    .unwrap_or(outer.height);
                let rect = Rect::new(
                    outer.x,
                    outer.y,
                    style.clamp_width(width, viewport.width),
                    style.clamp_height(height, viewport.height),
                );
                self.arrange(root, rect)
            }
            VirtualNode::Text(text) => {
                let size = measure_text(text);
                let rect = Rect::new(
                    0,
                    0,
                    size.width.min(viewport.width),
                    size.height.min(viewport.height),
                );
                LayoutNode::leaf(rect)
            }
            VirtualNode::Clipping { .. } => self
                .arrange_children(&BoxStyle::default(), std::slice::from_ref(root), bounds)
                .pop()
                .unwrap_or_default(),
            VirtualNode::Fragment(_) => self.arrange(root, bounds),
            VirtualNode::Empty => LayoutNode::leaf(Rect::ZERO),
        };

        trace!(
            hits = self.cache.hits(),
            misses = self.cache.misses(),
            "layout pass complete"
        );

        LayoutTree {
            viewport,
            root: root_layout,
        }
    }

    /// Desired border-box size of `node` when offered `available` cells.
    ///
    /// `available` is the space for the node's margin box. Each call is its
    /// own pass: the cache is cleared first, since it is keyed on node
    /// addresses that a caller's earlier trees may have reused.
    pub fn measure(&mut self, node: &VirtualNode, available: Size) -> Size {
        self.cache.clear();
        self.measure_node(node, available)
    }

    fn measure_node(&mut self, node: &VirtualNode, available: Size) -> Size {
        let key = CacheKey::new(node, available);
        if let Some(size) = self.cache.get(key) {
            return size;
        }

        let size = match node {
            VirtualNode::Text(text) => measure_text(text),
            VirtualNode::Empty | VirtualNode::Clipping { .. } => Size::ZERO,
            VirtualNode::Fragment(children) => {
                let items = flow_items(children);
                self.measure_flex_content(&BoxStyle::default(), &items, available)
            }
            VirtualNode::Element(el) => {
                let style = BoxStyle::from_element(&el.tag, &el.props);
                self.measure_element(&style, &el.children, available)
            }
        };

        self.cache.insert(key, size);
        size
    }

    /// The measure cache, for statistics.
    #[must_use]
    pub const fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Clear the layout cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn measure_element(
        &mut self,
        style: &BoxStyle,
        children: &[VirtualNode],
        available: Size,
    ) -> Size {
        let chrome = style.chrome();
        let explicit_w = style.width.resolve(available.width);
        let explicit_h = style.height.resolve(available.height);

        let outer_w = explicit_w.unwrap_or(available.width.saturating_sub(style.margin.horizontal()));
        let outer_h =
            explicit_h.unwrap_or(available.height.saturating_sub(style.margin.vertical()));
        let inner = Size::new(
            outer_w.saturating_sub(chrome.horizontal()),
            outer_h.saturating_sub(chrome.vertical()),
        );

        let items = flow_items(children);
        let content = match style.display {
            Display::Flex => self.measure_flex_content(style, &items, inner),
            Display::Grid => {
                let (cols, rows, _) = self.grid_geometry(style, &items, inner);
                Size::new(tracks_length(&cols), tracks_length(&rows))
            }
        };

        let width = explicit_w.unwrap_or(content.width.saturating_add(chrome.horizontal()));
        let height = explicit_h.unwrap_or(content.height.saturating_add(chrome.vertical()));
        Size::new(
            style.clamp_width(width, available.width),
            style.clamp_height(height, available.height),
        )
    }

    fn measure_flex_content(
        &mut self,
        style: &BoxStyle,
        items: &[&VirtualNode],
        inner: Size,
    ) -> Size {
        if items.is_empty() {
            return Size::ZERO;
        }
        let row = style.direction.is_row();
        let main_avail = main_of(inner, row);
        let gap = style.main_gap();

        let mut outer_main = Vec::with_capacity(items.len());
        let mut outer_cross = Vec::with_capacity(items.len());
        for item in items {
            let item_style = item_style(item);
            let measured = self.measure_node(item, inner);
            let (m_main, m_cross) = margins(&item_style.margin, row);
            let flex = flex_item(&item_style, main_of(measured, row), main_avail, row, m_main);
            outer_main.push(flex.outer());
            outer_cross.push(u32::from(cross_of(measured, row)) + u32::from(m_cross));
        }

        let lines: Vec<Range<usize>> = if style.wrap {
            break_lines(&outer_main, main_avail, gap)
        } else {
            vec![0..items.len()]
        };

        let mut main: u32 = 0;
        let mut cross: u32 = 0;
        for (i, line) in lines.iter().enumerate() {
            let count = line.len() as u32;
            let line_main: u32 =
                outer_main[line.clone()].iter().sum::<u32>() + u32::from(gap) * (count - 1);
            let line_cross = outer_cross[line.clone()].iter().copied().max().unwrap_or(0);
            main = main.max(line_main);
            cross += line_cross;
            if i > 0 {
                cross += u32::from(style.cross_gap());
            }
        }

        if row {
            Size::new(cell(main), cell(cross))
        } else {
            Size::new(cell(cross), cell(main))
        }
    }

    fn arrange(&mut self, node: &VirtualNode, rect: Rect) -> LayoutNode {
        match node {
            VirtualNode::Element(el) => {
                let style = BoxStyle::from_element(&el.tag, &el.props);
                let content = inset(rect, &style.chrome());
                let children = self.arrange_children(&style, &el.children, content);
                LayoutNode {
                    rect,
                    content,
                    children,
                }
            }
            VirtualNode::Fragment(children) => {
                let children = self.arrange_children(&BoxStyle::default(), children, rect);
                let bounds = union_of(&children, rect);
                LayoutNode {
                    rect: bounds,
                    content: bounds,
                    children,
                }
            }
            VirtualNode::Clipping { children, .. } => {
                let children = self.arrange_children(&BoxStyle::default(), children, rect);
                LayoutNode {
                    rect,
                    content: rect,
                    children,
                }
            }
            VirtualNode::Text(_) | VirtualNode::Empty => LayoutNode::leaf(rect),
        }
    }

    fn arrange_children(
        &mut self,
        style: &BoxStyle,
        children: &[VirtualNode],
        content: Rect,
    ) -> Vec<LayoutNode> {
        let items = flow_items(children);
        let rects = match style.display {
            Display::Flex => self.flex_rects(style, &items, content),
            Display::Grid => self.grid_rects(style, &items, content),
        };
        let mut rects = rects.into_iter();
        self.build_children(children, content, &mut rects)
    }

    /// Pair every child with its geometry. Flow rects are consumed in order;
    /// fragments recurse with the same iterator.
    fn build_children(
        &mut self,
        children: &[VirtualNode],
        content: Rect,
        rects: &mut std::vec::IntoIter<Rect>,
    ) -> Vec<LayoutNode> {
        let origin = Rect::new(content.x, content.y, 0, 0);
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let layout = match child {
                VirtualNode::Fragment(inner) => {
                    let kids = self.build_children(inner, content, rects);
                    let bounds = union_of(&kids, origin);
                    LayoutNode {
                        rect: bounds,
                        content: bounds,
                        children: kids,
                    }
                }
                VirtualNode::Clipping { rect: clip, .. } => {
                    let placed = Rect::new(
                        content.x.saturating_add(clip.x),
                        content.y.saturating_add(clip.y),
                        clip.width,
                        clip.height,
                    );
                    self.arrange(child, placed)
                }
                VirtualNode::Empty => LayoutNode::leaf(origin),
                VirtualNode::Element(_) | VirtualNode::Text(_) => {
                    let rect = rects.next().unwrap_or(origin);
                    self.arrange(child, rect)
                }
            };
            out.push(layout);
        }
        out
    }

    fn flex_rects(&mut self, style: &BoxStyle, items: &[&VirtualNode], content: Rect) -> Vec<Rect> {
        if items.is_empty() {
            return Vec::new();
        }
        let row = style.direction.is_row();
        let available = content.size();
        let main_avail = main_of(available, row);
        let cross_avail = cross_of(available, row);
        let gap = style.main_gap();

        let styles: Vec<BoxStyle> = items.iter().map(|item| item_style(item)).collect();
        let mut flex_items = Vec::with_capacity(items.len());
        for (item, item_style) in items.iter().zip(&styles) {
            let measured = self.measure_node(item, available);
            let (m_main, _) = margins(&item_style.margin, row);
            flex_items.push(flex_item(item_style, main_of(measured, row), main_avail, row, m_main));
        }

        let lines: Vec<Range<usize>> = if style.wrap {
            let outer: Vec<u32> = flex_items.iter().map(FlexItem::outer).collect();
            break_lines(&outer, main_avail, gap)
        } else {
            vec![0..items.len()]
        };

        let mut rects = Vec::with_capacity(items.len());
        let mut line_start: u32 = 0;
        for line in lines {
            let sizes = resolve_flexible_lengths(&flex_items[line.clone()], main_avail, gap);

            // Cross size each item wants once its main size is known
            let mut wanted_cross = Vec::with_capacity(sizes.len());
            for (offset, &main) in sizes.iter().enumerate() {
                let i = line.start + offset;
                let (m_main, _) = margins(&styles[i].margin, row);
                let offered = if row {
                    Size::new(main.saturating_add(m_main), cross_avail)
                } else {
                    Size::new(cross_avail, main.saturating_add(m_main))
                };
                wanted_cross.push(cross_of(self.measure_node(items[i], offered), row));
            }

            let line_cross: u16 = if style.wrap {
                wanted_cross
                    .iter()
                    .enumerate()
                    .map(|(offset, &c)| {
                        let (_, m_cross) = margins(&styles[line.start + offset].margin, row);
                        c.saturating_add(m_cross)
                    })
                    .max()
                    .unwrap_or(0)
            } else {
                cross_avail
            };

            let outer_main: Vec<u16> = sizes
                .iter()
                .zip(&flex_items[line.clone()])
                .map(|(&s, f)| s.saturating_add(f.margin))
                .collect();
            let offsets = justify_offsets(&outer_main, main_avail, gap, style.justify);

            for (offset, (&main, &main_pos)) in sizes.iter().zip(&offsets).enumerate() {
                let i = line.start + offset;
                let item_style = &styles[i];
                let margin = &item_style.margin;
                let (main_start, cross_start) = if row {
                    (margin.left, margin.top)
                } else {
                    (margin.top, margin.left)
                };
                let (_, m_cross) = margins(margin, row);
                let room = line_cross.saturating_sub(m_cross);

                let align = item_style.align_self.unwrap_or(style.align_items);
                let explicit_cross = if row {
                    !item_style.height.is_auto()
                } else {
                    !item_style.width.is_auto()
                };
                let cross = if align == Align::Stretch && !explicit_cross {
                    if row {
                        item_style.clamp_height(room, cross_avail)
                    } else {
                        item_style.clamp_width(room, cross_avail)
                    }
                } else {
                    wanted_cross[offset]
                };
                let cross_pos = match align {
                    Align::Start | Align::Stretch => 0,
                    Align::Center => room.saturating_sub(cross) / 2,
                    Align::End => room.saturating_sub(cross),
                };

                let main_abs = u32::from(main_of_point(content, row))
                    + u32::from(main_pos)
                    + u32::from(main_start);
                let cross_abs = u32::from(cross_of_point(content, row))
                    + line_start
                    + u32::from(cross_start)
                    + u32::from(cross_pos);
                rects.push(oriented_rect(row, cell(main_abs), cell(cross_abs), main, cross));
            }

            line_start += u32::from(line_cross) + u32::from(style.cross_gap());
        }
        rects
    }

    fn grid_rects(&mut self, style: &BoxStyle, items: &[&VirtualNode], content: Rect) -> Vec<Rect> {
        let (cols, rows, placements) = self.grid_geometry(style, items, content.size());
        let mut rects = Vec::with_capacity(items.len());
        for (item, placement) in items.iter().zip(&placements) {
            let (x, w) = span_extent(&cols, placement.column, placement.column_span);
            let (y, h) = span_extent(&rows, placement.row, placement.row_span);
            let item_style = item_style(item);
            let cell_rect = inset(
                Rect::new(
                    content.x.saturating_add(x),
                    content.y.saturating_add(y),
                    w,
                    h,
                ),
                &item_style.margin,
            );

            let measured = self.measure_node(item, Size::new(w, h));
            let width = if item_style.width.is_auto() {
                cell_rect.width
            } else {
                measured.width.min(cell_rect.width)
            };
            let align = item_style.align_self.unwrap_or(style.align_items);
            let height = if align == Align::Stretch && item_style.height.is_auto() {
                cell_rect.height
            } else {
                measured.height.min(cell_rect.height)
            };
            let dy = match align {
                Align::Start | Align::Stretch => 0,
                Align::Center => (cell_rect.height - height) / 2,
                Align::End => cell_rect.height - height,
            };
            rects.push(Rect::new(cell_rect.x, cell_rect.y.saturating_add(dy), width, height));
        }
        rects
    }

    /// Track positions for both axes plus item placements.
    fn grid_geometry(
        &mut self,
        style: &BoxStyle,
        items: &[&VirtualNode],
        inner: Size,
    ) -> (Tracks, Tracks, Vec<GridPlacement>) {
        let col_templates = if style.grid_columns.is_empty() {
            vec![TrackSize::Fr(1.0)]
        } else {
            style.grid_columns.clone()
        };

        let styles: Vec<BoxStyle> = items.iter().map(|item| item_style(item)).collect();
        let grid_items: Vec<GridItem> = styles
            .iter()
            .map(|s| GridItem {
                row: s.grid_row,
                column: s.grid_column,
                row_span: s.grid_row_span,
                column_span: s.grid_column_span,
            })
            .collect();
        let placements = auto_place_items(col_templates.len(), &grid_items);

        let mut col_content = vec![0u16; col_templates.len()];
        for ((item, s), p) in items.iter().zip(&styles).zip(&placements) {
            if p.column_span == 1 {
                let w = self
                    .measure_node(item, inner)
                    .width
                    .saturating_add(s.margin.horizontal());
                col_content[p.column] = col_content[p.column].max(w);
            }
        }
        let cols = compute_track_sizes(&col_templates, inner.width, style.column_gap, &col_content);

        let row_count = placements
            .iter()
            .map(GridPlacement::row_end)
            .max()
            .unwrap_or(0)
            .max(style.grid_rows.len());
        let mut row_templates = style.grid_rows.clone();
        row_templates.resize(row_count, TrackSize::Auto);

        let mut row_content = vec![0u16; row_count];
        for ((item, s), p) in items.iter().zip(&styles).zip(&placements) {
            if p.row_span == 1 {
                let (_, w) = span_extent(&cols, p.column, p.column_span);
                let offered = Size::new(w, inner.height);
                let h = self
                    .measure_node(item, offered)
                    .height
                    .saturating_add(s.margin.vertical());
                row_content[p.row] = row_content[p.row].max(h);
            }
        }
        let rows = compute_track_sizes(&row_templates, inner.height, style.row_gap, &row_content);

        (cols, rows, placements)
    }
}

/// Convenience function to lay out a tree with a fresh engine.
#[must_use]
pub fn compute_layout(root: &VirtualNode, viewport: Size) -> LayoutTree {
    LayoutEngine::new().compute(root, viewport)
}

/// Children that take part in flow: fragments are flattened, clipping and
/// empty nodes take no slot.
fn flow_items(children: &[VirtualNode]) -> Vec<&VirtualNode> {
    fn collect<'a>(children: &'a [VirtualNode], out: &mut Vec<&'a VirtualNode>) {
        for child in children {
            match child {
                VirtualNode::Fragment(inner) => collect(inner, out),
                VirtualNode::Clipping { .. } | VirtualNode::Empty => {}
                VirtualNode::Element(_) | VirtualNode::Text(_) => out.push(child),
            }
        }
    }
    let mut out = Vec::new();
    collect(children, &mut out);
    out
}

fn item_style(node: &VirtualNode) -> BoxStyle {
    match node {
        VirtualNode::Element(el) => BoxStyle::from_element(&el.tag, &el.props),
        _ => BoxStyle::default(),
    }
}

fn flex_item(style: &BoxStyle, measured_main: u16, main_avail: u16, row: bool, margin: u16) -> FlexItem {
    let (basis, min, max) = if row {
        (style.flex_basis, style.min_width, style.max_width)
    } else {
        (style.flex_basis, style.min_height, style.max_height)
    };
    FlexItem {
        basis: basis.resolve(main_avail).unwrap_or(measured_main),
        min: min.resolve(main_avail).unwrap_or(0),
        max: max.resolve(main_avail).unwrap_or(u16::MAX),
        margin,
        grow: style.flex_grow,
        shrink: style.flex_shrink,
    }
}

/// Total margin along the main and cross axes.
fn margins(margin: &Edges, row: bool) -> (u16, u16) {
    if row {
        (margin.horizontal(), margin.vertical())
    } else {
        (margin.vertical(), margin.horizontal())
    }
}

fn inset(rect: Rect, edges: &Edges) -> Rect {
    rect.inset(edges.top, edges.right, edges.bottom, edges.left)
}

fn union_of(children: &[LayoutNode], start: Rect) -> Rect {
    children.iter().fold(start, |acc, child| acc.union(&child.rect))
}

const fn main_of(size: Size, row: bool) -> u16 {
    if row {
        size.width
    } else {
        size.height
    }
}

const fn cross_of(size: Size, row: bool) -> u16 {
    if row {
        size.height
    } else {
        size.width
    }
}

const fn main_of_point(rect: Rect, row: bool) -> u16 {
    if row {
        rect.x
    } else {
        rect.y
    }
}

const fn cross_of_point(rect: Rect, row: bool) -> u16 {
    if row {
        rect.y
    } else {
        rect.x
    }
}

const fn oriented_rect(row: bool, main_pos: u16, cross_pos: u16, main: u16, cross: u16) -> Rect {
    if row {
        Rect::new(main_pos, cross_pos, main, cross)
    } else {
        Rect::new(cross_pos, main_pos, cross, main)
    }
}

fn cell(v: u32) -> u16 {
    v.min(u32::from(u16::MAX)) as u16
}
