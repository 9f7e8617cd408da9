//! The rendering pipeline.
//!
//! A [`Renderer`] owns a [`Surface`], the current virtual tree, its layout
//! and the element arena. A full render lays out and paints everything.
//! Patch batches are applied to the stored tree, mirrored onto the arena,
//! laid out once, and repainted only where something changed:
//!
//! 1. each patch marks the bounds it invalidates in the old frame
//! 2. after the relayout, every element whose rect moved marks its old and
//!    new rect, and every touched element marks its new bounds
//! 3. the marks are merged into regions; each region is cleared and every
//!    paint item crossing it is repainted, clipped to the region
//!
//! Too many regions, or too much dirty area, falls back to a full repaint.

use tracing::{debug, trace, warn};
use vellum_core::{apply_patch_mut, diff_trees, NodeKind, Patch, Rect, VirtualNode};
use vellum_layout::{LayoutEngine, LayoutTree};

use crate::config::RenderConfig;
use crate::dirty::{exceeds_budget, DirtyTracker};
use crate::display_list::DisplayList;
use crate::element::{ElementArena, ElementId, RenderedElement};
use crate::error::{RenderError, StructuralError};
use crate::paint::{collect, widen_regions, PaintItem, Painter};
use crate::surface::Surface;

/// How much of the screen a pass repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// Nothing visible changed
    None,
    /// Only the dirty regions were repainted
    Partial,
    /// The whole screen was repainted
    Full,
}

/// Result of applying a patch batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// Patches applied
    pub applied: usize,
    /// Patches that did not fit the tree, in batch order
    pub skipped: Vec<StructuralError>,
    /// Repaint performed
    pub repaint: Repaint,
    /// Merged dirty regions (the whole screen for a full repaint)
    pub regions: Vec<Rect>,
}

impl PatchOutcome {
    fn unchanged(skipped: Vec<StructuralError>) -> Self {
        Self {
            applied: 0,
            skipped,
            repaint: Repaint::None,
            regions: Vec::new(),
        }
    }
}

/// Renders virtual trees onto a surface.
#[derive(Debug)]
pub struct Renderer<S: Surface> {
    surface: S,
    config: RenderConfig,
    engine: LayoutEngine,
    tree: Option<VirtualNode>,
    layout: LayoutTree,
    arena: ElementArena,
    last: DisplayList,
}

impl<S: Surface> Renderer<S> {
    /// Create a renderer with the default configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, RenderConfig::default())
    }

    /// Create a renderer with a custom configuration.
    pub fn with_config(surface: S, config: RenderConfig) -> Self {
        let screen = surface.bounds();
        Self {
            surface,
            config,
            engine: LayoutEngine::new(),
            tree: None,
            layout: LayoutTree::default(),
            arena: ElementArena::new(),
            last: DisplayList::new(screen),
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface, mutably. A change of surface size is picked up by the
    /// next pass, which then repaints fully.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Consume the renderer and return its surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The tree as last rendered.
    pub const fn virtual_tree(&self) -> Option<&VirtualNode> {
        self.tree.as_ref()
    }

    /// Layout of the tree as last rendered.
    pub const fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    /// Rendered elements.
    pub const fn elements(&self) -> &ElementArena {
        &self.arena
    }

    /// Display list of the last pass.
    pub const fn last_display_list(&self) -> &DisplayList {
        &self.last
    }

    /// Replace the current tree and repaint the whole screen.
    pub fn render_full(&mut self, tree: VirtualNode) -> Result<(), RenderError> {
        self.arena.build(&tree);
        self.tree = Some(tree);
        self.repaint_full()
    }

    /// Diff `tree` against the current one and apply the result.
    ///
    /// Without a current tree this is a full render.
    pub fn update(&mut self, tree: VirtualNode) -> Result<PatchOutcome, RenderError> {
        let Some(current) = &self.tree else {
            self.render_full(tree)?;
            return Ok(self.full_outcome(0, Vec::new()));
        };
        let patches = diff_trees(current, &tree);
        trace!(patches = patches.len(), "diffed update");
        self.apply_patches(patches.as_slice())
    }

    /// Apply a patch batch to the current tree and repaint what changed.
    ///
    /// Patches apply in order. A patch that does not fit the tree is skipped
    /// and reported in the outcome; the rest of the batch still applies.
    pub fn apply_patches(&mut self, patches: &[Patch]) -> Result<PatchOutcome, RenderError> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(RenderError::NotRendered);
        };

        let screen = self.surface.bounds();
        let mut dirty = DirtyTracker::new(screen);
        let mut affected: Vec<ElementId> = Vec::new();
        let mut skipped = Vec::new();
        let mut applied = 0;
        let mut rebuild = false;

        for (index, patch) in patches.iter().enumerate() {
            if let Err(source) = apply_patch_mut(tree, patch) {
                let error = StructuralError {
                    index,
                    patch: patch.name(),
                    source,
                };
                warn!(%error, "skipping patch");
                skipped.push(error);
                continue;
            }
            applied += 1;
            if rebuild {
                continue;
            }
            match self.arena.apply(patch) {
                Some(effect) => {
                    for rect in effect.old_bounds {
                        dirty.mark(rect);
                    }
                    affected.extend(effect.affected);
                }
                None => rebuild = true,
            }
        }

        let resized = screen.size() != self.layout.viewport;
        if applied == 0 && !resized {
            return Ok(PatchOutcome::unchanged(skipped));
        }
        if rebuild || resized {
            debug!(rebuild, resized, "element tree out of step with screen, repainting");
            self.arena.build(tree);
            self.repaint_full()?;
            return Ok(self.full_outcome(applied, skipped));
        }

        self.layout = self.engine.compute(tree, screen.size());
        self.arena.sync(&self.layout, &mut |old, new| {
            dirty.mark(old);
            dirty.mark(new);
        });
        for id in affected {
            dirty.mark(self.arena.subtree_bounds(id));
        }

        let items = collect(&self.arena);
        let regions = widen_regions(dirty.merged(), &items);
        if regions.is_empty() {
            debug!(applied, "patches changed nothing visible");
            self.last = DisplayList::new(screen);
            return Ok(PatchOutcome {
                applied,
                skipped,
                repaint: Repaint::None,
                regions,
            });
        }
        if exceeds_budget(
            &regions,
            screen,
            self.config.max_dirty_regions,
            self.config.full_repaint_ratio,
        ) {
            debug!(regions = regions.len(), "dirty area over budget, repainting");
            self.paint_full()?;
            return Ok(self.full_outcome(applied, skipped));
        }

        self.paint_regions(&regions, &items)?;
        Ok(PatchOutcome {
            applied,
            skipped,
            repaint: Repaint::Partial,
            regions,
        })
    }

    /// Topmost element painted at `(x, y)`.
    ///
    /// Structural nodes never match; of the elements whose visible area
    /// contains the cell, the one painted last wins. Clipping subtrees that
    /// miss the cell are skipped whole.
    pub fn element_at(&self, x: u16, y: u16) -> Option<&RenderedElement> {
        let mut best: Option<(i32, usize, &RenderedElement)> = None;
        let mut stack: Vec<ElementId> = self.arena.root().into_iter().collect();
        let mut order = 0;
        while let Some(id) = stack.pop() {
            let Some(el) = self.arena.get(id) else {
                continue;
            };
            order += 1;
            let hit = el.clip.contains(x, y);
            match el.kind() {
                NodeKind::Element | NodeKind::Text if hit => {
                    if best.map_or(true, |(z, o, _)| (el.z, order) > (z, o)) {
                        best = Some((el.z, order, el));
                    }
                }
                // Descendants never paint outside a clipping node
                NodeKind::Clipping if !hit => continue,
                _ => {}
            }
            stack.extend(el.children.iter().rev());
        }
        best.map(|(_, _, el)| el)
    }

    fn full_outcome(&self, applied: usize, skipped: Vec<StructuralError>) -> PatchOutcome {
        PatchOutcome {
            applied,
            skipped,
            repaint: Repaint::Full,
            regions: vec![self.last.screen()],
        }
    }

    /// Lay out the current tree from scratch and paint everything.
    fn repaint_full(&mut self) -> Result<(), RenderError> {
        let Some(tree) = &self.tree else {
            return Err(RenderError::NotRendered);
        };
        let screen = self.surface.bounds();
        self.layout = self.engine.compute(tree, screen.size());
        self.arena.sync(&self.layout, &mut |_, _| {});
        self.paint_full()
    }

    fn paint_full(&mut self) -> Result<(), RenderError> {
        let screen = self.surface.bounds();
        let items = collect(&self.arena);
        let mut list = DisplayList::new(screen);
        {
            let mut painter = Painter::new(&mut list);
            painter.clear(screen);
            for item in &items {
                painter.paint(item);
            }
        }
        debug!(
            elements = self.arena.len(),
            items = items.len(),
            ops = list.len(),
            "full render"
        );
        self.commit(list)
    }

    fn paint_regions(&mut self, regions: &[Rect], items: &[PaintItem]) -> Result<(), RenderError> {
        let screen = self.surface.bounds();
        let mut list = DisplayList::new(screen);
        let mut repainted = 0;
        {
            let mut painter = Painter::new(&mut list);
            for region in regions {
                painter.clear(*region);
            }
            for item in items {
                for region in regions.iter().filter(|r| r.intersects(&item.clip)) {
                    painter.push_clip(*region);
                    painter.paint(item);
                    painter.pop_clip();
                    repainted += 1;
                }
            }
        }
        debug!(
            regions = regions.len(),
            repainted,
            ops = list.len(),
            "incremental render"
        );
        self.commit(list)
    }

    /// Check a finished list and send it to the surface.
    fn commit(&mut self, list: DisplayList) -> Result<(), RenderError> {
        if self.config.verify_display_list {
            list.verify()?;
        } else {
            debug_assert!(list.verify().is_ok(), "display list breaks paint discipline");
        }
        list.replay(&mut self.surface);
        self.last = list;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_buffer::CellBuffer;
    use crate::display_list::DisplayOp;
    use vellum_core::Path;

    fn renderer() -> Renderer<CellBuffer> {
        Renderer::with_config(CellBuffer::new(20, 5), RenderConfig::precise())
    }

    fn panel(label: &str) -> VirtualNode {
        VirtualNode::element("column")
            .with_child(VirtualNode::text("title"))
            .with_child(VirtualNode::text(label))
    }

    // =========================================================================
    // Full Render Tests
    // =========================================================================

    #[test]
    fn test_render_full_paints_text() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        assert_eq!(r.surface().row_text(0).trim_end(), "title");
        assert_eq!(r.surface().row_text(1).trim_end(), "body");
        assert_eq!(r.last_display_list().ops()[0], DisplayOp::Clear(Rect::new(0, 0, 20, 5)));
    }

    #[test]
    fn test_apply_before_render() {
        let mut r = renderer();
        assert_eq!(r.apply_patches(&[]), Err(RenderError::NotRendered));
    }

    #[test]
    fn test_update_without_tree_renders_full() {
        let mut r = renderer();
        let outcome = r.update(panel("body")).unwrap();
        assert_eq!(outcome.repaint, Repaint::Full);
        assert_eq!(r.virtual_tree(), Some(&panel("body")));
    }

    // =========================================================================
    // Incremental Tests
    // =========================================================================

    #[test]
    fn test_text_change_repaints_one_row() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        let outcome = r.update(panel("next")).unwrap();
        assert_eq!(outcome.repaint, Repaint::Partial);
        assert_eq!(outcome.regions, vec![Rect::new(0, 1, 20, 1)]);
        assert_eq!(r.surface().row_text(1).trim_end(), "next");
        assert_eq!(r.surface().row_text(0).trim_end(), "title");
    }

    #[test]
    fn test_identical_update_repaints_nothing() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        let outcome = r.update(panel("body")).unwrap();
        assert_eq!(outcome.repaint, Repaint::None);
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_bad_patch_skipped() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        let outcome = r
            .apply_patches(&[
                Patch::Remove {
                    path: Path::root(),
                    index: 7,
                },
                Patch::UpdateText {
                    path: Path::from([1]),
                    text: "ok".into(),
                },
            ])
            .unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 0);
        assert_eq!(r.surface().row_text(1).trim_end(), "ok");
    }

    #[test]
    fn test_budget_forces_full_repaint() {
        let mut r = Renderer::with_config(CellBuffer::new(20, 5), RenderConfig::always_full());
        r.render_full(panel("body")).unwrap();
        let outcome = r.update(panel("next")).unwrap();
        assert_eq!(outcome.repaint, Repaint::Full);
        assert_eq!(outcome.regions, vec![Rect::new(0, 0, 20, 5)]);
    }

    #[test]
    fn test_resize_forces_full_repaint() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        r.surface_mut().resize(30, 6);
        let outcome = r.update(panel("next")).unwrap();
        assert_eq!(outcome.repaint, Repaint::Full);
        assert_eq!(r.layout().viewport.width, 30);
    }

    #[test]
    fn test_resize_detected_without_tree_changes() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        r.surface_mut().resize(30, 6);
        let outcome = r.update(panel("body")).unwrap();
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.repaint, Repaint::Full);
        assert_eq!(outcome.regions, vec![Rect::new(0, 0, 30, 6)]);
        assert_eq!(r.layout().viewport.width, 30);
        assert_eq!(r.surface().row_text(0).trim_end(), "title");
        assert_eq!(r.surface().row_text(1).trim_end(), "body");
    }

    #[test]
    fn test_resize_detected_with_empty_batch() {
        let mut r = renderer();
        r.render_full(panel("body")).unwrap();
        r.surface_mut().resize(12, 3);
        let outcome = r.apply_patches(&[]).unwrap();
        assert_eq!(outcome.repaint, Repaint::Full);
        assert_eq!(r.layout().viewport.height, 3);
        let again = r.apply_patches(&[]).unwrap();
        assert_eq!(again.repaint, Repaint::None);
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    #[test]
    fn test_element_at_skips_clipped_subtree() {
        let tree = VirtualNode::element("box")
            .with_child(VirtualNode::element("box").with_prop("height", 3))
            .with_child(VirtualNode::clipping(
                Rect::new(0, 0, 2, 1),
                vec![VirtualNode::element("box")
                    .with_prop("z-index", 5)
                    .with_prop("height", 3)],
            ));
        let mut r = renderer();
        r.render_full(tree).unwrap();
        assert!(r.element_at(5, 1).is_some_and(|el| el.path == Path::from([0])));
        assert!(r.element_at(1, 0).is_some_and(|el| el.path == Path::from([1, 0])));
        assert!(r.element_at(25, 0).is_none());
    }

    #[test]
    fn test_element_at_prefers_higher_layer() {
        let tree = VirtualNode::element("box")
            .with_child(VirtualNode::element("box").with_prop("height", 2))
            .with_child(VirtualNode::clipping(
                Rect::new(0, 0, 5, 1),
                vec![VirtualNode::element("box")
                    .with_prop("z-index", 1)
                    .with_prop("height", 1)],
            ));
        let mut r = renderer();
        r.render_full(tree).unwrap();
        let hit = r.element_at(1, 0).unwrap();
        assert_eq!(hit.path, Path::from([1, 0]));
        assert!(r.element_at(19, 4).is_some_and(|el| el.path.is_root()));
    }
}
