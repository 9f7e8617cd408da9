//! Renderer-owned mirror of the virtual tree.
//!
//! Each virtual node has one [`RenderedElement`] in an [`ElementArena`],
//! addressed by a stable [`ElementId`]. Patches are mirrored onto the arena
//! as they are applied to the virtual tree, so element handles survive
//! across updates and an element's previous rectangle is still known when
//! the new layout arrives.

use std::collections::HashMap;

use vellum_core::{
    apply_moves, merge_props, NodeData, NodeKind, Patch, Path, Rect, Value, VirtualNode,
};
use vellum_layout::{LayoutNode, LayoutTree};

use crate::style::Style;

/// Stable handle of a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Slot index in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One node as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    /// The node's own data; children are held as handles
    pub data: NodeData,
    /// Address in the current tree
    pub path: Path,
    /// Absolute rectangle from the last layout
    pub rect: Rect,
    /// Resolved paint layer: `max(own z-index, parent's resolved z)`
    pub z: i32,
    /// Style inherited down the tree
    pub style: Style,
    /// Area this element may paint: its rect inside every clipping ancestor
    pub clip: Rect,
    /// Parent handle
    pub parent: Option<ElementId>,
    /// Ordered child handles
    pub children: Vec<ElementId>,
}

impl RenderedElement {
    fn new(data: NodeData, parent: Option<ElementId>) -> Self {
        Self {
            data,
            path: Path::root(),
            rect: Rect::ZERO,
            z: 0,
            style: Style::default(),
            clip: Rect::ZERO,
            parent,
            children: Vec::new(),
        }
    }

    /// Kind of the underlying node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// What mirroring one patch onto the arena touched.
#[derive(Debug, Default)]
pub(crate) struct PatchEffect {
    /// Bounds painted by the previous frame that the patch invalidates
    pub(crate) old_bounds: Vec<Rect>,
    /// Elements whose new bounds must be repainted after layout
    pub(crate) affected: Vec<ElementId>,
}

/// Arena of rendered elements with a path index.
#[derive(Debug, Default)]
pub struct ElementArena {
    slots: Vec<Option<RenderedElement>>,
    free: Vec<usize>,
    root: Option<ElementId>,
    index: HashMap<Path, ElementId>,
}

impl ElementArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Check if the arena holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root element.
    #[must_use]
    pub const fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Get an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&RenderedElement> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut RenderedElement> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Element at `path`, from the index built by the last layout sync.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<ElementId> {
        self.index.get(path).copied()
    }

    /// Walk child handles from the root. Unlike [`lookup`](Self::lookup)
    /// this follows structural patches immediately.
    fn resolve(&self, path: &Path) -> Option<ElementId> {
        path.segments().iter().try_fold(self.root?, |id, &i| {
            self.get(id).and_then(|el| el.children.get(i).copied())
        })
    }

    /// Handles in pre-order (parents before children, siblings in order).
    #[must_use]
    pub fn preorder(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<ElementId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.get(id) {
                stack.extend(el.children.iter().rev());
            }
        }
        out
    }

    /// Union of the rects of `id` and all its descendants.
    #[must_use]
    pub fn subtree_bounds(&self, id: ElementId) -> Rect {
        let Some(el) = self.get(id) else {
            return Rect::ZERO;
        };
        el.children
            .iter()
            .fold(el.rect, |acc, &child| acc.union(&self.subtree_bounds(child)))
    }

    /// Drop everything and mirror `tree`. Rects stay empty until the next
    /// [`sync`](Self::sync).
    pub fn build(&mut self, tree: &VirtualNode) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.root = Some(self.insert_subtree(tree, None));
    }

    fn alloc(&mut self, element: RenderedElement) -> ElementId {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(element);
            ElementId(slot)
        } else {
            self.slots.push(Some(element));
            ElementId(self.slots.len() - 1)
        }
    }

    fn insert_subtree(&mut self, node: &VirtualNode, parent: Option<ElementId>) -> ElementId {
        let id = self.alloc(RenderedElement::new(node.data(), parent));
        let children: Vec<ElementId> = node
            .children()
            .iter()
            .map(|child| self.insert_subtree(child, Some(id)))
            .collect();
        if let Some(el) = self.get_mut(id) {
            el.children = children;
        }
        id
    }

    fn remove_subtree(&mut self, id: ElementId) {
        let Some(el) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.free.push(id.0);
        for child in el.children {
            self.remove_subtree(child);
        }
    }

    /// Mirror a patch that was already applied to the virtual tree.
    ///
    /// `None` means the arena no longer matches the tree and must be rebuilt.
    pub(crate) fn apply(&mut self, patch: &Patch) -> Option<PatchEffect> {
        let target = self.resolve(patch.path())?;
        let mut effect = PatchEffect::default();

        match patch {
            Patch::Replace { node, .. } => {
                effect.old_bounds.push(self.subtree_bounds(target));
                let old_children = std::mem::take(&mut self.get_mut(target)?.children);
                for child in old_children {
                    self.remove_subtree(child);
                }
                let children: Vec<ElementId> = node
                    .children()
                    .iter()
                    .map(|child| self.insert_subtree(child, Some(target)))
                    .collect();
                let el = self.get_mut(target)?;
                el.data = node.data();
                el.children = children;
                effect.affected.push(target);
            }
            Patch::UpdateProps { set, remove, .. } => {
                effect.old_bounds.push(self.subtree_bounds(target));
                let NodeData::Element { props, .. } = &mut self.get_mut(target)?.data else {
                    return None;
                };
                merge_props(props, set, remove);
                effect.affected.push(target);
            }
            Patch::UpdateText { text, .. } => {
                effect.old_bounds.push(self.subtree_bounds(target));
                let NodeData::Text(content) = &mut self.get_mut(target)?.data else {
                    return None;
                };
                content.clone_from(text);
                effect.affected.push(target);
            }
            Patch::Insert { index, node, .. } => {
                if *index > self.get(target)?.children.len() {
                    return None;
                }
                let child = self.insert_subtree(node, Some(target));
                self.get_mut(target)?.children.insert(*index, child);
                effect.affected.push(child);
            }
            Patch::Remove { index, .. } => {
                let parent = self.get_mut(target)?;
                if *index >= parent.children.len() {
                    return None;
                }
                let child = parent.children.remove(*index);
                effect.old_bounds.push(self.subtree_bounds(child));
                self.remove_subtree(child);
            }
            Patch::Move { path, from, to } => {
                let moved = self.reorder(target, &[(*from, *to)], path)?;
                self.note_moved(&moved, &mut effect);
            }
            Patch::Reorder { path, moves } => {
                let moved = self.reorder(target, moves, path)?;
                self.note_moved(&moved, &mut effect);
            }
        }
        Some(effect)
    }

    /// Apply moves to a child list, returning the handles that moved.
    fn reorder(
        &mut self,
        parent: ElementId,
        moves: &[(usize, usize)],
        path: &Path,
    ) -> Option<Vec<ElementId>> {
        let children = &mut self.get_mut(parent)?.children;
        let mut moved = Vec::with_capacity(moves.len());
        let mut simulated = children.clone();
        for &(from, to) in moves {
            let id = *simulated.get(from)?;
            moved.push(id);
            simulated.remove(from);
            if to > simulated.len() {
                return None;
            }
            simulated.insert(to, id);
        }
        apply_moves(children, moves, path).ok()?;
        Some(moved)
    }

    fn note_moved(&self, moved: &[ElementId], effect: &mut PatchEffect) {
        for &id in moved {
            effect.old_bounds.push(self.subtree_bounds(id));
            effect.affected.push(id);
        }
    }

    /// Take geometry from a fresh layout and re-resolve paths, z, styles and
    /// clips. `moved` is called with the old and new rect of every element
    /// whose rect changed.
    pub fn sync(&mut self, layout: &LayoutTree, moved: &mut dyn FnMut(Rect, Rect)) {
        self.index.clear();
        if let Some(root) = self.root {
            let context = Inherited {
                z: i32::MIN,
                style: Style::default(),
                clip: None,
            };
            self.sync_node(root, &layout.root, Path::root(), context, moved);
        }
    }

    fn sync_node(
        &mut self,
        id: ElementId,
        layout: &LayoutNode,
        path: Path,
        inherited: Inherited,
        moved: &mut dyn FnMut(Rect, Rect),
    ) {
        let Some(el) = self.get_mut(id) else {
            return;
        };

        if el.rect != layout.rect {
            moved(el.rect, layout.rect);
        }
        el.rect = layout.rect;

        let own_z = el
            .data
            .prop("z-index")
            .and_then(Value::as_i64)
            .map_or(0, |z| z.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
        el.z = own_z.max(inherited.z);

        if let NodeData::Element { props, .. } = &el.data {
            el.style = Style::cascade(inherited.style, props);
        } else {
            el.style = inherited.style;
        }

        el.clip = match inherited.clip {
            Some(clip) => el.rect.clip_to(&clip),
            None => el.rect,
        };
        el.path = path.clone();

        let child_context = Inherited {
            z: el.z,
            style: el.style,
            clip: match el.data {
                NodeData::Clipping(_) => Some(el.clip),
                _ => inherited.clip,
            },
        };
        let children = el.children.clone();

        self.index.insert(path.clone(), id);
        for (i, (child, child_layout)) in children.iter().zip(&layout.children).enumerate() {
            self.sync_node(*child, child_layout, path.child(i), child_context, moved);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Inherited {
    z: i32,
    style: Style,
    clip: Option<Rect>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use std::collections::BTreeSet;
    use vellum_core::{Props, Size};
    use vellum_layout::LayoutEngine;

    fn synced(tree: &VirtualNode) -> ElementArena {
        let mut arena = ElementArena::new();
        arena.build(tree);
        let layout = LayoutEngine::new().compute(tree, Size::new(20, 10));
        arena.sync(&layout, &mut |_, _| {});
        arena
    }

    fn sample() -> VirtualNode {
        VirtualNode::element("column")
            .with_prop("color", "green")
            .with_child(VirtualNode::text("a"))
            .with_child(
                VirtualNode::element("box")
                    .with_prop("z-index", 3)
                    .with_child(VirtualNode::text("b")),
            )
    }

    // =========================================================================
    // Build and Sync Tests
    // =========================================================================

    #[test]
    fn test_build_mirrors_tree() {
        let arena = synced(&sample());
        assert_eq!(arena.len(), 4);
        let paths: Vec<String> = arena
            .preorder()
            .into_iter()
            .map(|id| arena.get(id).unwrap().path.to_string())
            .collect();
        assert_eq!(paths, vec!["/", "0", "1", "1.0"]);
    }

    #[test]
    fn test_lookup_by_path() {
        let arena = synced(&sample());
        let id = arena.lookup(&Path::from([1, 0])).unwrap();
        let el = arena.get(id).unwrap();
        assert_eq!(el.data, NodeData::Text("b".into()));
        assert_eq!(el.parent, arena.lookup(&Path::from([1])));
    }

    #[test]
    fn test_z_promotion() {
        let arena = synced(&sample());
        let z = |p: &[usize]| arena.get(arena.lookup(&Path::from(p)).unwrap()).unwrap().z;
        assert_eq!(z(&[]), 0);
        assert_eq!(z(&[0]), 0);
        assert_eq!(z(&[1]), 3);
        assert_eq!(z(&[1, 0]), 3);
    }

    #[test]
    fn test_child_cannot_drop_below_parent_z() {
        let tree = VirtualNode::element("box")
            .with_prop("z-index", 5)
            .with_child(VirtualNode::element("box").with_prop("z-index", 1));
        let arena = synced(&tree);
        let child = arena.lookup(&Path::from([0])).unwrap();
        assert_eq!(arena.get(child).unwrap().z, 5);
    }

    #[test]
    fn test_style_inherits() {
        let arena = synced(&sample());
        let text = arena.lookup(&Path::from([1, 0])).unwrap();
        assert_eq!(arena.get(text).unwrap().style.fg, Color::Green);
    }

    #[test]
    fn test_clipping_limits_descendant_clip() {
        let tree = VirtualNode::element("box").with_child(VirtualNode::clipping(
            Rect::new(0, 0, 3, 1),
            [VirtualNode::text("long text")],
        ));
        let arena = synced(&tree);
        let text = arena.get(arena.lookup(&Path::from([0, 0])).unwrap()).unwrap();
        assert_eq!(text.clip, Rect::new(0, 0, 3, 1));
    }

    #[test]
    fn test_sync_reports_moves() {
        let mut arena = synced(&sample());
        let wider = LayoutEngine::new().compute(&sample(), Size::new(30, 10));
        let mut moves = Vec::new();
        arena.sync(&wider, &mut |old, new| moves.push((old, new)));
        assert!(moves.contains(&(Rect::new(0, 0, 20, 10), Rect::new(0, 0, 30, 10))));
    }

    // =========================================================================
    // Patch Mirroring Tests
    // =========================================================================

    #[test]
    fn test_update_text_keeps_handle() {
        let mut arena = synced(&sample());
        let before = arena.lookup(&Path::from([0])).unwrap();
        let effect = arena
            .apply(&Patch::UpdateText {
                path: Path::from([0]),
                text: "z".into(),
            })
            .unwrap();
        assert_eq!(effect.affected, vec![before]);
        assert_eq!(effect.old_bounds, vec![Rect::new(0, 0, 20, 1)]);
        assert_eq!(arena.get(before).unwrap().data, NodeData::Text("z".into()));
    }

    #[test]
    fn test_update_props_merges() {
        let mut arena = synced(&sample());
        let mut set = Props::new();
        set.insert("color".into(), Value::from("red"));
        arena
            .apply(&Patch::UpdateProps {
                path: Path::root(),
                set,
                remove: BTreeSet::new(),
            })
            .unwrap();
        let root = arena.get(arena.root().unwrap()).unwrap();
        assert_eq!(root.data.prop("color"), Some(&Value::from("red")));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut arena = synced(&sample());
        let effect = arena
            .apply(&Patch::Insert {
                path: Path::root(),
                index: 0,
                node: VirtualNode::text("new"),
            })
            .unwrap();
        assert!(effect.old_bounds.is_empty());
        assert_eq!(arena.len(), 5);

        let effect = arena
            .apply(&Patch::Remove {
                path: Path::root(),
                index: 2,
            })
            .unwrap();
        assert_eq!(effect.old_bounds.len(), 1);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_replace_frees_old_subtree() {
        let mut arena = synced(&sample());
        arena
            .apply(&Patch::Replace {
                path: Path::from([1]),
                node: VirtualNode::Empty,
            })
            .unwrap();
        assert_eq!(arena.len(), 3);
        let id = arena.lookup(&Path::from([1])).unwrap();
        assert_eq!(arena.get(id).unwrap().kind(), NodeKind::Empty);
    }

    #[test]
    fn test_reorder_reports_moved_children() {
        let tree = VirtualNode::element("column").with_children(
            ["a", "b", "c"].map(VirtualNode::text),
        );
        let mut arena = synced(&tree);
        let c = arena.lookup(&Path::from([2])).unwrap();
        let effect = arena
            .apply(&Patch::Reorder {
                path: Path::root(),
                moves: vec![(2, 0)],
            })
            .unwrap();
        assert_eq!(effect.affected, vec![c]);
        let root = arena.get(arena.root().unwrap()).unwrap();
        assert_eq!(root.children[0], c);
    }

    #[test]
    fn test_unresolvable_patch() {
        let mut arena = synced(&sample());
        assert!(arena
            .apply(&Patch::UpdateText {
                path: Path::from([9]),
                text: String::new(),
            })
            .is_none());
    }
}
