//! Integration tests for vellum-layout.
//!
//! These tests lay out whole virtual trees through the public API.

use proptest::prelude::*;
use vellum_core::{Path, Rect, Size, VirtualNode};
use vellum_layout::{compute_layout, LayoutEngine, LayoutNode, LayoutTree};

fn sized(width: u16) -> VirtualNode {
    VirtualNode::element("box").with_prop("width", i64::from(width))
}

fn rect(tree: &LayoutTree, path: &[usize]) -> Rect {
    tree.rect(&Path::from(path)).unwrap()
}

fn widths(tree: &LayoutTree, count: usize) -> Vec<u16> {
    (0..count).map(|i| rect(tree, &[i]).width).collect()
}

fn same_shape(node: &VirtualNode, layout: &LayoutNode) -> bool {
    node.children().len() == layout.children.len()
        && node
            .children()
            .iter()
            .zip(&layout.children)
            .all(|(n, l)| same_shape(n, l))
}

// =============================================================================
// Flexible Space
// =============================================================================

#[test]
fn test_grow_distributes_surplus_equally() {
    let root = VirtualNode::element("row").with_children([20u16, 40, 10].map(|w| {
        VirtualNode::element("box")
            .with_prop("flex-basis", i64::from(w))
            .with_prop("flex-grow", 1)
    }));
    let tree = compute_layout(&root, Size::new(100, 3));
    assert_eq!(widths(&tree, 3), vec![30, 50, 20]);
    assert_eq!(rect(&tree, &[1]).x, 30);
    assert_eq!(rect(&tree, &[2]).x, 80);
}

#[test]
fn test_no_grow_keeps_basis() {
    let root = VirtualNode::element("row").with_children([sized(20), sized(20)]);
    let tree = compute_layout(&root, Size::new(40, 3));
    assert_eq!(widths(&tree, 2), vec![20, 20]);
    assert_eq!(rect(&tree, &[1]).right(), 40);
}

#[test]
fn test_shrink_respects_min_width() {
    let root = VirtualNode::element("row").with_children([
        sized(30).with_prop("min-width", 25),
        sized(30),
    ]);
    let tree = compute_layout(&root, Size::new(40, 1));
    assert_eq!(widths(&tree, 2), vec![25, 15]);
}

#[test]
fn test_space_between_single_child_flush_start() {
    let root = VirtualNode::element("row")
        .with_prop("justify-content", "space-between")
        .with_child(sized(10));
    let tree = compute_layout(&root, Size::new(50, 1));
    assert_eq!(rect(&tree, &[0]).x, 0);
}

#[test]
fn test_space_between_spreads_children() {
    let root = VirtualNode::element("row")
        .with_prop("justify-content", "space-between")
        .with_children([sized(10), sized(10), sized(10)]);
    let tree = compute_layout(&root, Size::new(50, 1));
    let xs: Vec<u16> = (0..3).map(|i| rect(&tree, &[i]).x).collect();
    assert_eq!(xs, vec![0, 20, 40]);
}

#[test]
fn test_justify_end() {
    let root = VirtualNode::element("row")
        .with_prop("justify-content", "flex-end")
        .with_children([sized(5), sized(5)]);
    let tree = compute_layout(&root, Size::new(20, 1));
    assert_eq!(rect(&tree, &[0]).x, 10);
    assert_eq!(rect(&tree, &[1]).x, 15);
}

// =============================================================================
// Nesting
// =============================================================================

#[test]
fn test_sidebar_and_main_panel() {
    let sidebar = VirtualNode::element("box")
        .with_prop("width", 20)
        .with_prop("border", "single")
        .with_child(VirtualNode::text("Files"));
    let main = VirtualNode::element("column")
        .with_prop("flex-grow", 1)
        .with_prop("padding", 1)
        .with_child(VirtualNode::text("Title"))
        .with_child(VirtualNode::element("box").with_prop("flex-grow", 1));
    let root = VirtualNode::element("row").with_children([sidebar, main]);

    let tree = compute_layout(&root, Size::new(80, 24));
    assert_eq!(rect(&tree, &[0]), Rect::new(0, 0, 20, 24));
    assert_eq!(rect(&tree, &[0, 0]), Rect::new(1, 1, 18, 1));
    assert_eq!(rect(&tree, &[1]), Rect::new(20, 0, 60, 24));
    assert_eq!(rect(&tree, &[1, 0]), Rect::new(21, 1, 58, 1));
    assert_eq!(rect(&tree, &[1, 1]), Rect::new(21, 2, 58, 21));
}

#[test]
fn test_auto_height_from_content() {
    let card = VirtualNode::element("box")
        .with_prop("border", true)
        .with_child(VirtualNode::text("line one\nline two"));
    let root = VirtualNode::element("column")
        .with_child(card)
        .with_child(VirtualNode::text("footer"));
    let tree = compute_layout(&root, Size::new(30, 20));
    assert_eq!(rect(&tree, &[0]), Rect::new(0, 0, 30, 4));
    assert_eq!(rect(&tree, &[1]).y, 4);
}

#[test]
fn test_row_measures_nested_row_width() {
    let inner = VirtualNode::element("row")
        .with_prop("gap", 1)
        .with_children([VirtualNode::text("ab"), VirtualNode::text("cd")]);
    let root = VirtualNode::element("row")
        .with_child(inner)
        .with_child(VirtualNode::text("z"));
    let tree = compute_layout(&root, Size::new(20, 1));
    assert_eq!(rect(&tree, &[0]).width, 5);
    assert_eq!(rect(&tree, &[1]).x, 5);
}

// =============================================================================
// Grid
// =============================================================================

#[test]
fn test_grid_dashboard() {
    let panel = || VirtualNode::element("box").with_prop("border", true);
    let root = VirtualNode::element("box")
        .with_prop("display", "grid")
        .with_prop("grid-template-columns", "1fr 1fr")
        .with_prop("grid-template-rows", "1fr 1fr")
        .with_prop("gap", 1)
        .with_children([panel(), panel(), panel(), panel()]);
    let tree = compute_layout(&root, Size::new(41, 21));
    assert_eq!(rect(&tree, &[0]), Rect::new(0, 0, 20, 10));
    assert_eq!(rect(&tree, &[1]), Rect::new(21, 0, 20, 10));
    assert_eq!(rect(&tree, &[2]), Rect::new(0, 11, 20, 10));
    assert_eq!(rect(&tree, &[3]), Rect::new(21, 11, 20, 10));
}

#[test]
fn test_grid_auto_column_sized_by_content() {
    let root = VirtualNode::element("box")
        .with_prop("display", "grid")
        .with_prop("grid-template-columns", "auto 1fr")
        .with_children([
            VirtualNode::text("Name:"),
            VirtualNode::text("value"),
            VirtualNode::text("Size:"),
            VirtualNode::text("10"),
        ]);
    let tree = compute_layout(&root, Size::new(20, 5));
    assert_eq!(rect(&tree, &[1]), Rect::new(5, 0, 15, 1));
    assert_eq!(rect(&tree, &[3]), Rect::new(5, 1, 15, 1));
}

// =============================================================================
// Engine Reuse
// =============================================================================

#[test]
fn test_engine_reuse_gives_identical_results() {
    let root = VirtualNode::element("row").with_children([sized(3), sized(4)]);
    let mut engine = LayoutEngine::new();
    let first = engine.compute(&root, Size::new(10, 2));
    let second = engine.compute(&root, Size::new(10, 2));
    assert_eq!(first, second);
}

#[test]
fn test_viewport_resize_relayouts() {
    let root = VirtualNode::element("row")
        .with_child(VirtualNode::element("box").with_prop("flex-grow", 1));
    let mut engine = LayoutEngine::new();
    assert_eq!(engine.compute(&root, Size::new(10, 2)).root.children[0].rect.width, 10);
    assert_eq!(engine.compute(&root, Size::new(30, 2)).root.children[0].rect.width, 30);
}

// =============================================================================
// Properties
// =============================================================================

fn arb_leaf() -> impl Strategy<Value = VirtualNode> {
    prop_oneof![
        "[a-z ]{0,6}".prop_map(VirtualNode::text),
        Just(VirtualNode::Empty),
        (0u16..8, 0u16..4).prop_map(|(w, h)| VirtualNode::element("box")
            .with_prop("width", i64::from(w))
            .with_prop("height", i64::from(h))),
    ]
}

fn arb_tree() -> impl Strategy<Value = VirtualNode> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (
                prop_oneof![Just("row"), Just("column")],
                prop::collection::vec(inner.clone(), 0..4)
            )
                .prop_map(|(tag, children)| VirtualNode::element(tag).with_children(children)),
            prop::collection::vec(inner, 0..3).prop_map(VirtualNode::fragment),
        ]
    })
}

proptest! {
    #[test]
    fn prop_layout_mirrors_tree_shape(root in arb_tree(), w in 1u16..60, h in 1u16..30) {
        let tree = compute_layout(&root, Size::new(w, h));
        prop_assert!(same_shape(&root, &tree.root));
    }

    #[test]
    fn prop_grow_fills_row(bases in prop::collection::vec(0u16..10, 1..6), extra in 0u16..40) {
        let total: u16 = bases.iter().sum::<u16>() + extra;
        let root = VirtualNode::element("row").with_children(bases.iter().map(|&b| {
            VirtualNode::element("box")
                .with_prop("flex-basis", i64::from(b))
                .with_prop("flex-grow", 1)
        }));
        let tree = compute_layout(&root, Size::new(total, 1));
        let sum: u16 = tree.root.children.iter().map(|c| c.rect.width).sum();
        prop_assert_eq!(sum, total);
        for pair in tree.root.children.windows(2) {
            prop_assert_eq!(pair[0].rect.right(), pair[1].rect.x);
        }
    }

    #[test]
    fn prop_row_children_stay_inside(widths in prop::collection::vec(0u16..30, 1..6), avail in 1u16..80) {
        let root = VirtualNode::element("row").with_children(widths.iter().map(|&w| sized(w)));
        let tree = compute_layout(&root, Size::new(avail, 2));
        let total: u32 = widths.iter().map(|&w| u32::from(w)).sum();
        if total > u32::from(avail) {
            let sum: u32 = tree.root.children.iter().map(|c| u32::from(c.rect.width)).sum();
            prop_assert_eq!(sum, u32::from(avail));
        }
        for child in &tree.root.children {
            prop_assert!(tree.root.rect.contains_rect(&child.rect) || child.rect.is_empty());
        }
    }
}
