#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_markdown)]
//! Layout engine for the Vellum terminal UI engine.
//!
//! Turns a [`VirtualNode`](vellum_core::VirtualNode) tree into absolute cell
//! rectangles. Elements are boxes with margin, border and padding whose
//! children flow either as a flex line (row or column, optionally wrapping)
//! or on a track grid.
//!
//! - Fragments contribute their children to the parent's flow
//! - Clipping nodes take no flow space and sit at an offset in the parent
//! - Empty nodes take no flow space
//!
//! ```
//! use vellum_core::{Path, Rect, Size, VirtualNode};
//! use vellum_layout::LayoutEngine;
//!
//! let root = VirtualNode::element("row")
//!     .with_child(VirtualNode::text("Hi"))
//!     .with_child(VirtualNode::element("box").with_prop("flex-grow", 1));
//!
//! let tree = LayoutEngine::new().compute(&root, Size::new(10, 1));
//! assert_eq!(tree.rect(&Path::from([1])), Some(Rect::new(2, 0, 8, 1)));
//! ```

mod cache;
mod distribute;
mod engine;
mod flex;
mod grid;
mod style;
mod text;

pub use cache::{CacheKey, LayoutCache};
pub use distribute::{apportion, split_even};
pub use engine::{compute_layout, LayoutEngine, LayoutNode, LayoutTree};
pub use flex::{break_lines, justify_offsets, resolve_flexible_lengths, FlexItem};
pub use grid::{
    auto_place_items, compute_track_sizes, parse_tracks, span_extent, tracks_length, GridItem,
    GridPlacement, TrackSize, Tracks,
};
pub use style::{
    clamp_between, percent_of, to_cells, Align, Border, BorderKind, BoxStyle, Dimension, Display,
    Edges, FlexDirection, Justify,
};
pub use text::{line_width, lines, measure_text};
