//! Core types for the Vellum terminal UI engine.
//!
//! This crate provides the pieces shared by layout and rendering:
//! - Geometric primitives in cell coordinates: [`Size`], [`Rect`]
//! - The immutable virtual tree: [`VirtualNode`], [`Element`], [`Value`]
//! - Addressing: [`Path`]
//! - Changes between trees: [`Patch`], [`diff_trees`], [`apply_patches`]
//!
//! ```
//! use vellum_core::{apply_patches, diff_trees, VirtualNode};
//!
//! let old = VirtualNode::element("column").with_child(VirtualNode::text("Hello"));
//! let new = VirtualNode::element("column").with_child(VirtualNode::text("World"));
//!
//! let patches = diff_trees(&old, &new);
//! assert_eq!(patches.len(), 1);
//! assert_eq!(apply_patches(&old, patches.as_slice()).unwrap(), new);
//! ```

mod diff;
mod geometry;
mod node;
mod patch;
mod path;
mod value;

pub use diff::{diff_trees, PatchList, TreeDiffer};
pub use geometry::{Rect, Size};
pub use node::{Element, NodeData, NodeKind, Props, VirtualNode};
pub use patch::{
    apply_moves, apply_patch, apply_patch_mut, apply_patches, diff_props, merge_props, Patch,
    PatchError,
};
pub use path::Path;
pub use value::Value;
