//! Path-addressed patches and their application to virtual trees.

use crate::node::{NodeKind, Props, VirtualNode};
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// One change between two virtual trees.
///
/// `Insert`, `Remove`, `Move` and `Reorder` address the *parent* whose child
/// list changes; the other variants address the node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Patch {
    /// Replace the node at `path` with `node`
    Replace {
        /// Node to replace
        path: Path,
        /// Replacement subtree
        node: VirtualNode,
    },
    /// Change props of the element at `path`
    UpdateProps {
        /// Element to update
        path: Path,
        /// Added or changed props
        set: Props,
        /// Keys to remove
        remove: BTreeSet<String>,
    },
    /// Change the content of the text node at `path`
    UpdateText {
        /// Text node to update
        path: Path,
        /// New content
        text: String,
    },
    /// Insert `node` as child `index` of the parent at `path`
    Insert {
        /// Parent path
        path: Path,
        /// Index in the parent's child list after insertion
        index: usize,
        /// Inserted subtree
        node: VirtualNode,
    },
    /// Remove child `index` of the parent at `path`
    Remove {
        /// Parent path
        path: Path,
        /// Index of the removed child
        index: usize,
    },
    /// Move one child of the parent at `path`
    Move {
        /// Parent path
        path: Path,
        /// Current index
        from: usize,
        /// Index after the move
        to: usize,
    },
    /// Apply a sequence of moves to the children of the parent at `path`
    Reorder {
        /// Parent path
        path: Path,
        /// `(from, to)` pairs applied in order, each with [`Patch::Move`] semantics
        moves: Vec<(usize, usize)>,
    },
}

impl Patch {
    /// The path this patch addresses.
    #[must_use]
    pub const fn path(&self) -> &Path {
        match self {
            Self::Replace { path, .. }
            | Self::UpdateProps { path, .. }
            | Self::UpdateText { path, .. }
            | Self::Insert { path, .. }
            | Self::Remove { path, .. }
            | Self::Move { path, .. }
            | Self::Reorder { path, .. } => path,
        }
    }

    /// Check if this patch changes a child list rather than a single node.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. } | Self::Remove { .. } | Self::Move { .. } | Self::Reorder { .. }
        )
    }

    /// Short name of the patch variant, for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::UpdateProps { .. } => "update_props",
            Self::UpdateText { .. } => "update_text",
            Self::Insert { .. } => "insert",
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
            Self::Reorder { .. } => "reorder",
        }
    }
}

/// Why a patch could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// No node exists at the path
    #[error("no node at path {0}")]
    PathNotFound(Path),

    /// The node at the path is the wrong kind for this patch
    #[error("{patch} expects {expected:?} at {path}, found {found:?}")]
    KindMismatch {
        /// Patch name
        patch: &'static str,
        /// Addressed path
        path: Path,
        /// Kind required by the patch
        expected: NodeKind,
        /// Kind actually present
        found: NodeKind,
    },

    /// The node at the path cannot hold children
    #[error("node at {0} cannot hold children")]
    NotAContainer(Path),

    /// A child index is outside the parent's child list
    #[error("index {index} out of range at {path} (len {len})")]
    IndexOutOfRange {
        /// Parent path
        path: Path,
        /// Offending index
        index: usize,
        /// Child count at the time of application
        len: usize,
    },
}

/// Apply `moves` to `items` in order, each as remove-then-insert.
///
/// All moves are validated against the running length before any is applied,
/// so a failed reorder leaves `items` untouched.
pub fn apply_moves<T>(
    items: &mut Vec<T>,
    moves: &[(usize, usize)],
    path: &Path,
) -> Result<(), PatchError> {
    let len = items.len();
    for &(from, to) in moves {
        let bad = if from >= len { from } else { to };
        if from >= len || to >= len {
            return Err(PatchError::IndexOutOfRange {
                path: path.clone(),
                index: bad,
                len,
            });
        }
    }
    for &(from, to) in moves {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Apply one patch to a tree, producing a new tree.
///
/// The input tree is left untouched.
pub fn apply_patch(root: &VirtualNode, patch: &Patch) -> Result<VirtualNode, PatchError> {
    let mut next = root.clone();
    apply_patch_mut(&mut next, patch)?;
    Ok(next)
}

/// Apply a patch list in order, producing a new tree.
///
/// Stops at the first patch that cannot be applied.
pub fn apply_patches(root: &VirtualNode, patches: &[Patch]) -> Result<VirtualNode, PatchError> {
    let mut next = root.clone();
    for patch in patches {
        apply_patch_mut(&mut next, patch)?;
    }
    Ok(next)
}

fn resolve_mut<'a>(root: &'a mut VirtualNode, path: &Path) -> Option<&'a mut VirtualNode> {
    let mut node = root;
    for &index in path.segments() {
        node = node.children_vec_mut()?.get_mut(index)?;
    }
    Some(node)
}

/// Apply one patch to a tree in place.
///
/// On error the tree is unchanged.
pub fn apply_patch_mut(root: &mut VirtualNode, patch: &Patch) -> Result<(), PatchError> {
    let path = patch.path();
    let target =
        resolve_mut(root, path).ok_or_else(|| PatchError::PathNotFound(path.clone()))?;

    match patch {
        Patch::Replace { node, .. } => {
            *target = node.clone();
        }
        Patch::UpdateProps { set, remove, .. } => {
            let VirtualNode::Element(el) = target else {
                return Err(PatchError::KindMismatch {
                    patch: patch.name(),
                    path: path.clone(),
                    expected: NodeKind::Element,
                    found: target.kind(),
                });
            };
            merge_props(&mut el.props, set, remove);
        }
        Patch::UpdateText { text, .. } => {
            let VirtualNode::Text(content) = target else {
                return Err(PatchError::KindMismatch {
                    patch: patch.name(),
                    path: path.clone(),
                    expected: NodeKind::Text,
                    found: target.kind(),
                });
            };
            content.clone_from(text);
        }
        Patch::Insert { index, node, .. } => {
            let children = target
                .children_vec_mut()
                .ok_or_else(|| PatchError::NotAContainer(path.clone()))?;
            if *index > children.len() {
                return Err(PatchError::IndexOutOfRange {
                    path: path.clone(),
                    index: *index,
                    len: children.len(),
                });
            }
            children.insert(*index, node.clone());
        }
        Patch::Remove { index, .. } => {
            let children = target
                .children_vec_mut()
                .ok_or_else(|| PatchError::NotAContainer(path.clone()))?;
            if *index >= children.len() {
                return Err(PatchError::IndexOutOfRange {
                    path: path.clone(),
                    index: *index,
                    len: children.len(),
                });
            }
            children.remove(*index);
        }
        Patch::Move { from, to, .. } => {
            let children = target
                .children_vec_mut()
                .ok_or_else(|| PatchError::NotAContainer(path.clone()))?;
            apply_moves(children, &[(*from, *to)], path)?;
        }
        Patch::Reorder { moves, .. } => {
            let children = target
                .children_vec_mut()
                .ok_or_else(|| PatchError::NotAContainer(path.clone()))?;
            apply_moves(children, moves, path)?;
        }
    }
    Ok(())
}

/// Apply an `UpdateProps` change set to a prop map.
pub fn merge_props(props: &mut Props, set: &Props, remove: &BTreeSet<String>) {
    for key in remove {
        props.remove(key);
    }
    for (key, value) in set {
        props.insert(key.clone(), value.clone());
    }
}

/// Compute the `(set, remove)` change set turning `old` into `new`.
#[must_use]
pub fn diff_props(old: &Props, new: &Props) -> (Props, BTreeSet<String>) {
    let set: Props = new
        .iter()
        .filter(|(key, value)| old.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let remove: BTreeSet<String> = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .cloned()
        .collect();
    (set, remove)
}
