//! Virtual tree diffing for incremental rendering.
//!
//! This module compares two independent virtual trees and computes an ordered,
//! path-addressed list of [`Patch`]es that turns the first into the second.
//!
//! # Algorithm
//!
//! The walk is depth-first and position-based:
//!
//! 1. **Node**: a kind or tag change replaces the whole subtree; otherwise
//!    the node's own data (props, text) is compared.
//! 2. **Children**: if the new child list is a reordering of the old one,
//!    a single [`Patch::Reorder`] with the fewest moves is emitted. Otherwise
//!    children are diffed pairwise, then the tail is inserted or removed.
//!
//! Component identity is not tracked here; paths are the only address.

use crate::node::{NodeKind, VirtualNode};
use crate::patch::{diff_props, Patch};
use crate::path::Path;

/// Ordered result of diffing two trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchList {
    /// Patches, to be applied in order
    pub patches: Vec<Patch>,
}

impl PatchList {
    /// Create an empty patch list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Get the number of patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Add a patch.
    pub fn push(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    /// Iterate over the patches in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
        self.patches.iter()
    }

    /// Borrow as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Patch] {
        &self.patches
    }
}

impl<'a> IntoIterator for &'a PatchList {
    type Item = &'a Patch;
    type IntoIter = std::slice::Iter<'a, Patch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.iter()
    }
}

impl IntoIterator for PatchList {
    type Item = Patch;
    type IntoIter = std::vec::IntoIter<Patch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.into_iter()
    }
}

/// Virtual tree differ.
#[derive(Debug, Default)]
pub struct TreeDiffer {
    /// Current path during traversal
    current_path: Path,
}

impl TreeDiffer {
    /// Create a new tree differ.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the patches turning `old` into `new`.
    #[must_use]
    pub fn diff(&mut self, old: &VirtualNode, new: &VirtualNode) -> PatchList {
        let mut result = PatchList::new();
        self.current_path = Path::root();
        self.diff_node(old, new, &mut result);
        result
    }

    fn replace(&self, new: &VirtualNode, result: &mut PatchList) {
        result.push(Patch::Replace {
            path: self.current_path.clone(),
            node: new.clone(),
        });
    }

    fn diff_node(&mut self, old: &VirtualNode, new: &VirtualNode, result: &mut PatchList) {
        if old.kind() != new.kind() {
            self.replace(new, result);
            return;
        }

        match (old, new) {
            (VirtualNode::Element(a), VirtualNode::Element(b)) => {
                if a.tag != b.tag {
                    self.replace(new, result);
                    return;
                }
                let (set, remove) = diff_props(&a.props, &b.props);
                if !set.is_empty() || !remove.is_empty() {
                    result.push(Patch::UpdateProps {
                        path: self.current_path.clone(),
                        set,
                        remove,
                    });
                }
                self.diff_children(&a.children, &b.children, result);
            }
            (VirtualNode::Text(a), VirtualNode::Text(b)) => {
                if a != b {
                    result.push(Patch::UpdateText {
                        path: self.current_path.clone(),
                        text: b.clone(),
                    });
                }
            }
            (
                VirtualNode::Clipping {
                    rect: a,
                    children: old_children,
                },
                VirtualNode::Clipping {
                    rect: b,
                    children: new_children,
                },
            ) => {
                if a != b {
                    self.replace(new, result);
                    return;
                }
                self.diff_children(old_children, new_children, result);
            }
            (VirtualNode::Fragment(old_children), VirtualNode::Fragment(new_children)) => {
                self.diff_children(old_children, new_children, result);
            }
            _ => {
                debug_assert_eq!(old.kind(), NodeKind::Empty);
            }
        }
    }

    fn diff_children(
        &mut self,
        old_children: &[VirtualNode],
        new_children: &[VirtualNode],
        result: &mut PatchList,
    ) {
        if let Some(order) = permutation(old_children, new_children) {
            if order.iter().enumerate().any(|(i, &from)| i != from) {
                result.push(Patch::Reorder {
                    path: self.current_path.clone(),
                    moves: minimal_moves(&order),
                });
            }
            return;
        }

        let common = old_children.len().min(new_children.len());
        for (i, (old_child, new_child)) in old_children
            .iter()
            .zip(new_children)
            .enumerate()
        {
            self.current_path.push(i);
            self.diff_node(old_child, new_child, result);
            self.current_path.pop();
        }

        for (i, new_child) in new_children.iter().enumerate().skip(common) {
            result.push(Patch::Insert {
                path: self.current_path.clone(),
                index: i,
                node: new_child.clone(),
            });
        }

        for i in (common..old_children.len()).rev() {
            result.push(Patch::Remove {
                path: self.current_path.clone(),
                index: i,
            });
        }
    }
}

/// Convenience function to diff two trees.
#[must_use]
pub fn diff_trees(old: &VirtualNode, new: &VirtualNode) -> PatchList {
    let mut differ = TreeDiffer::new();
    differ.diff(old, new)
}

/// If `new` is a reordering of `old`, return for each new position the old
/// index it came from. Equal children are matched in order, so an unchanged
/// list yields the identity.
fn permutation(old: &[VirtualNode], new: &[VirtualNode]) -> Option<Vec<usize>> {
    if old.len() != new.len() || old.is_empty() {
        return None;
    }
    let mut used = vec![false; old.len()];
    let mut order = Vec::with_capacity(new.len());
    for child in new {
        let from = old
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == child)?;
        used[from] = true;
        order.push(from);
    }
    Some(order)
}

/// Positions (into `seq`) of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = prev[i];
    }
    run.reverse();
    run
}

/// Moves that rearrange `0..n` into `order` (`order[i]` is the original index
/// that must end at position `i`).
///
/// Members of the longest increasing run stay put; every other item is moved
/// directly behind its target predecessor, giving `n - LIS` moves.
fn minimal_moves(order: &[usize]) -> Vec<(usize, usize)> {
    let mut stays = vec![false; order.len()];
    for i in longest_increasing_subsequence(order) {
        stays[i] = true;
    }

    let mut current: Vec<usize> = (0..order.len()).collect();
    let mut moves = Vec::new();
    for (i, &item) in order.iter().enumerate() {
        if stays[i] {
            continue;
        }
        let Some(from) = current.iter().position(|&c| c == item) else {
            continue;
        };
        current.remove(from);
        let to = match i.checked_sub(1) {
            Some(prev) => current
                .iter()
                .position(|&c| c == order[prev])
                .map_or(0, |p| p + 1),
            None => 0,
        };
        current.insert(to, item);
        moves.push((from, to));
    }
    moves
}
