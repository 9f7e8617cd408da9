//! Root-relative child-index paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sequence of child indices from the root. The empty path is the root.
///
/// Paths are the only addressing scheme shared between the differ and the
/// renderer. Their string form (`"/"`, `"0"`, `"0.2.1"`) is stable across
/// frames and may be used by callers to correlate component instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Check if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(index);
        Self(segments)
    }

    /// Path of the parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, rest)| Self(rest.to_vec()))
    }

    /// Last segment (index within the parent).
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Borrow the segments.
    #[must_use]
    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Append a segment in place.
    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Remove the last segment in place.
    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    /// Check if `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for Path {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl From<&[usize]> for Path {
    fn from(segments: &[usize]) -> Self {
        Self(segments.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(segments: [usize; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
