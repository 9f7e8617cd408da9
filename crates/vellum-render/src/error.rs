//! Error types for vellum-render.

use thiserror::Error;
use vellum_core::{PatchError, Rect};

/// A patch that could not be applied to the rendered tree.
///
/// The renderer skips it and carries on with the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("patch #{index} ({patch}) skipped: {source}")]
pub struct StructuralError {
    /// Position of the patch in its batch
    pub index: usize,
    /// Patch variant name
    pub patch: &'static str,
    /// Why it failed
    #[source]
    pub source: PatchError,
}

/// A display list that breaks the paint discipline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A draw reaches outside the active clip.
    #[error("op #{op}: draw {rect} escapes clip {clip}")]
    ClipEscape {
        /// Op index in the list
        op: usize,
        /// Area the draw covers
        rect: Rect,
        /// Active clip at that point
        clip: Rect,
    },

    /// A pop with no matching push.
    #[error("op #{op}: clip pop on an empty stack")]
    PopWithoutPush {
        /// Op index in the list
        op: usize,
    },

    /// Frames left on the stack at the end of the pass.
    #[error("clip stack unbalanced at end of pass: {depth} frame(s) left")]
    UnbalancedClip {
        /// Frames still pushed
        depth: usize,
    },

    /// A draw with a lower z than one before it.
    #[error("op #{op}: z-order regressed from {previous} to {current}")]
    ZRegression {
        /// Op index in the list
        op: usize,
        /// Highest z seen so far
        previous: i32,
        /// z of this draw
        current: i32,
    },
}

/// Errors returned by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Incremental render requested before any full render.
    #[error("no tree has been rendered yet")]
    NotRendered,

    /// Display list verification failed.
    #[error("display list invalid: {0}")]
    Invariant(#[from] InvariantViolation),
}
