#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]
//! Rendering pipeline for the Vellum terminal UI engine.
//!
//! Paints laid-out virtual trees onto a [`Surface`] and keeps them up to date
//! as patches arrive, repainting only the dirty parts of the screen.
//!
//! - [`Renderer`]: full renders, patch batches, hit testing
//! - [`DisplayList`]: every pass is recorded and can be verified or replayed
//! - [`CellBuffer`]: an in-memory surface of styled cells
//! - [`ClipStack`], [`truncate_text`], [`clip_box`]: clip-aware painting
//! - [`DirtyTracker`], [`merge_regions`]: dirty region bookkeeping
//!
//! ```
//! use vellum_core::VirtualNode;
//! use vellum_render::{CellBuffer, Renderer, Repaint};
//!
//! let mut renderer = Renderer::new(CellBuffer::new(20, 3));
//! renderer
//!     .render_full(VirtualNode::element("column").with_child(VirtualNode::text("Hello")))
//!     .unwrap();
//! assert!(renderer.surface().row_text(0).starts_with("Hello"));
//!
//! let outcome = renderer
//!     .update(VirtualNode::element("column").with_child(VirtualNode::text("World")))
//!     .unwrap();
//! assert_eq!(outcome.repaint, Repaint::Partial);
//! assert!(renderer.surface().row_text(0).starts_with("World"));
//! ```

mod border;
mod cell_buffer;
mod clip;
mod config;
mod dirty;
mod display_list;
mod element;
mod error;
mod paint;
mod pipeline;
mod style;
mod surface;

pub use border::{box_runs, BorderGlyphs, TextRun};
pub use cell_buffer::{Cell, CellBuffer};
pub use clip::{clip_box, text_width, truncate_text, BoxPaint, ClipStack};
pub use config::RenderConfig;
pub use dirty::{exceeds_budget, merge_regions, DirtyTracker};
pub use display_list::{DisplayList, DisplayOp};
pub use element::{ElementArena, ElementId, RenderedElement};
pub use error::{InvariantViolation, RenderError, StructuralError};
pub use pipeline::{PatchOutcome, Renderer, Repaint};
pub use style::{Color, ColorParseError, Modifiers, Style};
pub use surface::Surface;
