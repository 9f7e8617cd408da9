//! Renderer configuration.

use serde::{Deserialize, Serialize};

/// Thresholds and checks for the rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Above this many merged dirty regions, repaint the whole screen
    pub max_dirty_regions: usize,
    /// Above this fraction of the screen area dirty, repaint the whole screen
    pub full_repaint_ratio: f64,
    /// Verify each pass's display list
    pub verify_display_list: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_dirty_regions: 16,
            full_repaint_ratio: 0.5,
            verify_display_list: cfg!(debug_assertions),
        }
    }
}

impl RenderConfig {
    /// Never fall back to a full repaint, and always verify.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            max_dirty_regions: usize::MAX,
            full_repaint_ratio: f64::MAX,
            verify_display_list: true,
        }
    }

    /// Repaint the whole screen on every update.
    #[must_use]
    pub fn always_full() -> Self {
        Self {
            max_dirty_regions: 0,
            full_repaint_ratio: 0.0,
            ..Self::default()
        }
    }
}
