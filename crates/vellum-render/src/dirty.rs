//! Dirty-region tracking.

use vellum_core::Rect;

/// Merge regions that intersect or share an edge until no pair merges.
///
/// The result has no two regions that overlap or touch along an edge.
#[must_use]
pub fn merge_regions(regions: &[Rect]) -> Vec<Rect> {
    let mut merged: Vec<Rect> = regions.iter().copied().filter(|r| !r.is_empty()).collect();
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < merged.len() {
            let mut j = i + 1;
            while j < merged.len() {
                if touches(&merged[i], &merged[j]) {
                    let other = merged.swap_remove(j);
                    merged[i] = merged[i].union(&other);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            return merged;
        }
    }
}

fn touches(a: &Rect, b: &Rect) -> bool {
    a.intersects(b) || a.is_adjacent(b)
}

/// Collects rectangles that need repainting during one pass.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    screen: Rect,
    regions: Vec<Rect>,
}

impl DirtyTracker {
    /// Create a tracker for a screen of the given bounds.
    #[must_use]
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            regions: Vec::new(),
        }
    }

    /// Mark a rectangle dirty. It is clipped to the screen; empty results
    /// are ignored.
    pub fn mark(&mut self, rect: Rect) {
        if let Some(visible) = rect.intersection(&self.screen) {
            if !visible.is_empty() {
                self.regions.push(visible);
            }
        }
    }

    /// Check if nothing is dirty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Merged regions.
    #[must_use]
    pub fn merged(&self) -> Vec<Rect> {
        merge_regions(&self.regions)
    }

    /// Screen bounds.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }
}

/// Check whether merged `regions` call for a full repaint instead.
#[must_use]
pub fn exceeds_budget(regions: &[Rect], screen: Rect, max_regions: usize, max_ratio: f64) -> bool {
    if regions.len() > max_regions {
        return true;
    }
    let area: u64 = regions.iter().map(|r| u64::from(r.area())).sum();
    area as f64 > f64::from(screen.area()) * max_ratio
}
