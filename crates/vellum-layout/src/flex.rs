//! Flexible length resolution along a flex line.

use serde::{Deserialize, Serialize};

use crate::distribute::{apportion, split_even};
use crate::style::Justify;

/// One item on a flex line, in main-axis cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexItem {
    /// Initial main size of the box
    pub basis: u16,
    /// Lower bound for the box
    pub min: u16,
    /// Upper bound for the box
    pub max: u16,
    /// Margin on both main-axis sides, fixed
    pub margin: u16,
    /// Flex grow factor
    pub grow: f64,
    /// Flex shrink factor
    pub shrink: f64,
}

impl Default for FlexItem {
    fn default() -> Self {
        Self {
            basis: 0,
            min: 0,
            max: u16::MAX,
            margin: 0,
            grow: 0.0,
            shrink: 1.0,
        }
    }
}

impl FlexItem {
    /// Create a flex item with the given basis.
    #[must_use]
    pub fn new(basis: u16) -> Self {
        Self {
            basis,
            ..Self::default()
        }
    }

    /// Set the grow factor.
    #[must_use]
    pub const fn grow(mut self, grow: f64) -> Self {
        self.grow = grow;
        self
    }

    /// Set the shrink factor.
    #[must_use]
    pub const fn shrink(mut self, shrink: f64) -> Self {
        self.shrink = shrink;
        self
    }

    /// Set the bounds.
    #[must_use]
    pub const fn bounds(mut self, min: u16, max: u16) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the main-axis margin total.
    #[must_use]
    pub const fn margin(mut self, margin: u16) -> Self {
        self.margin = margin;
        self
    }

    /// Basis clamped to the item's bounds. A minimum wins over a smaller maximum.
    #[must_use]
    pub fn hypothetical(&self) -> u16 {
        self.basis.min(self.max).max(self.min)
    }

    /// Hypothetical size plus margins.
    #[must_use]
    pub fn outer(&self) -> u32 {
        u32::from(self.hypothetical()) + u32::from(self.margin)
    }

    fn clamp(&self, size: i64) -> u16 {
        let upper = i64::from(self.max.max(self.min));
        size.clamp(i64::from(self.min), upper) as u16
    }
}

/// Distribute `available` cells among `items` separated by `gap`.
///
/// Surplus goes to items by `grow`; a deficit is taken by `shrink` weighted by
/// basis. Items whose share would cross `min` or `max` are frozen at that
/// bound and the rest is redistributed until no bound is violated. Returned
/// sizes exclude margins.
#[must_use]
pub fn resolve_flexible_lengths(items: &[FlexItem], available: u16, gap: u16) -> Vec<u16> {
    if items.is_empty() {
        return Vec::new();
    }

    let gaps = i64::from(gap) * (items.len() as i64 - 1);
    let hypothetical_total: i64 = items.iter().map(|i| i64::from(i.outer())).sum::<i64>() + gaps;
    let growing = hypothetical_total < i64::from(available);

    let mut sizes: Vec<u16> = items.iter().map(FlexItem::hypothetical).collect();
    let mut frozen: Vec<bool> = items
        .iter()
        .map(|item| {
            if growing {
                item.grow <= 0.0
            } else {
                item.shrink <= 0.0 || item.basis == 0
            }
        })
        .collect();

    loop {
        let used: i64 = items
            .iter()
            .zip(&sizes)
            .zip(&frozen)
            .map(|((item, size), is_frozen)| {
                let main = if *is_frozen { *size } else { item.hypothetical() };
                i64::from(main) + i64::from(item.margin)
            })
            .sum::<i64>()
            + gaps;
        let free = i64::from(available) - used;

        let unfrozen: Vec<usize> = (0..items.len()).filter(|&i| !frozen[i]).collect();
        if unfrozen.is_empty() || free == 0 {
            for &i in &unfrozen {
                sizes[i] = items[i].hypothetical();
            }
            return sizes;
        }

        let weights: Vec<f64> = unfrozen
            .iter()
            .map(|&i| {
                let item = &items[i];
                if free > 0 {
                    item.grow
                } else {
                    item.shrink * f64::from(item.hypothetical())
                }
            })
            .collect();
        let shares = apportion(free.unsigned_abs().min(u64::from(u32::MAX)) as u32, &weights);

        let mut violated = false;
        for (&i, share) in unfrozen.iter().zip(shares) {
            let item = &items[i];
            let target = if free > 0 {
                i64::from(item.hypothetical()) + i64::from(share)
            } else {
                i64::from(item.hypothetical()) - i64::from(share)
            };
            let clamped = item.clamp(target);
            sizes[i] = clamped;
            if i64::from(clamped) != target {
                frozen[i] = true;
                violated = true;
            }
        }

        if !violated {
            return sizes;
        }
    }
}

/// Offsets of each item from the line start after applying `justify`.
///
/// `sizes` are outer sizes (margins included). Leftover space is whatever
/// `available` leaves after sizes and gaps; an overfull line packs at the
/// start.
#[must_use]
pub fn justify_offsets(sizes: &[u16], available: u16, gap: u16, justify: Justify) -> Vec<u16> {
    let n = sizes.len();
    if n == 0 {
        return Vec::new();
    }

    let used: u32 =
        sizes.iter().map(|&s| u32::from(s)).sum::<u32>() + u32::from(gap) * (n as u32 - 1);
    let leftover = u32::from(available).saturating_sub(used);

    // Extra space before item i (index n is the trailing space, unused)
    let extra: Vec<u32> = match justify {
        Justify::Start => vec![0; n],
        Justify::End => {
            let mut v = vec![0; n];
            v[0] = leftover;
            v
        }
        Justify::Center => {
            let mut v = vec![0; n];
            v[0] = leftover / 2;
            v
        }
        Justify::SpaceBetween if n == 1 => vec![0],
        Justify::SpaceBetween => {
            let mut v = vec![0];
            v.extend(split_even(leftover, n - 1));
            v
        }
        Justify::SpaceAround => {
            // Edges get one unit, gaps between items two
            let mut weights = vec![2.0; n + 1];
            weights[0] = 1.0;
            weights[n] = 1.0;
            apportion(leftover, &weights)[..n].to_vec()
        }
        Justify::SpaceEvenly => split_even(leftover, n + 1)[..n].to_vec(),
    };

    let mut offsets = Vec::with_capacity(n);
    let mut cursor: u32 = 0;
    for (i, (&size, space)) in sizes.iter().zip(extra).enumerate() {
        if i > 0 {
            cursor += u32::from(gap);
        }
        cursor += space;
        offsets.push(cursor.min(u32::from(u16::MAX)) as u16);
        cursor += u32::from(size);
    }
    offsets
}

/// Break items into lines. `outer` are hypothetical outer main sizes.
///
/// A new line starts when the next item plus the gap before it would overflow
/// `available`. Every line holds at least one item.
#[must_use]
pub fn break_lines(outer: &[u32], available: u16, gap: u16) -> Vec<std::ops::Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used: u32 = 0;
    for (i, &size) in outer.iter().enumerate() {
        if i > start {
            let next = used + u32::from(gap) + size;
            if next > u32::from(available) {
                lines.push(start..i);
                start = i;
                used = size;
                continue;
            }
            used = next;
        } else {
            used = size;
        }
    }
    if start < outer.len() {
        lines.push(start..outer.len());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // Flexible Length Tests
    // =========================================================================

    #[test]
    fn test_resolve_empty() {
        assert!(resolve_flexible_lengths(&[], 100, 0).is_empty());
    }

    #[test]
    fn test_resolve_grow_equal() {
        let items = [
            FlexItem::new(20).grow(1.0),
            FlexItem::new(40).grow(1.0),
            FlexItem::new(10).grow(1.0),
        ];
        assert_eq!(resolve_flexible_lengths(&items, 100, 0), vec![30, 50, 20]);
    }

    #[test]
    fn test_resolve_no_grow_keeps_basis() {
        let items = [FlexItem::new(20), FlexItem::new(20)];
        assert_eq!(resolve_flexible_lengths(&items, 40, 0), vec![20, 20]);
        assert_eq!(resolve_flexible_lengths(&items, 100, 0), vec![20, 20]);
    }

    #[test]
    fn test_resolve_grow_uneven() {
        let items = [FlexItem::new(0).grow(1.0), FlexItem::new(0).grow(3.0)];
        assert_eq!(resolve_flexible_lengths(&items, 100, 0), vec![25, 75]);
    }

    #[test]
    fn test_resolve_grow_respects_gap() {
        let items = [FlexItem::new(0).grow(1.0), FlexItem::new(0).grow(1.0)];
        assert_eq!(resolve_flexible_lengths(&items, 21, 1), vec![10, 10]);
    }

    #[test]
    fn test_resolve_grow_freezes_at_max() {
        let items = [
            FlexItem::new(0).grow(1.0).bounds(0, 10),
            FlexItem::new(0).grow(1.0),
        ];
        assert_eq!(resolve_flexible_lengths(&items, 100, 0), vec![10, 90]);
    }

    #[test]
    fn test_resolve_shrink_proportional_to_basis() {
        let items = [FlexItem::new(20), FlexItem::new(60)];
        assert_eq!(resolve_flexible_lengths(&items, 40, 0), vec![10, 30]);
    }

    #[test]
    fn test_resolve_shrink_freezes_at_min() {
        let items = [FlexItem::new(30).bounds(25, u16::MAX), FlexItem::new(30)];
        assert_eq!(resolve_flexible_lengths(&items, 40, 0), vec![25, 15]);
    }

    #[test]
    fn test_resolve_zero_shrink_overflows() {
        let items = [FlexItem::new(30).shrink(0.0), FlexItem::new(30).shrink(0.0)];
        assert_eq!(resolve_flexible_lengths(&items, 40, 0), vec![30, 30]);
    }

    #[test]
    fn test_resolve_margins_are_fixed() {
        let items = [FlexItem::new(0).grow(1.0).margin(4), FlexItem::new(0).grow(1.0)];
        assert_eq!(resolve_flexible_lengths(&items, 24, 0), vec![10, 10]);
    }

    proptest! {
        #[test]
        fn prop_grow_fills_exactly(
            bases in prop::collection::vec(0u16..50, 1..8),
            extra in 0u16..200,
            gap in 0u16..3,
        ) {
            let items: Vec<FlexItem> = bases.iter().map(|&b| FlexItem::new(b).grow(1.0)).collect();
            let gaps = gap * (bases.len() as u16 - 1);
            let available = bases.iter().sum::<u16>() + gaps + extra;
            let sizes = resolve_flexible_lengths(&items, available, gap);
            prop_assert_eq!(sizes.iter().sum::<u16>() + gaps, available);
            for (size, base) in sizes.iter().zip(&bases) {
                prop_assert!(size >= base);
            }
        }

        #[test]
        fn prop_shrink_never_below_min(
            bases in prop::collection::vec(5u16..50, 1..8),
            available in 0u16..100,
        ) {
            let items: Vec<FlexItem> = bases.iter().map(|&b| FlexItem::new(b).bounds(3, u16::MAX)).collect();
            for size in resolve_flexible_lengths(&items, available, 0) {
                prop_assert!(size >= 3);
            }
        }
    }

    // =========================================================================
    // Justify Tests
    // =========================================================================

    #[test]
    fn test_justify_start_and_end() {
        assert_eq!(justify_offsets(&[10, 10], 40, 0, Justify::Start), vec![0, 10]);
        assert_eq!(justify_offsets(&[10, 10], 40, 0, Justify::End), vec![20, 30]);
    }

    #[test]
    fn test_justify_center() {
        assert_eq!(justify_offsets(&[10], 41, 0, Justify::Center), vec![15]);
    }

    #[test]
    fn test_justify_space_between() {
        assert_eq!(
            justify_offsets(&[10, 10, 10], 50, 0, Justify::SpaceBetween),
            vec![0, 20, 40]
        );
    }

    #[test]
    fn test_justify_space_between_single_child_at_start() {
        assert_eq!(justify_offsets(&[10], 50, 0, Justify::SpaceBetween), vec![0]);
    }

    #[test]
    fn test_justify_space_around() {
        // leftover 20 split 1:2:1 -> 5, 10, 5
        assert_eq!(
            justify_offsets(&[10, 10], 40, 0, Justify::SpaceAround),
            vec![5, 25]
        );
    }

    #[test]
    fn test_justify_space_evenly() {
        assert_eq!(
            justify_offsets(&[10, 10], 40, 0, Justify::SpaceEvenly),
            vec![7, 24]
        );
    }

    #[test]
    fn test_justify_overfull_packs_start() {
        assert_eq!(justify_offsets(&[30, 30], 40, 2, Justify::Center), vec![0, 32]);
    }

    // =========================================================================
    // Line Breaking Tests
    // =========================================================================

    #[test]
    fn test_break_lines() {
        assert_eq!(break_lines(&[10, 10, 10], 25, 1), vec![0..2, 2..3]);
        assert_eq!(break_lines(&[10, 10, 10], 32, 1), vec![0..3]);
    }

    #[test]
    fn test_break_lines_oversized_item_gets_own_line() {
        assert_eq!(break_lines(&[50, 5, 5], 20, 0), vec![0..1, 1..3]);
        assert!(break_lines(&[], 20, 0).is_empty());
    }
}
