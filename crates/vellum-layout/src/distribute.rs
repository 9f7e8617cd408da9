//! Integer apportioning of cells by weight.

/// Split `total` cells by `weights` using the largest-remainder method.
///
/// Shares always sum to exactly `total` when at least one weight is positive;
/// otherwise every share is zero. Non-positive and non-finite weights get
/// nothing. Ties on the remainder go to the earlier index.
#[must_use]
pub fn apportion(total: u32, weights: &[f64]) -> Vec<u32> {
    let clean: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let sum: f64 = clean.iter().sum();
    if total == 0 || sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let exact: Vec<f64> = clean
        .iter()
        .map(|w| f64::from(total) * w / sum)
        .collect();
    let mut shares: Vec<u32> = exact.iter().map(|e| e.floor() as u32).collect();
    let assigned: u32 = shares.iter().sum();
    let mut leftover = total.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..shares.len()).filter(|&i| clean[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    for i in order.into_iter().cycle() {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }
    shares
}

/// Split `total` cells into `n` near-equal shares, earlier shares first.
#[must_use]
pub fn split_even(total: u32, n: usize) -> Vec<u32> {
    apportion(total, &vec![1.0; n])
}
