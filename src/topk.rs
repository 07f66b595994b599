//! Deterministic top-k selection shared by every question and backend.

use std::cmp::Ordering;

/// Ranking order: count descending, then key ascending.
#[inline]
pub fn rank_order<K: Ord>(a: &(K, u64), b: &(K, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Keep the `k` best `(key, count)` pairs under [`rank_order`], sorted.
///
/// Keys are assumed distinct (they come from a frequency table), which makes
/// the order total. Returns exactly `min(k, n)` entries; `k == 0` is empty.
pub fn top_k<K, I>(entries: I, k: usize) -> Vec<(K, u64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, u64)>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut v: Vec<(K, u64)> = entries.into_iter().collect();
    if v.len() > k {
        v.select_nth_unstable_by(k - 1, rank_order);
        v.truncate(k);
    }
    v.sort_unstable_by(rank_order);
    v
}
