// ── Tag-Cloud Sizing ───────────────────────────────────────────────────────
// Maps usage counts to display sizes by linear interpolation. Rendering
// (HTML, CSS classes) is the host application's concern; this module only
// produces the numbers.

use std::collections::BTreeMap;

/// Linearly scale usage counts into the `[min_size, max_size]` range.
///
/// With `lo`/`hi` the least/most used counts, `spread = max(hi - lo, 1)`
/// and `step = (max_size - min_size) / spread`, each entry maps to
/// `ceil(min_size + (count - lo) * step)`. The least-used entry lands on
/// `min_size`, the most-used on `max_size`; when every count is identical
/// the spread floors at 1 and everything gets `min_size`.
pub fn scale_sizes(counts: &[(i64, i64)], min_size: u32, max_size: u32) -> BTreeMap<i64, u32> {
    let mut sizes = BTreeMap::new();
    if counts.is_empty() {
        return sizes;
    }

    let lo = counts.iter().map(|&(_, c)| c).fold(i64::MAX, i64::min);
    let hi = counts.iter().map(|&(_, c)| c).fold(i64::MIN, i64::max);
    let spread = (hi - lo).max(1);
    let step = max_size.saturating_sub(min_size) as f64 / spread as f64;

    for &(id, count) in counts {
        let raw = (min_size as f64 + (count - lo) as f64 * step).ceil() as u32;
        sizes.insert(id, raw.clamp(min_size, min_size.max(max_size)));
    }
    sizes
}
