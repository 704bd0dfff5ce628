use crate::{SizeEstimator, VirtualRange};

/// Measured-coverage threshold above which the offset search switches from a
/// linear scan to binary search over cumulative predicted offsets.
pub(crate) const BINARY_SEARCH_COVERAGE: f64 = 0.7;

/// Computes the inclusive window of items to render for a scroll offset.
///
/// `buffer` items are added on each side of the strictly-visible span. Both
/// ends are clamped to `[0, total - 1]`.
pub(crate) fn visible_range(
    offset: f64,
    total: usize,
    container_size: f64,
    buffer: usize,
    estimator: &SizeEstimator,
) -> VirtualRange {
    if total == 0 {
        return VirtualRange::default();
    }

    if let Some(item_size) = estimator.item_size() {
        return fixed_size_range(offset, total, container_size, buffer, item_size);
    }

    let start = if estimator.coverage() >= BINARY_SEARCH_COVERAGE {
        start_index_binary(offset, total, estimator)
    } else {
        start_index_linear(offset, total, estimator)
    };

    // Cover the viewport from `start`, then pad.
    let mut end = start;
    let mut covered = estimator.predict(start, None);
    while covered < container_size && end + 1 < total {
        end += 1;
        covered += estimator.predict(end, None);
    }
    end = (end + buffer).min(total - 1);

    VirtualRange {
        start_index: start.saturating_sub(buffer).min(total - 1),
        end_index: end,
    }
}

fn fixed_size_range(
    offset: f64,
    total: usize,
    container_size: f64,
    buffer: usize,
    item_size: f64,
) -> VirtualRange {
    if item_size <= 0.0 {
        return VirtualRange {
            start_index: 0,
            end_index: total - 1,
        };
    }
    let start = (offset / item_size).floor() as usize % total;
    let visible_count = (container_size / item_size).ceil() as usize;
    let end = (start + visible_count + 2 * buffer).min(total - 1);
    VirtualRange {
        start_index: start.saturating_sub(buffer).min(total - 1),
        end_index: end,
    }
}

/// Offset of the start of `index`: the sum of predicted sizes before it.
///
/// Recomputed per call; with binary search this makes the lookup
/// O(n log n). Prefix-sum caching would reduce it, but measured sizes churn
/// while the list is animating, so the simple form is kept.
fn offset_of(index: usize, estimator: &SizeEstimator) -> f64 {
    (0..index).map(|i| estimator.predict(i, None)).sum()
}

/// First index whose span reaches `offset`, by binary search over predicted
/// start offsets. Valid because predicted offsets are monotonic once sizes
/// are stable, which high measured coverage approximates.
fn start_index_binary(offset: f64, total: usize, estimator: &SizeEstimator) -> usize {
    let mut lo = 0usize;
    let mut hi = total - 1;
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if offset_of(mid, estimator) <= offset {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Linear fallback for sparse measurements: accumulate predicted sizes until
/// the running offset reaches the target.
fn start_index_linear(offset: f64, total: usize, estimator: &SizeEstimator) -> usize {
    let mut running = 0.0;
    for index in 0..total {
        let next = running + estimator.predict(index, None);
        if next > offset {
            return index;
        }
        running = next;
    }
    total - 1
}
