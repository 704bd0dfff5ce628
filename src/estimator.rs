use std::collections::HashMap;

use crate::{ScrollError, ScrollOptions, TypeStats};

/// Predicts item sizes for the virtualized profile and keeps running
/// statistics as real measurements arrive.
///
/// A slot of `0.0` in [`sizes`](Self::sizes) means "unmeasured". Averages are
/// maintained incrementally (count-weighted), never by re-summing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SizeEstimator {
    item_size: Option<f64>,
    min_item_size: Option<f64>,
    sizes: Vec<f64>,
    average: f64,
    measured: usize,
    type_stats: HashMap<String, TypeStats>,
    /// Last `item_type` tag seen per index, for moving contributions between
    /// tags when an item is re-measured under a new one.
    types: HashMap<usize, String>,
}

impl SizeEstimator {
    pub fn new(options: &ScrollOptions) -> Result<Self, ScrollError> {
        if options.item_size.is_none() && options.min_item_size.is_none() {
            return Err(ScrollError::MissingItemSize);
        }
        sdebug!(
            data_total = options.data_total,
            item_size = options.item_size,
            min_item_size = options.min_item_size,
            "SizeEstimator::new"
        );
        Ok(Self {
            item_size: options.item_size,
            min_item_size: options.min_item_size,
            sizes: vec![0.0; options.data_total],
            average: 0.0,
            measured: 0,
            type_stats: HashMap::new(),
            types: HashMap::new(),
        })
    }

    fn floor_size(&self) -> f64 {
        self.min_item_size.unwrap_or(0.0)
    }

    pub fn item_size(&self) -> Option<f64> {
        self.item_size
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn measured(&self) -> usize {
        self.measured
    }

    pub fn type_stats(&self) -> &HashMap<String, TypeStats> {
        &self.type_stats
    }

    /// Fraction of items with a real measurement, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        if self.sizes.is_empty() {
            0.0
        } else {
            self.measured as f64 / self.sizes.len() as f64
        }
    }

    /// Predicts the size of the item at `index`.
    ///
    /// Priority: fixed configured size, then the real measurement at `index`,
    /// then the `item_type` average, then the global average, then the
    /// configured floor. Every non-fixed source is floored at `min_item_size`.
    pub fn predict(&self, index: usize, item_type: Option<&str>) -> f64 {
        if let Some(fixed) = self.item_size {
            return fixed;
        }
        let floor = self.floor_size();
        if let Some(&measured) = self.sizes.get(index) {
            if measured > 0.0 {
                return measured.max(floor);
            }
        }
        if let Some(stats) = item_type.and_then(|t| self.type_stats.get(t)) {
            if stats.average > 0.0 {
                return stats.average.max(floor);
            }
        }
        if self.average > 0.0 {
            return self.average.max(floor);
        }
        floor
    }

    /// Records a real measured size for the item at `index`.
    ///
    /// The size is clamped to `min_item_size` before any bookkeeping, so the
    /// averages only ever see values the engine would actually use.
    /// Re-measuring under a different `item_type` moves the item's
    /// contribution from the old tag to the new one. Out-of-range indexes
    /// are ignored.
    pub fn record(&mut self, index: usize, size: f64, item_type: Option<&str>) {
        let Some(slot) = self.sizes.get(index).copied() else {
            swarn!(index, len = self.sizes.len(), "record: index out of range");
            return;
        };
        let size = size.max(self.floor_size());
        strace!(index, size, first = slot <= 0.0, "record");
        self.sizes[index] = size;

        if slot <= 0.0 {
            self.measured += 1;
            self.average += (size - self.average) / self.measured as f64;
        } else if self.measured > 0 {
            self.average += (size - slot) / self.measured as f64;
        }

        let old_tag = self.types.get(&index).cloned();
        let tag_changed = old_tag.as_deref() != item_type;
        if tag_changed {
            if let Some(old) = old_tag {
                if slot > 0.0 {
                    self.retract_from_type(&old, slot);
                }
                self.types.remove(&index);
            }
        }

        if let Some(tag) = item_type {
            let stats = self.type_stats.entry(tag.to_owned()).or_default();
            if slot <= 0.0 || tag_changed || stats.count == 0 {
                stats.count += 1;
                stats.total += size;
            } else {
                stats.total += size - slot;
            }
            stats.average = stats.total / stats.count as f64;
            self.types.insert(index, tag.to_owned());
        }
    }

    /// Removes one superseded measurement from a tag's statistics.
    fn retract_from_type(&mut self, tag: &str, size: f64) {
        let emptied = match self.type_stats.get_mut(tag) {
            Some(stats) => {
                stats.count = stats.count.saturating_sub(1);
                stats.total -= size;
                if stats.count > 0 {
                    stats.average = stats.total / stats.count as f64;
                }
                stats.count == 0
            }
            None => false,
        };
        if emptied {
            self.type_stats.remove(tag);
        }
    }

    /// Total predicted content size across `data_total` items.
    pub fn total_size(&self, data_total: usize) -> f64 {
        if let Some(fixed) = self.item_size {
            return data_total as f64 * fixed;
        }
        (0..data_total).map(|i| self.predict(i, None)).sum()
    }

    /// Grows or shrinks the measurement list when `data_total` changes,
    /// recomputing the running statistics from the surviving slots.
    pub fn set_data_total(&mut self, data_total: usize) {
        if data_total == self.sizes.len() {
            return;
        }
        self.sizes.resize(data_total, 0.0);
        self.types.retain(|&index, _| index < data_total);
        self.rebuild_stats();
    }

    /// Applies merged `item_size`/`min_item_size` changes.
    ///
    /// Measured sizes are re-clamped to the new floor and the running
    /// statistics rebuilt, so predictions follow the merged options rather
    /// than the construction-time ones.
    pub fn set_sizing(&mut self, options: &ScrollOptions) {
        if self.item_size == options.item_size && self.min_item_size == options.min_item_size {
            return;
        }
        strace!(
            item_size = options.item_size,
            min_item_size = options.min_item_size,
            "set_sizing"
        );
        self.item_size = options.item_size;
        self.min_item_size = options.min_item_size;
        let floor = self.floor_size();
        for size in &mut self.sizes {
            if *size > 0.0 {
                *size = (*size).max(floor);
            }
        }
        self.rebuild_stats();
    }

    /// Recomputes global and per-type statistics from the size slots.
    fn rebuild_stats(&mut self) {
        let mut measured = 0usize;
        let mut total = 0.0f64;
        for &size in &self.sizes {
            if size > 0.0 {
                measured += 1;
                total += size;
            }
        }
        self.measured = measured;
        self.average = if measured > 0 {
            total / measured as f64
        } else {
            0.0
        };

        let mut type_stats: HashMap<String, TypeStats> = HashMap::new();
        for (&index, tag) in &self.types {
            let size = self.sizes[index];
            if size > 0.0 {
                let stats = type_stats.entry(tag.clone()).or_default();
                stats.count += 1;
                stats.total += size;
            }
        }
        for stats in type_stats.values_mut() {
            stats.average = stats.total / stats.count as f64;
        }
        self.type_stats = type_stats;
    }
}
