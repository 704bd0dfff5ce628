use std::collections::HashMap;

use crate::TypeStats;

/// The full observable state of a [`crate::ScrollEngine`].
///
/// The engine owns the single mutable instance; everything handed out is a
/// clone, so reactive hosts get referential-inequality snapshots and nothing
/// external can mutate the engine (see
/// [`crate::ScrollEngine::write_state_field`] for the rejected-write path).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub is_scrolling: bool,
    pub is_paused: bool,
    pub is_hovering: bool,
    pub is_scroll_needed: bool,
    /// Current translation offset, kept in `[0, content_size)`.
    pub scroll_distance: f64,
    pub content_size: f64,
    pub container_size: f64,
    /// Full content copies needed to cover the viewport during the wrap.
    pub min_clones: usize,
    /// Virtualized window start (inclusive).
    pub start_index: usize,
    /// Virtualized window end (inclusive).
    pub end_index: usize,
    pub is_virtualized: bool,
    /// Measured size per index; `0.0` means unmeasured.
    pub item_size_list: Vec<f64>,
    /// Running mean of measured sizes.
    pub average_size: f64,
    pub total_measured_items: usize,
    /// Running per-type size statistics.
    pub type_sizes: HashMap<String, TypeStats>,
}
