use crate::{Direction, ScrollError};

/// Delay between `reset` and the debounced auto-start, letting the host
/// layout settle first.
pub const RESTART_DELAY_MS: u64 = 100;

/// Minimum interval between observer notifications (~60 per second).
pub const NOTIFY_INTERVAL_MS: u64 = 16;

/// Configuration for [`crate::ScrollEngine`].
///
/// Options are merged through [`crate::ScrollEngine::update_options`]; the
/// engine re-validates and recomputes sizes after every merge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollOptions {
    /// Scroll axis.
    pub direction: Direction,
    /// Scroll speed in px per second.
    pub speed: f64,
    /// Duration of one animation burst in ms.
    pub duration_ms: u64,
    /// Pause between bursts in ms (`0` scrolls continuously).
    pub pause_time_ms: u64,
    /// Pause while the pointer hovers the container.
    pub hover_pause: bool,
    /// Start scrolling automatically once sizes are known.
    pub auto_scroll: bool,
    /// Scroll even when the content does not overflow the container.
    pub force_scrolling: bool,
    /// Extra items rendered on each side of the visible window.
    pub virtual_scroll_buffer: usize,
    /// Fixed item size in px. Enables the O(1) fast paths.
    pub item_size: Option<f64>,
    /// Floor for measured/predicted item sizes in px.
    pub min_item_size: Option<f64>,
    /// Dataset length. Non-zero only for the virtualized profile.
    pub data_total: usize,
}

impl ScrollOptions {
    /// Options for the basic (non-virtualized) profile.
    pub fn new() -> Self {
        Self {
            direction: Direction::Vertical,
            speed: 50.0,
            duration_ms: 500,
            pause_time_ms: 2000,
            hover_pause: true,
            auto_scroll: true,
            force_scrolling: false,
            virtual_scroll_buffer: 5,
            item_size: None,
            min_item_size: None,
            data_total: 0,
        }
    }

    /// Options for the virtualized profile.
    ///
    /// `data_total` is the dataset length. At least one of
    /// [`with_item_size`](Self::with_item_size) /
    /// [`with_min_item_size`](Self::with_min_item_size) must also be set or
    /// engine construction fails with [`ScrollError::MissingItemSize`].
    pub fn virtualized(data_total: usize) -> Self {
        Self {
            force_scrolling: true,
            data_total,
            ..Self::new()
        }
    }

    pub fn is_virtualized(&self) -> bool {
        self.data_total > 0
    }

    /// Checks that the configuration can determine item sizing.
    ///
    /// A virtualized profile with neither `item_size` nor `min_item_size` can
    /// never place items, which is a programmer error rather than a runtime
    /// condition, so it is fatal at construction/update time.
    pub fn validate(&self) -> Result<(), ScrollError> {
        if self.is_virtualized() && self.item_size.is_none() && self.min_item_size.is_none() {
            return Err(ScrollError::MissingItemSize);
        }
        Ok(())
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_pause_time_ms(mut self, pause_time_ms: u64) -> Self {
        self.pause_time_ms = pause_time_ms;
        self
    }

    pub fn with_hover_pause(mut self, hover_pause: bool) -> Self {
        self.hover_pause = hover_pause;
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: bool) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    pub fn with_force_scrolling(mut self, force_scrolling: bool) -> Self {
        self.force_scrolling = force_scrolling;
        self
    }

    pub fn with_virtual_scroll_buffer(mut self, virtual_scroll_buffer: usize) -> Self {
        self.virtual_scroll_buffer = virtual_scroll_buffer;
        self
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn with_min_item_size(mut self, min_item_size: f64) -> Self {
        self.min_item_size = Some(min_item_size);
        self
    }

    pub fn with_data_total(mut self, data_total: usize) -> Self {
        self.data_total = data_total;
        self
    }
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self::new()
    }
}
