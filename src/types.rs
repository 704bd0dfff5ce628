/// Scroll axis of the marquee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

/// A measured element size in px.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The component along the scroll axis.
    pub fn along(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Vertical => self.height,
            Direction::Horizontal => self.width,
        }
    }
}

/// An inclusive window of item indexes to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
}

impl VirtualRange {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

/// Running size statistics for one item type tag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeStats {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

/// What the host loop should do after a [`crate::ScrollEngine::tick`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Animation active: schedule another frame.
    Frame,
    /// Nothing to do before `until_ms` (a pause or delayed auto-start deadline).
    Sleep { until_ms: u64 },
    /// No animation and no pending deadline.
    Idle,
}
