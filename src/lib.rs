//! A headless seamless-scroll (marquee) engine with optional virtualization.
//!
//! This crate focuses on the core algorithms behind a continuously looping
//! list: frame-rate-independent advancement, seamless wraparound modulo the
//! content size, clone-count computation, offset → index search over
//! predicted item sizes, and incremental running-average size estimation.
//!
//! It is UI-agnostic and host-clock driven. A UI layer is expected to:
//! - implement [`ElementHandle`] / [`ElementProvider`] for its container,
//!   content wrapper and real (non-cloned) list
//! - call [`ScrollEngine::tick`] once per rendered frame with a millisecond
//!   timestamp, and honor the returned [`Tick`]
//! - forward pointer and resize events
//! - render from [`ScrollState`] snapshots (clone the content `min_clones`
//!   times; under virtualization render `start_index..=end_index` only)
//!
//! ```
//! use seamless_scroll::{ScrollEngine, ScrollElements, ScrollOptions};
//! # use seamless_scroll::{Direction, ElementHandle, Size};
//! # use std::sync::Arc;
//! # struct Fixed(Size);
//! # impl ElementHandle for Fixed {
//! #     fn measure(&self) -> Option<Size> { Some(self.0) }
//! #     fn set_translation(&self, _: Direction, _: f64) {}
//! #     fn clear_translation(&self) {}
//! # }
//! # let el = |h: f64| -> Arc<dyn ElementHandle> { Arc::new(Fixed(Size::new(100.0, h))) };
//! let elements = ScrollElements::new(el(200.0), el(400.0), el(400.0));
//! let mut engine = ScrollEngine::new(elements, ScrollOptions::new(), None)?;
//! engine.init(0);
//! engine.start(0);
//! for now_ms in (16..=160).step_by(16) {
//!     engine.tick(now_ms);
//! }
//! assert!(engine.state().scroll_distance > 0.0);
//! # Ok::<(), seamless_scroll::ScrollError>(())
//! ```
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod element;
mod engine;
mod error;
mod estimator;
mod options;
mod range;
mod state;
mod store;
mod types;


pub use element::{ElementHandle, ElementProvider, ScrollElements};
pub use engine::ScrollEngine;
pub use error::ScrollError;
pub use estimator::SizeEstimator;
pub use options::{NOTIFY_INTERVAL_MS, RESTART_DELAY_MS, ScrollOptions};
pub use state::ScrollState;
pub use store::{OnChangeCallback, StateStore};
pub use types::{Direction, Size, Tick, TypeStats, VirtualRange};
