use crate::options::RESTART_DELAY_MS;
use crate::range::visible_range;
use crate::store::{OnChangeCallback, StateStore};
use crate::{
    ScrollElements, ScrollError, ScrollOptions, ScrollState, SizeEstimator, Tick, VirtualRange,
};

/// A headless seamless-scroll (marquee) engine.
///
/// The engine is UI-agnostic and host-clock driven:
/// - It never owns timers. Every time-sensitive operation takes `now_ms`, and
///   the host calls [`tick`](Self::tick) once per rendered frame.
/// - It talks to the UI only through [`ScrollElements`] (measure + translate)
///   and the state-change observer.
/// - Bindings render from [`snapshot`](Self::snapshot): clone the list
///   content `min_clones` times, and under virtualization render only
///   `start_index..=end_index`.
///
/// State machine: Idle → Scrolling → Paused, with hover pause as an overlay
/// (hover-enter forces Scrolling → Paused when `hover_pause` is set,
/// hover-leave resumes).
pub struct ScrollEngine {
    options: ScrollOptions,
    store: StateStore,
    estimator: Option<SizeEstimator>,
    elements: ScrollElements,
    observed: bool,
    /// Offset captured by `pause`, restored by `resume`.
    last_position: f64,
    burst_started_ms: Option<u64>,
    last_frame_ms: Option<u64>,
    pause_until_ms: Option<u64>,
    auto_start_at_ms: Option<u64>,
}

impl ScrollEngine {
    /// Creates an engine; fails fast on an unsatisfiable sizing configuration.
    ///
    /// Construction does not touch the elements (they may not be mounted
    /// yet); call [`init`](Self::init) once the host has laid them out.
    pub fn new(
        elements: ScrollElements,
        options: ScrollOptions,
        on_change: Option<OnChangeCallback>,
    ) -> Result<Self, ScrollError> {
        options.validate()?;
        sdebug!(
            virtualized = options.is_virtualized(),
            data_total = options.data_total,
            speed = options.speed,
            "ScrollEngine::new"
        );
        let estimator = if options.is_virtualized() {
            Some(SizeEstimator::new(&options)?)
        } else {
            None
        };
        let initial = ScrollState {
            is_virtualized: options.is_virtualized(),
            item_size_list: vec![0.0; options.data_total],
            ..ScrollState::default()
        };
        Ok(Self {
            options,
            store: StateStore::new(initial, on_change),
            estimator,
            elements,
            observed: false,
            last_position: 0.0,
            burst_started_ms: None,
            last_frame_ms: None,
            pause_until_ms: None,
            auto_start_at_ms: None,
        })
    }

    pub fn options(&self) -> &ScrollOptions {
        &self.options
    }

    /// Live read-only state. Prefer [`snapshot`](Self::snapshot) when the
    /// value outlives the borrow.
    pub fn state(&self) -> &ScrollState {
        self.store.state()
    }

    pub fn snapshot(&self) -> ScrollState {
        self.store.snapshot()
    }

    /// Rejects an external direct write to a state field.
    ///
    /// Engine state can only change through engine operations; this is the
    /// explicit "you tried anyway" surface. It always returns
    /// [`ScrollError::ReadOnlyState`] and logs one warning naming `field`.
    pub fn write_state_field(&self, field: &'static str) -> Result<(), ScrollError> {
        self.store.reject_write(field)
    }

    /// First measurement + observation + auto-start, once elements exist.
    pub fn init(&mut self, now_ms: u64) {
        self.observed = true;
        self.update_size(now_ms);
        if self.options.auto_scroll && self.store.state().is_scroll_needed {
            self.auto_start_at_ms = Some(now_ms);
        }
        self.store.flush(now_ms);
    }

    /// Begins scrolling. No-op while already scrolling or while scrolling is
    /// not needed.
    pub fn start(&mut self, now_ms: u64) {
        let state = self.store.state();
        if !state.is_scroll_needed || state.is_scrolling {
            return;
        }
        strace!(now_ms, "start");
        self.store.dispatch(|s| s.is_scrolling = true);
        self.burst_started_ms = Some(now_ms);
        self.last_frame_ms = Some(now_ms);
        self.pause_until_ms = None;
        self.auto_start_at_ms = None;
        self.store.flush(now_ms);
    }

    /// Stops scrolling and cancels every pending deadline. Idempotent.
    pub fn stop(&mut self) {
        self.store.dispatch(|s| s.is_scrolling = false);
        self.clear_deadlines();
    }

    fn clear_deadlines(&mut self) {
        self.burst_started_ms = None;
        self.last_frame_ms = None;
        self.pause_until_ms = None;
        self.auto_start_at_ms = None;
    }

    /// Pauses scrolling, retaining the current offset. No-op unless scrolling.
    pub fn pause(&mut self, now_ms: u64) {
        if !self.store.state().is_scrolling {
            return;
        }
        strace!(now_ms, "pause");
        self.last_position = self.store.state().scroll_distance;
        self.store.dispatch(|s| {
            s.is_scrolling = false;
            s.is_paused = true;
        });
        self.clear_deadlines();
        self.store.flush(now_ms);
    }

    /// Resumes from a pause at the recorded offset. No-op unless paused.
    pub fn resume(&mut self, now_ms: u64) {
        if !self.store.state().is_paused {
            return;
        }
        strace!(now_ms, "resume");
        let position = self.last_position;
        self.store.dispatch(|s| {
            s.is_paused = false;
            s.scroll_distance = position;
        });
        self.apply_position();
        if !self.store.state().is_hovering {
            self.start(now_ms);
        }
        self.store.flush(now_ms);
    }

    /// Stops, rewinds to offset zero, and schedules a debounced auto-start.
    pub fn reset(&mut self, now_ms: u64) {
        self.stop();
        self.store.dispatch(|s| {
            s.is_paused = false;
            s.scroll_distance = 0.0;
        });
        self.apply_position();
        let state = self.store.state();
        if self.options.auto_scroll && state.is_scroll_needed && !state.is_hovering {
            self.auto_start_at_ms = Some(now_ms + RESTART_DELAY_MS);
        }
        self.store.flush(now_ms);
    }

    /// Turns `force_scrolling` on; starts scrolling if that newly made it
    /// needed and the engine is idle and not hovered.
    pub fn force_scroll(&mut self, now_ms: u64) {
        let was_forced = self.options.force_scrolling;
        self.options.force_scrolling = true;
        self.update_scroll_needed(now_ms);
        let state = self.store.state();
        if !was_forced && state.is_scroll_needed && !state.is_scrolling && !state.is_hovering {
            self.start(now_ms);
        }
        self.store.flush(now_ms);
    }

    /// Merges option changes, re-validating and recomputing sizes.
    ///
    /// A direction change invalidates the transform axis and every size
    /// assumption, so it triggers a reset. An unsatisfiable sizing
    /// configuration is rejected without applying anything.
    pub fn update_options(
        &mut self,
        now_ms: u64,
        f: impl FnOnce(&mut ScrollOptions),
    ) -> Result<(), ScrollError> {
        let mut next = self.options.clone();
        f(&mut next);
        next.validate()?;
        strace!(now_ms, "update_options");

        let direction_changed = next.direction != self.options.direction;
        let data_total = next.data_total;
        self.options = next;

        if self.options.is_virtualized() {
            match &mut self.estimator {
                Some(estimator) => {
                    estimator.set_sizing(&self.options);
                    estimator.set_data_total(data_total);
                }
                None => self.estimator = Some(SizeEstimator::new(&self.options)?),
            }
        } else {
            self.estimator = None;
        }
        let virtualized = self.options.is_virtualized();
        self.store.dispatch(|s| {
            s.is_virtualized = virtualized;
            if !virtualized {
                s.start_index = 0;
                s.end_index = 0;
            }
        });
        self.sync_estimator_state();

        self.update_size(now_ms);
        if direction_changed {
            self.reset(now_ms);
        }
        self.store.flush(now_ms);
        Ok(())
    }

    /// Re-measures, recomputes clones and scroll necessity, and renormalizes
    /// the offset. No-ops while the required elements are unresolvable.
    pub fn update_size(&mut self, now_ms: u64) {
        let direction = self.options.direction;
        let Some(container_size) = self
            .elements
            .container
            .resolve()
            .and_then(|el| el.measure())
            .map(|size| size.along(direction))
        else {
            return;
        };

        let content_size = match (&self.estimator, self.options.is_virtualized()) {
            (Some(estimator), true) => estimator.total_size(self.options.data_total),
            _ => {
                let Some(measured) = self
                    .elements
                    .real_list
                    .resolve()
                    .and_then(|el| el.measure())
                    .map(|size| size.along(direction))
                else {
                    return;
                };
                measured
            }
        };

        strace!(now_ms, container_size, content_size, "update_size");
        self.store.dispatch(|s| {
            s.container_size = container_size;
            s.content_size = content_size;
        });

        self.update_min_clones();
        self.update_scroll_needed(now_ms);
        self.renormalize_offset();
        if self.options.is_virtualized() {
            self.refresh_window();
        }
        self.store.flush(now_ms);
    }

    fn update_min_clones(&mut self) {
        let resolvable = self.elements.container.resolve().is_some()
            && (self.options.is_virtualized() || self.elements.real_list.resolve().is_some());
        let state = self.store.state();
        let min_clones = if !resolvable {
            0
        } else if state.content_size <= 0.0 {
            // Retain the previous value while content is mid-relayout to
            // avoid a clone-count flicker.
            state.min_clones
        } else {
            (state.container_size / state.content_size).ceil() as usize
        };
        self.store.dispatch(|s| s.min_clones = min_clones);
    }

    fn update_scroll_needed(&mut self, now_ms: u64) {
        if self.options.force_scrolling {
            self.store.dispatch(|s| s.is_scroll_needed = true);
            return;
        }
        let state = self.store.state();
        let needed = state.content_size > state.container_size;
        let was_needed = state.is_scroll_needed;
        self.store.dispatch(|s| s.is_scroll_needed = needed);
        if !needed && was_needed {
            self.reset(now_ms);
        }
    }

    /// Keeps `scroll_distance` inside `[0, content_size)` after any
    /// content-size change, including mid-scroll resizes.
    fn renormalize_offset(&mut self) {
        let state = self.store.state();
        let content = state.content_size;
        let distance = state.scroll_distance;
        if content > 0.0 {
            if distance >= content || distance < 0.0 {
                self.store
                    .dispatch(|s| s.scroll_distance = distance.rem_euclid(content));
                self.apply_position();
            }
        } else if distance != 0.0 {
            self.store.dispatch(|s| s.scroll_distance = 0.0);
            self.apply_position();
        }
    }

    /// Replaces the observed container/list elements and attaches observation.
    pub fn set_observer(
        &mut self,
        container: impl crate::ElementProvider + 'static,
        real_list: impl crate::ElementProvider + 'static,
    ) {
        self.elements.container = Box::new(container);
        self.elements.real_list = Box::new(real_list);
        self.observed = true;
    }

    /// Detaches observation; resize notifications are ignored until
    /// reattached.
    pub fn clear_observer(&mut self) {
        self.observed = false;
    }

    /// Reattaches observation to the current providers, if they resolve.
    pub fn reset_observer(&mut self) {
        if self.elements.container.resolve().is_some()
            && self.elements.real_list.resolve().is_some()
        {
            self.observed = true;
        }
    }

    /// Host-side resize notification for the observed elements.
    pub fn notify_resize(&mut self, now_ms: u64) {
        if self.observed {
            self.update_size(now_ms);
        }
    }

    /// Pointer entered the container.
    pub fn hover_enter(&mut self, now_ms: u64) {
        self.store.dispatch(|s| s.is_hovering = true);
        if self.options.hover_pause && self.store.state().is_scrolling {
            self.pause(now_ms);
        }
        self.store.flush(now_ms);
    }

    /// Pointer left the container.
    pub fn hover_leave(&mut self, now_ms: u64) {
        self.store.dispatch(|s| s.is_hovering = false);
        if self.options.hover_pause && self.store.state().is_paused {
            self.resume(now_ms);
        }
        self.store.flush(now_ms);
    }

    /// Advances the engine by one host frame.
    ///
    /// All state mutation for the frame happens synchronously inside this
    /// call. The return value tells the host loop whether to schedule another
    /// frame, sleep until a deadline, or go idle.
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        if let Some(at) = self.auto_start_at_ms {
            if now_ms >= at {
                self.auto_start_at_ms = None;
                self.start(now_ms);
            }
        }

        if self.store.state().is_scrolling {
            if let Some(until) = self.pause_until_ms {
                // Inter-burst pause: restart the burst once the deadline hits.
                if now_ms >= until {
                    self.pause_until_ms = None;
                    self.burst_started_ms = Some(now_ms);
                    self.last_frame_ms = Some(now_ms);
                }
            } else if let (Some(burst), Some(last)) = (self.burst_started_ms, self.last_frame_ms) {
                let frame_delta = now_ms.saturating_sub(last);
                self.last_frame_ms = Some(now_ms);
                if frame_delta > 0 {
                    self.advance(frame_delta as f64);
                }
                if now_ms.saturating_sub(burst) >= self.options.duration_ms {
                    if self.options.pause_time_ms > 0 {
                        self.pause_until_ms = Some(now_ms + self.options.pause_time_ms);
                        self.burst_started_ms = None;
                        self.last_frame_ms = None;
                    } else {
                        self.burst_started_ms = Some(now_ms);
                    }
                }
            }
        }

        self.store.flush(now_ms);
        self.outcome(now_ms)
    }

    fn outcome(&self, now_ms: u64) -> Tick {
        if self.store.state().is_scrolling && self.burst_started_ms.is_some() {
            return Tick::Frame;
        }
        let deadline = match (self.pause_until_ms, self.auto_start_at_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match deadline {
            Some(until_ms) => Tick::Sleep {
                until_ms: until_ms.max(now_ms),
            },
            None => Tick::Idle,
        }
    }

    /// Advances the offset by `speed × frame_delta`, wrapping seamlessly.
    fn advance(&mut self, frame_delta_ms: f64) {
        let content = self.store.state().content_size;
        if content <= 0.0 {
            return;
        }
        let step = self.options.speed / 1000.0 * frame_delta_ms;
        let mut next = self.store.state().scroll_distance + step;
        if next >= content {
            // Wrap modulo content size instead of snapping to zero, so the
            // loop boundary stays visually continuous even across multiple
            // wraps in one step.
            next %= content;
        }
        self.store.dispatch(|s| s.scroll_distance = next);
        if self.options.is_virtualized() {
            // Recompute at the wrapped offset in the same frame, or the host
            // would render one frame of stale items after the wrap.
            self.refresh_window();
        }
        self.apply_position();
    }

    fn refresh_window(&mut self) {
        let Some(estimator) = &self.estimator else {
            return;
        };
        let state = self.store.state();
        let range = visible_range(
            state.scroll_distance,
            self.options.data_total,
            state.container_size,
            self.options.virtual_scroll_buffer,
            estimator,
        );
        self.store.dispatch(|s| {
            s.start_index = range.start_index;
            s.end_index = range.end_index;
        });
    }

    fn apply_position(&mut self) {
        let Some(content) = self.elements.content.resolve() else {
            return;
        };
        let distance = self.store.state().scroll_distance;
        content.set_translation(self.options.direction, -distance);
    }

    /// Reports a real measured item size back to the estimator.
    ///
    /// Recomputes the total content size, clone count, scroll necessity and
    /// the visible window. No-op for the basic profile.
    pub fn update_item_size_list(
        &mut self,
        now_ms: u64,
        index: usize,
        size: f64,
        item_type: Option<&str>,
    ) {
        let Some(estimator) = &mut self.estimator else {
            return;
        };
        estimator.record(index, size, item_type);
        let content_size = estimator.total_size(self.options.data_total);
        self.store.dispatch(|s| s.content_size = content_size);
        self.sync_estimator_state();
        self.update_min_clones();
        self.update_scroll_needed(now_ms);
        self.renormalize_offset();
        self.refresh_window();
        self.store.flush(now_ms);
    }

    /// Predicted size for the item at `index`; `None` for the basic profile.
    pub fn predict_item_size(&self, index: usize, item_type: Option<&str>) -> Option<f64> {
        self.estimator
            .as_ref()
            .map(|estimator| estimator.predict(index, item_type))
    }

    /// The inclusive window of items a virtualized binding should render.
    ///
    /// The basic profile renders everything, so it gets the full range.
    pub fn virtual_clone_range(&self) -> VirtualRange {
        let state = self.store.state();
        if state.is_virtualized {
            VirtualRange {
                start_index: state.start_index,
                end_index: state.end_index,
            }
        } else {
            VirtualRange {
                start_index: 0,
                end_index: self.options.data_total.saturating_sub(1),
            }
        }
    }

    fn sync_estimator_state(&mut self) {
        let Some(estimator) = &self.estimator else {
            self.store.dispatch(|s| {
                s.item_size_list = Vec::new();
                s.average_size = 0.0;
                s.total_measured_items = 0;
                s.type_sizes.clear();
            });
            return;
        };
        let sizes = estimator.sizes().to_vec();
        let average = estimator.average();
        let measured = estimator.measured();
        let type_stats = estimator.type_stats().clone();
        self.store.dispatch(|s| {
            s.item_size_list = sizes;
            s.average_size = average;
            s.total_measured_items = measured;
            s.type_sizes = type_stats;
        });
    }

    /// Tears the engine down: cancels every deadline, detaches observation,
    /// drops the estimator, clears the applied transform and resets state to
    /// defaults.
    ///
    /// Safe to call repeatedly; a destroyed engine's `tick` is idle and
    /// mutates nothing. Destruction is terminal: create a new engine to
    /// scroll again.
    pub fn destroy(&mut self) {
        self.stop();
        self.observed = false;
        self.last_position = 0.0;
        self.estimator = None;
        if let Some(content) = self.elements.content.resolve() {
            content.clear_translation();
        }
        self.store.dispatch(|s| *s = ScrollState::default());
    }
}

impl core::fmt::Debug for ScrollEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollEngine")
            .field("options", &self.options)
            .field("state", self.store.state())
            .field("observed", &self.observed)
            .field("burst_started_ms", &self.burst_started_ms)
            .field("pause_until_ms", &self.pause_until_ms)
            .field("auto_start_at_ms", &self.auto_start_at_ms)
            .finish_non_exhaustive()
    }
}
