use std::sync::Arc;

use crate::options::NOTIFY_INTERVAL_MS;
use crate::{ScrollError, ScrollState};

/// A callback fired with a state snapshot after engine state changes.
///
/// Snapshots are clones, never live references, so reactive hosts relying on
/// referential equality see a fresh value per notification.
pub type OnChangeCallback = Arc<dyn Fn(&ScrollState) + Send + Sync>;

/// Single source of truth for [`ScrollState`].
///
/// Mutations are applied synchronously through [`dispatch`](Self::dispatch);
/// the external observer is notified at most once per
/// [`NOTIFY_INTERVAL_MS`] with the latest state (last-value-wins). Engine
/// decisions always read the live state, never the throttled copy.
pub struct StateStore {
    state: ScrollState,
    on_change: Option<OnChangeCallback>,
    last_notify_ms: Option<u64>,
    pending: bool,
}

impl StateStore {
    pub fn new(initial: ScrollState, on_change: Option<OnChangeCallback>) -> Self {
        Self {
            state: initial,
            on_change,
            last_notify_ms: None,
            pending: false,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn snapshot(&self) -> ScrollState {
        self.state.clone()
    }

    /// Applies a mutation and marks a notification as pending.
    pub fn dispatch(&mut self, f: impl FnOnce(&mut ScrollState)) {
        f(&mut self.state);
        self.pending = true;
    }

    /// Delivers the pending notification if the rate limit allows it.
    ///
    /// Suppressed flushes keep the pending flag, so the next allowed flush
    /// always carries the latest state.
    pub fn flush(&mut self, now_ms: u64) {
        if !self.pending {
            return;
        }
        if let Some(last) = self.last_notify_ms {
            if now_ms.saturating_sub(last) < NOTIFY_INTERVAL_MS {
                return;
            }
        }
        self.pending = false;
        self.last_notify_ms = Some(now_ms);
        if let Some(cb) = &self.on_change {
            let snapshot = self.state.clone();
            cb(&snapshot);
        }
    }

    /// Rejects an external direct write to a state field.
    ///
    /// This is the guard rail for hosts that try to poke engine state from
    /// the outside: the write never happens, a warning names the offending
    /// field, and the caller gets [`ScrollError::ReadOnlyState`].
    pub fn reject_write(&self, field: &'static str) -> Result<(), ScrollError> {
        swarn!(
            field,
            "state is read-only; use `update_options` to change engine behavior"
        );
        Err(ScrollError::ReadOnlyState { field })
    }
}

impl core::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("has_observer", &self.on_change.is_some())
            .field("last_notify_ms", &self.last_notify_ms)
            .field("pending", &self.pending)
            .finish()
    }
}
