//! Owner-context event marshaling.
//!
//! Engine callbacks arrive on network threads; display state may only be
//! mutated on the owner (render) thread. Instead of every entry point
//! branching on "am I on the owner context", producers get a cloneable
//! [`EventSink`] and submit fire-and-forget; the owner thread drains the
//! queue once per turn and applies events in arrival order. Mutation is
//! thereby single-writer with no locks inside the core.

use crate::engine::ChatEvent;
use crate::state::StreamPresenter;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, trace};

/// Producer half: submit events from any thread.
///
/// Submission never blocks and never waits for the event to be applied;
/// display events are fire-and-forget by design.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<ChatEvent>,
}

impl EventSink {
    /// Queue an event for the owner context.
    ///
    /// Dropped silently if the owner loop has already shut down — late
    /// callbacks during teardown are expected, not an error.
    pub fn submit(&self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            trace!("event dropped: owner loop has shut down");
        }
    }
}

/// Consumer half: owned by the render loop, the single place display
/// state is allowed to change.
#[derive(Debug)]
pub struct EventMarshal {
    rx: Receiver<ChatEvent>,
}

impl EventMarshal {
    /// Create a connected sink/marshal pair.
    pub fn channel() -> (EventSink, EventMarshal) {
        let (tx, rx) = mpsc::channel();
        (EventSink { tx }, EventMarshal { rx })
    }

    /// Apply every queued event to the presenter, in arrival order.
    ///
    /// Returns the number of events applied so the caller knows whether
    /// a redraw is needed. Never blocks: an empty queue returns zero
    /// immediately. Must be called from the owner context only — the
    /// receiver is deliberately not `Sync`.
    pub fn drain(&mut self, presenter: &mut StreamPresenter) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            presenter.apply(event);
            applied += 1;
        }
        if applied > 0 {
            debug!(applied, "applied queued chat events");
        }
        applied
    }

    /// Pull one queued event without applying it; lets engine tests
    /// assert on the raw feed.
    #[cfg(test)]
    pub(crate) fn try_next(&self) -> Option<ChatEvent> {
        self.rx.try_recv().ok()
    }
}
