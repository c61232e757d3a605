//! Fixed-capacity pool of reusable comment-display slots.
//!
//! The pool turns an unbounded comment stream into bounded display state.
//! Capacity is enforced proactively: when the standing margin of free slots
//! runs low, a batch of the oldest occupied slots is evicted before a new
//! acquisition is satisfied, so callers are never refused and never blocked.
//! Eviction is strictly oldest-first; hearts and recency carry no weight.

use crate::model::{CommentId, ImageRef, UserId};
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

/// Default pool capacity, sized for one screen of chat plus scrollback.
pub const DEFAULT_CAPACITY: usize = 105;

/// Default low-water margin of free slots kept ahead of demand.
///
/// Eviction frees a batch of this size at once, so a full pool under
/// sustained inserts evicts once per batch rather than once per call.
pub const DEFAULT_EVICTION_MARGIN: usize = 5;

/// Handle to one slot in the pool.
///
/// Stable for the lifetime of the pool; after the slot is evicted or
/// released the handle dangles and lookups through the index will miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// Everything a slot holds while bound.
///
/// System messages have no identity: `comment` and `author` are `None`,
/// the slot still occupies capacity and ages out with everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContent {
    /// Identity of the bound comment, `None` for system messages.
    pub comment: Option<CommentId>,
    /// Author, `None` for system messages.
    pub author: Option<UserId>,
    /// Display text.
    pub body: String,
    /// Users who hearted the bound comment.
    pub hearts: HashSet<UserId>,
    /// Cached avatar reference, refreshed by image-load fan-out.
    pub avatar: Option<ImageRef>,
    /// Set when the service deleted the comment; the tombstone stays
    /// visible until the slot is recycled.
    pub deleted: bool,
    /// When the content was bound.
    pub bound_at: DateTime<Utc>,
}

impl SlotContent {
    /// Content for a system message (no identity, no heart capability).
    pub fn system(body: impl Into<String>) -> Self {
        Self {
            comment: None,
            author: None,
            body: body.into(),
            hearts: HashSet::new(),
            avatar: None,
            deleted: false,
            bound_at: Utc::now(),
        }
    }
}

/// Identity that was displaced by low-water eviction.
///
/// Reported to the caller so the cross index can be purged; both fields
/// are `None` for system messages and may already be stale for slots
/// whose comment was deleted earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evicted {
    /// Comment id the evicted slot was bound to, if any.
    pub comment: Option<CommentId>,
    /// Author of the evicted comment, if any.
    pub author: Option<UserId>,
}

#[derive(Debug, Default)]
struct Slot {
    content: Option<SlotContent>,
}

/// Fixed-capacity pool of display slots with batched oldest-first eviction.
///
/// Invariant: `occupied() + free() == capacity()` after every operation;
/// a slot is never in both the free set and the display order.
#[derive(Debug)]
pub struct SlotPool {
    slots: Vec<Slot>,
    free: Vec<SlotId>,
    /// Display order; front is the oldest binding, back the newest.
    display: VecDeque<SlotId>,
    margin: usize,
}

impl SlotPool {
    /// Create a pool with the given capacity and low-water margin.
    ///
    /// Capacity and margin are both clamped to at least one, so an
    /// acquisition against a full pool always has a slot to evict.
    pub fn new(capacity: usize, margin: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity).map(|_| Slot::default()).collect();
        let free = (0..capacity).map(SlotId).collect();
        Self {
            slots,
            free,
            display: VecDeque::with_capacity(capacity),
            margin: margin.max(1),
        }
    }

    /// Total number of slots, free and occupied.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots, in display order.
    pub fn occupied(&self) -> usize {
        self.display.len()
    }

    /// Number of slots ready to bind.
    pub fn free(&self) -> usize {
        self.free.len()
    }

    /// Take a slot for a new binding, evicting a batch of the oldest
    /// occupied slots first if the free margin has run low.
    ///
    /// The returned evictions must be reported to the cross index before
    /// the new binding is registered. Eviction clamps to the occupied
    /// count, so a young pool never evicts slots that do not exist.
    pub fn acquire(&mut self) -> (SlotId, Vec<Evicted>) {
        let mut evicted = Vec::new();
        if self.free.len() < self.margin {
            let batch = self.margin.min(self.display.len());
            for _ in 0..batch {
                // Front of the queue is the oldest binding.
                if let Some(slot) = self.display.pop_front() {
                    evicted.push(self.clear(slot));
                    self.free.push(slot);
                }
            }
        }

        let slot = self
            .free
            .pop()
            .unwrap_or_else(|| unreachable!("margin eviction guarantees a free slot"));
        (slot, evicted)
    }

    /// Bind content to a slot obtained from [`acquire`](Self::acquire) and
    /// enqueue it at the newest end of display order.
    pub fn occupy(&mut self, slot: SlotId, content: SlotContent) {
        self.slots[slot.0].content = Some(content);
        self.display.push_back(slot);
    }

    /// Explicitly return a slot to the free set, independent of the
    /// low-water path. Unknown or already-free slots are a no-op.
    pub fn release(&mut self, slot: SlotId) {
        let Some(position) = self.display.iter().position(|s| *s == slot) else {
            return;
        };
        self.display.remove(position);
        self.clear(slot);
        self.free.push(slot);
    }

    /// Content bound to a slot, if it is occupied.
    pub fn content(&self, slot: SlotId) -> Option<&SlotContent> {
        self.slots[slot.0].content.as_ref()
    }

    /// Mutable content bound to a slot, if it is occupied.
    pub fn content_mut(&mut self, slot: SlotId) -> Option<&mut SlotContent> {
        self.slots[slot.0].content.as_mut()
    }

    /// Occupied slots and their content, newest binding first.
    ///
    /// This is the sequence a renderer presents top-to-bottom.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = (SlotId, &SlotContent)> {
        self.display
            .iter()
            .rev()
            .filter_map(|slot| self.slots[slot.0].content.as_ref().map(|c| (*slot, c)))
    }

    fn clear(&mut self, slot: SlotId) -> Evicted {
        let content = self.slots[slot.0].content.take();
        Evicted {
            comment: content.as_ref().and_then(|c| c.comment),
            author: content.as_ref().and_then(|c| c.author),
        }
    }
}
