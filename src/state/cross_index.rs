//! Cross-reference index kept in lock-step with the slot pool.
//!
//! Two lookup structures: comment id → slot, and user id → the ordered set
//! of that user's currently displayed comment ids. The second exists so
//! avatar-image updates and mute actions can fan out without scanning the
//! pool. The maps are never exposed raw; the consistency invariant (a
//! comment id is in the user index iff it is a key of the comment index)
//! is enforced here at the boundary. System messages have no identity and
//! never appear in either map.

use crate::model::{CommentId, UserId};
use crate::state::SlotId;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    slot: SlotId,
    author: UserId,
}

/// Comment-id and user-id lookups over the currently displayed comments.
#[derive(Debug, Default)]
pub struct CrossIndex {
    comments: HashMap<CommentId, IndexEntry>,
    users: HashMap<UserId, BTreeSet<CommentId>>,
}

impl CrossIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a comment's slot binding.
    ///
    /// Returns `false` without touching either map when the comment id is
    /// already bound: duplicate ids from the network layer must never
    /// corrupt the index.
    pub fn bind(&mut self, comment: CommentId, author: UserId, slot: SlotId) -> bool {
        if self.comments.contains_key(&comment) {
            warn!(%comment, "rejecting duplicate comment binding");
            return false;
        }
        self.comments.insert(comment, IndexEntry { slot, author });
        self.users.entry(author).or_default().insert(comment);
        true
    }

    /// Remove a comment from both maps.
    ///
    /// Returns the slot the comment was bound to, or `None` for a stale
    /// id (already unbound or never bound). A user whose comment set
    /// becomes empty is removed entirely so the index stays bounded by
    /// what is displayed, not by every user ever seen.
    pub fn unbind(&mut self, comment: CommentId) -> Option<SlotId> {
        let entry = self.comments.remove(&comment)?;
        if let Some(set) = self.users.get_mut(&entry.author) {
            set.remove(&comment);
            if set.is_empty() {
                self.users.remove(&entry.author);
            }
        }
        Some(entry.slot)
    }

    /// Slot currently displaying the comment.
    pub fn slot_of(&self, comment: CommentId) -> Option<SlotId> {
        self.comments.get(&comment).map(|entry| entry.slot)
    }

    /// Whether the comment id is currently bound.
    pub fn contains(&self, comment: CommentId) -> bool {
        self.comments.contains_key(&comment)
    }

    /// Displayed comment ids authored by the user, in id order.
    ///
    /// Empty iterator for users with no visible comments.
    pub fn comments_by(&self, user: UserId) -> impl Iterator<Item = CommentId> + '_ {
        self.users
            .get(&user)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of bound comments.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Whether no comments are bound.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Number of users with at least one visible comment.
    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SlotContent, SlotPool};

    // SlotIds only come out of a pool, so tests mint them through one.
    fn slots(count: usize) -> Vec<SlotId> {
        let mut pool = SlotPool::new(count, 1);
        (0..count)
            .map(|_| {
                let (slot, _) = pool.acquire();
                pool.occupy(slot, SlotContent::system("x"));
                slot
            })
            .collect()
    }

    #[test]
    fn bind_then_lookup_finds_slot() {
        let mut index = CrossIndex::new();
        let s = slots(1)[0];
        assert!(index.bind(CommentId::new(1), UserId::new(7), s));
        assert_eq!(index.slot_of(CommentId::new(1)), Some(s));
    }

    #[test]
    fn duplicate_bind_is_rejected_and_keeps_existing_entry() {
        let mut index = CrossIndex::new();
        let minted = slots(2);
        assert!(index.bind(CommentId::new(1), UserId::new(7), minted[0]));
        assert!(!index.bind(CommentId::new(1), UserId::new(8), minted[1]));

        assert_eq!(index.slot_of(CommentId::new(1)), Some(minted[0]));
        // The loser's author gained no entry.
        assert_eq!(index.comments_by(UserId::new(8)).count(), 0);
    }

    #[test]
    fn unbind_removes_both_sides() {
        let mut index = CrossIndex::new();
        let s = slots(1)[0];
        index.bind(CommentId::new(1), UserId::new(7), s);

        assert_eq!(index.unbind(CommentId::new(1)), Some(s));
        assert!(!index.contains(CommentId::new(1)));
        assert_eq!(index.comments_by(UserId::new(7)).count(), 0);
    }

    #[test]
    fn unbind_of_stale_id_is_none() {
        let mut index = CrossIndex::new();
        assert_eq!(index.unbind(CommentId::new(404)), None);
    }

    #[test]
    fn unbind_is_idempotent() {
        let mut index = CrossIndex::new();
        index.bind(CommentId::new(1), UserId::new(7), slots(1)[0]);
        assert!(index.unbind(CommentId::new(1)).is_some());
        assert!(index.unbind(CommentId::new(1)).is_none());
        assert_eq!(index.tracked_users(), 0);
    }

    #[test]
    fn empty_user_entries_are_dropped_entirely() {
        let mut index = CrossIndex::new();
        let minted = slots(2);
        index.bind(CommentId::new(1), UserId::new(7), minted[0]);
        index.bind(CommentId::new(2), UserId::new(7), minted[1]);
        assert_eq!(index.tracked_users(), 1);

        index.unbind(CommentId::new(1));
        assert_eq!(index.tracked_users(), 1);
        index.unbind(CommentId::new(2));
        assert_eq!(index.tracked_users(), 0);
    }

    #[test]
    fn comments_by_returns_ids_in_order() {
        let mut index = CrossIndex::new();
        let minted = slots(3);
        index.bind(CommentId::new(5), UserId::new(7), minted[0]);
        index.bind(CommentId::new(2), UserId::new(7), minted[1]);
        index.bind(CommentId::new(9), UserId::new(7), minted[2]);

        let ids: Vec<_> = index.comments_by(UserId::new(7)).collect();
        assert_eq!(
            ids,
            vec![CommentId::new(2), CommentId::new(5), CommentId::new(9)]
        );
    }

    #[test]
    fn comments_by_unknown_user_is_empty() {
        let index = CrossIndex::new();
        assert_eq!(index.comments_by(UserId::new(1)).count(), 0);
    }
}
