//! Orchestrator for the display state.
//!
//! One operation per event kind, each applied atomically against the
//! slot pool and the cross index. Every operation is a total function
//! over current state: stale ids, duplicate ids, and capacity pressure
//! all degrade to logged no-ops because the event source is a lossy
//! network stream and transient desync with it is expected, not an
//! error. Callers must invoke these operations from the owner context
//! only (see [`crate::dispatch`]).

use crate::engine::{ChatEngine, ChatEvent};
use crate::model::{ClientSettings, Comment, CommentId, ImageRef, UserId};
use crate::state::{CrossIndex, Evicted, SlotContent, SlotId, SlotPool};
use crate::state::{DEFAULT_CAPACITY, DEFAULT_EVICTION_MARGIN};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "presenter_tests.rs"]
mod tests;

/// Applies engine events to the bounded display state and forwards
/// user moderation to the engine.
pub struct StreamPresenter {
    pool: SlotPool,
    index: CrossIndex,
    engine: Arc<dyn ChatEngine>,
    settings: ClientSettings,
    muted: HashSet<UserId>,
    stream_title: Option<String>,
    stream_hearts: u64,
    broadcaster_avatar: Option<ImageRef>,
    own_avatar: Option<ImageRef>,
}

impl StreamPresenter {
    /// Presenter with the production pool geometry.
    pub fn new(engine: Arc<dyn ChatEngine>, settings: ClientSettings) -> Self {
        Self::with_pool(engine, settings, DEFAULT_CAPACITY, DEFAULT_EVICTION_MARGIN)
    }

    /// Presenter with explicit pool geometry and empty settings.
    pub fn with_capacity(engine: Arc<dyn ChatEngine>, capacity: usize, margin: usize) -> Self {
        Self::with_pool(engine, ClientSettings::default(), capacity, margin)
    }

    /// Presenter with explicit settings and pool geometry.
    pub fn with_pool(
        engine: Arc<dyn ChatEngine>,
        settings: ClientSettings,
        capacity: usize,
        margin: usize,
    ) -> Self {
        let muted = settings.muted_users.iter().copied().collect();
        Self {
            pool: SlotPool::new(capacity, margin),
            index: CrossIndex::new(),
            engine,
            settings,
            muted,
            stream_title: None,
            stream_hearts: 0,
            broadcaster_avatar: None,
            own_avatar: None,
        }
    }

    /// Apply one engine event.
    pub fn apply(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::NewComment(comment) => self.new_comment(comment),
            ChatEvent::SystemMessage(text) => self.system_message(text),
            ChatEvent::BroadcastTitleChanged(title) => self.set_broadcast_title(title),
            ChatEvent::ImageLoaded(user) => self.update_user_image(user),
            ChatEvent::CommentDeleted(comment) => self.delete_comment(comment),
            ChatEvent::CommentHearted { comment, users } => self.update_hearts(comment, users),
            ChatEvent::StreamHearted { total } => self.set_stream_hearts(total),
        }
    }

    /// Display a freshly posted comment at the newest end.
    ///
    /// Comments from muted users are dropped before a slot is acquired.
    /// A duplicate id keeps the existing binding untouched.
    pub fn new_comment(&mut self, comment: Comment) {
        if self.muted.contains(&comment.author) {
            debug!(author = %comment.author, "dropping comment from muted user");
            return;
        }
        if self.index.contains(comment.id) {
            warn!(comment = %comment.id, "ignoring duplicate comment");
            return;
        }

        let (slot, evicted) = self.pool.acquire();
        self.purge_evicted(&evicted);

        let avatar = self.engine.user_info(comment.author).image;
        self.pool.occupy(
            slot,
            SlotContent {
                comment: Some(comment.id),
                author: Some(comment.author),
                body: comment.body,
                hearts: comment.hearts,
                avatar,
                deleted: false,
                bound_at: comment.posted_at,
            },
        );
        self.index.bind(comment.id, comment.author, slot);
    }

    /// Display an informational line from the service.
    ///
    /// System messages occupy a slot and age out like comments but have
    /// no identity, so they are invisible to both index maps.
    pub fn system_message(&mut self, text: String) {
        let (slot, evicted) = self.pool.acquire();
        self.purge_evicted(&evicted);
        self.pool.occupy(slot, SlotContent::system(text));
    }

    /// Tombstone a deleted comment.
    ///
    /// The slot keeps showing a deletion marker until it is recycled;
    /// the index entry goes away immediately so later updates against
    /// the id miss. Applying the same deletion twice is a no-op.
    pub fn delete_comment(&mut self, comment: CommentId) {
        let Some(slot) = self.index.unbind(comment) else {
            debug!(%comment, "delete for unknown comment");
            return;
        };
        if let Some(content) = self.pool.content_mut(slot) {
            content.deleted = true;
        }
    }

    /// Replace a comment's heart set.
    pub fn update_hearts(&mut self, comment: CommentId, users: HashSet<UserId>) {
        let Some(slot) = self.index.slot_of(comment) else {
            debug!(%comment, "heart update for unknown comment");
            return;
        };
        if let Some(content) = self.pool.content_mut(slot) {
            content.hearts = users;
        }
    }

    /// Fan an avatar load out to every visible comment by the user, and
    /// to the broadcaster/self header slots when the id matches.
    pub fn update_user_image(&mut self, user: UserId) {
        let image = self.engine.user_info(user).image;

        if user == self.engine.broadcaster() {
            self.broadcaster_avatar = image.clone();
        }
        if self.engine.logged_in_user() == Some(user) {
            self.own_avatar = image.clone();
        }

        let slots: Vec<SlotId> = self
            .index
            .comments_by(user)
            .filter_map(|id| self.index.slot_of(id))
            .collect();
        for slot in slots {
            if let Some(content) = self.pool.content_mut(slot) {
                content.avatar = image.clone();
            }
        }
    }

    /// Record the stream-wide heart total.
    pub fn set_stream_hearts(&mut self, total: u64) {
        self.stream_hearts = total;
    }

    /// Record the broadcast title.
    pub fn set_broadcast_title(&mut self, title: String) {
        self.stream_title = Some(title);
    }

    /// Mute a user: report to the service, persist in settings, and drop
    /// their future comments. Their visible comments stay until evicted.
    pub fn mute_user(&mut self, user: UserId) {
        if !self.muted.insert(user) {
            return;
        }
        self.settings.mute(user);
        self.engine.mute_user(user);
    }

    /// Displayed content, newest binding first.
    pub fn comments(&self) -> impl Iterator<Item = &SlotContent> {
        self.pool.iter_newest_first().map(|(_, content)| content)
    }

    /// Current broadcast title, once one has arrived.
    pub fn stream_title(&self) -> Option<&str> {
        self.stream_title.as_deref()
    }

    /// Stream-wide heart total.
    pub fn stream_hearts(&self) -> u64 {
        self.stream_hearts
    }

    /// Avatar of the broadcaster, once loaded.
    pub fn broadcaster_avatar(&self) -> Option<&ImageRef> {
        self.broadcaster_avatar.as_ref()
    }

    /// Avatar of the logged-in user, once loaded.
    pub fn own_avatar(&self) -> Option<&ImageRef> {
        self.own_avatar.as_ref()
    }

    /// Settings as they should be persisted at shutdown.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Slot currently displaying the comment, if any.
    pub fn slot_of(&self, comment: CommentId) -> Option<SlotId> {
        self.index.slot_of(comment)
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.pool.occupied()
    }

    /// Number of free slots.
    pub fn free(&self) -> usize {
        self.pool.free()
    }

    /// Pool capacity.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Number of indexed comments.
    pub fn indexed(&self) -> usize {
        self.index.len()
    }

    /// Number of users with visible comments.
    pub fn tracked_users(&self) -> usize {
        self.index.tracked_users()
    }

    /// Displayed comment ids authored by the user, in id order.
    pub fn comments_by(&self, user: UserId) -> Vec<CommentId> {
        self.index.comments_by(user).collect()
    }

    fn purge_evicted(&mut self, evicted: &[Evicted]) {
        for eviction in evicted {
            if let Some(comment) = eviction.comment {
                // Misses are expected: tombstoned slots were unbound at
                // deletion time.
                self.index.unbind(comment);
            }
        }
    }
}
