//! Shared test doubles and builders.
//!
//! `RecordingEngine` stands in for the network collaborator: it answers
//! profile queries from a preloadable cache and records every outbound
//! operation so tests can assert on what the client asked the service
//! to do.

use crate::engine::{ChatEngine, EngineError};
use crate::model::{Comment, CommentId, ImageRef, UserId, UserInfo};
use std::collections::HashMap;
use std::sync::Mutex;

/// Build a comment with an empty heart set.
pub fn comment(id: u64, author: u64, body: &str) -> Comment {
    Comment::new(CommentId::new(id), UserId::new(author), body)
}

#[derive(Default)]
struct Recorded {
    profiles: HashMap<UserId, UserInfo>,
    stream_hearts: usize,
    muted: Vec<UserId>,
    posted: Vec<String>,
    hearted: Vec<CommentId>,
    unhearted: Vec<CommentId>,
    deleted: Vec<CommentId>,
    connects: usize,
    disconnects: usize,
    saves: usize,
}

/// Engine double that records outbound operations.
pub struct RecordingEngine {
    recorded: Mutex<Recorded>,
    broadcaster: UserId,
    logged_in: Option<UserId>,
}

impl RecordingEngine {
    /// Engine with the default identities (broadcaster 1, logged-in 100).
    pub fn new() -> Self {
        Self::with_identities(UserId::new(1), Some(UserId::new(100)))
    }

    /// Engine with explicit broadcaster and login identities.
    pub fn with_identities(broadcaster: UserId, logged_in: Option<UserId>) -> Self {
        Self {
            recorded: Mutex::new(Recorded::default()),
            broadcaster,
            logged_in,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Preload an avatar so `user_info` answers with an image.
    pub fn set_profile_image(&self, user: UserId, key: &str) {
        let mut recorded = self.lock();
        let profile = recorded
            .profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user));
        profile.image = Some(ImageRef::new(key));
    }

    /// Number of stream hearts sent so far.
    pub fn stream_hearts_sent(&self) -> usize {
        self.lock().stream_hearts
    }

    /// Users muted through the engine, in order.
    pub fn muted(&self) -> Vec<UserId> {
        self.lock().muted.clone()
    }

    /// Comment bodies posted through the engine, in order.
    pub fn posted(&self) -> Vec<String> {
        self.lock().posted.clone()
    }

    /// Comments hearted through the engine, in order.
    pub fn hearted(&self) -> Vec<CommentId> {
        self.lock().hearted.clone()
    }

    /// Comments unhearted through the engine, in order.
    pub fn unhearted(&self) -> Vec<CommentId> {
        self.lock().unhearted.clone()
    }

    /// Comments deleted through the engine, in order.
    pub fn deleted(&self) -> Vec<CommentId> {
        self.lock().deleted.clone()
    }

    /// Connect/disconnect/save-state call counts.
    pub fn lifecycle_counts(&self) -> (usize, usize, usize) {
        let recorded = self.lock();
        (recorded.connects, recorded.disconnects, recorded.saves)
    }
}

impl ChatEngine for RecordingEngine {
    fn connect(&self) -> Result<(), EngineError> {
        self.lock().connects += 1;
        Ok(())
    }

    fn disconnect(&self) {
        self.lock().disconnects += 1;
    }

    fn save_state(&self) -> Result<(), EngineError> {
        self.lock().saves += 1;
        Ok(())
    }

    fn load_stream_info(&self) {}

    fn user_info(&self, user: UserId) -> UserInfo {
        let mut recorded = self.lock();
        recorded
            .profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user))
            .clone()
    }

    fn heart_comment(&self, comment: CommentId) {
        self.lock().hearted.push(comment);
    }

    fn unheart_comment(&self, comment: CommentId) {
        self.lock().unhearted.push(comment);
    }

    fn delete_comment(&self, comment: CommentId) {
        self.lock().deleted.push(comment);
    }

    fn heart_stream(&self) {
        self.lock().stream_hearts += 1;
    }

    fn post_comment(&self, text: &str) {
        self.lock().posted.push(text.to_string());
    }

    fn mute_user(&self, user: UserId) {
        self.lock().muted.push(user);
    }

    fn broadcaster(&self) -> UserId {
        self.broadcaster
    }

    fn logged_in_user(&self) -> Option<UserId> {
        self.logged_in
    }
}
