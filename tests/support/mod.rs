//! Shared engine stub for integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use streamchat::engine::{ChatEngine, EngineError};
use streamchat::model::{CommentId, ImageRef, UserId, UserInfo};

/// Engine double that answers profile queries from a preloadable cache
/// and counts stream hearts; every other operation is a no-op.
#[derive(Default)]
pub(crate) struct StubEngine {
    profiles: Mutex<HashMap<UserId, UserInfo>>,
    stream_hearts: AtomicUsize,
}

#[allow(dead_code)]
impl StubEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_profile_image(&self, user: UserId, key: &str) {
        let mut profiles = self.profiles.lock().expect("profiles lock");
        let profile = profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user));
        profile.image = Some(ImageRef::new(key));
    }

    pub(crate) fn stream_hearts_sent(&self) -> usize {
        self.stream_hearts.load(Ordering::SeqCst)
    }
}

impl ChatEngine for StubEngine {
    fn connect(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn disconnect(&self) {}

    fn save_state(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn load_stream_info(&self) {}

    fn user_info(&self, user: UserId) -> UserInfo {
        let mut profiles = self.profiles.lock().expect("profiles lock");
        profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user))
            .clone()
    }

    fn heart_comment(&self, _comment: CommentId) {}

    fn unheart_comment(&self, _comment: CommentId) {}

    fn delete_comment(&self, _comment: CommentId) {}

    fn heart_stream(&self) {
        self.stream_hearts.fetch_add(1, Ordering::SeqCst);
    }

    fn post_comment(&self, _text: &str) {}

    fn mute_user(&self, _user: UserId) {}

    fn broadcaster(&self) -> UserId {
        UserId::new(1)
    }

    fn logged_in_user(&self) -> Option<UserId> {
        Some(UserId::new(100))
    }
}
