//! Comment and user value types delivered by the chat engine.

use crate::model::{CommentId, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// A live comment as delivered by the broadcast service.
///
/// Identity is assigned by the engine; the heart set is the full set of
/// users who hearted the comment (unordered, unique) and is replaced
/// wholesale on every heart update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Service-assigned comment id, unique and monotonically increasing.
    pub id: CommentId,
    /// Author of the comment.
    pub author: UserId,
    /// Message body as posted.
    pub body: String,
    /// Users who have hearted this comment.
    pub hearts: HashSet<UserId>,
    /// When the service accepted the comment.
    pub posted_at: DateTime<Utc>,
}

impl Comment {
    /// Build a comment with an empty heart set.
    pub fn new(id: CommentId, author: UserId, body: impl Into<String>) -> Self {
        Self {
            id,
            author,
            body: body.into(),
            hearts: HashSet::new(),
            posted_at: Utc::now(),
        }
    }
}

/// Cheaply cloneable reference to a loaded avatar image.
///
/// The engine owns image bytes and caching; the core only carries an
/// opaque reference so slots can be refreshed when a load completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(Arc<str>);

impl ImageRef {
    /// Wrap an engine-provided image key (a URL or cache key).
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// The underlying image key.
    pub fn key(&self) -> &str {
        &self.0
    }
}

/// Profile information the engine holds for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// The user this profile belongs to.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar reference, present once the engine has loaded the image.
    pub image: Option<ImageRef>,
}

impl UserInfo {
    /// Profile for a user the engine knows nothing about yet.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: format!("user {id}"),
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_starts_with_no_hearts() {
        let comment = Comment::new(CommentId::new(1), UserId::new(9), "hi");
        assert!(comment.hearts.is_empty());
        assert_eq!(comment.body, "hi");
    }

    #[test]
    fn image_ref_clones_share_the_key() {
        let image = ImageRef::new("avatars/9.png");
        let copy = image.clone();
        assert_eq!(copy, image);
        assert_eq!(copy.key(), "avatars/9.png");
    }

    #[test]
    fn unknown_user_has_placeholder_name_and_no_image() {
        let info = UserInfo::unknown(UserId::new(14));
        assert_eq!(info.name, "user 14");
        assert!(info.image.is_none());
    }
}
