//! Events the engine pushes into the core.

use crate::model::{Comment, CommentId, UserId};
use std::collections::HashSet;

/// One asynchronous notification from the broadcast service.
///
/// A single tagged union rather than one callback per kind: subscribers
/// cannot disagree about dispatch order, and the whole stream funnels
/// through one channel to the owner context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A user posted a comment.
    NewComment(Comment),
    /// The service injected an informational line.
    SystemMessage(String),
    /// Broadcast metadata arrived or changed.
    BroadcastTitleChanged(String),
    /// An avatar image finished loading for a user.
    ImageLoaded(UserId),
    /// A comment was deleted by its author or a moderator.
    CommentDeleted(CommentId),
    /// The set of users hearting a comment changed; carries the full
    /// replacement set.
    CommentHearted {
        /// The hearted comment.
        comment: CommentId,
        /// Complete set of users currently hearting it.
        users: HashSet<UserId>,
    },
    /// The stream-wide heart counter changed.
    StreamHearted {
        /// New total for the whole stream.
        total: u64,
    },
}
