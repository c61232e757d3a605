//! The chat engine collaborator boundary.
//!
//! The network protocol, credential handling, and image loading all live
//! behind [`ChatEngine`]; the core only sees the trait's operations and
//! the [`ChatEvent`]s the engine pushes through an
//! [`EventSink`](crate::dispatch::EventSink). Engine callbacks may arrive
//! on any thread — nothing here touches display state directly.

mod demo;
mod events;
mod heartbeat;

pub use demo::DemoEngine;
pub use events::ChatEvent;
pub use heartbeat::AutoHeart;

use crate::model::{CommentId, UserId, UserInfo};
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Display-event application never errors; these cover the explicit
/// operations the client invokes on the collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not reach the broadcast service.
    #[error("connection to broadcast service failed: {0}")]
    Connection(String),

    /// Persisting engine-side state failed.
    #[error("failed to save engine state: {0}")]
    SaveState(String),
}

/// Operations the client invokes on the broadcast-service collaborator.
///
/// Implementations must be callable from any thread; query methods answer
/// from engine-side caches and never block on I/O. Work with side effects
/// (image loads, posts) completes asynchronously and reports back through
/// events.
pub trait ChatEngine: Send + Sync {
    /// Open the event feed. Events start arriving after this returns.
    fn connect(&self) -> Result<(), EngineError>;

    /// Close the event feed.
    fn disconnect(&self);

    /// Persist engine-side state before shutdown.
    fn save_state(&self) -> Result<(), EngineError>;

    /// Ask the service for current broadcast metadata; the answer arrives
    /// as a broadcast-title event.
    fn load_stream_info(&self);

    /// Cached profile for a user. Kicks off an avatar load if the image
    /// is not cached yet; completion arrives as an image-loaded event.
    fn user_info(&self, user: UserId) -> UserInfo;

    /// Heart a comment as the logged-in user.
    fn heart_comment(&self, comment: CommentId);

    /// Remove this user's heart from a comment.
    fn unheart_comment(&self, comment: CommentId);

    /// Ask the service to delete a comment (moderation).
    fn delete_comment(&self, comment: CommentId);

    /// Heart the stream itself.
    fn heart_stream(&self);

    /// Post a comment as the logged-in user.
    fn post_comment(&self, text: &str);

    /// Report a mute to the service.
    fn mute_user(&self, user: UserId);

    /// The user the broadcast belongs to.
    fn broadcaster(&self) -> UserId;

    /// Currently logged-in user, if any.
    fn logged_in_user(&self) -> Option<UserId>;
}
