//! Core identifier newtypes.
//!
//! The broadcast service assigns integer ids to comments and users; the
//! newtypes keep the two id spaces from being mixed up. Raw integers are
//! only unwrapped at the service boundary.

use std::fmt;

/// Unique identifier for a comment, assigned monotonically by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentId(u64);

impl CommentId {
    /// Wrap a raw comment id from the service.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer value, for the service boundary.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user of the broadcast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw user id from the service.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer value, for the service boundary.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
