//! streamchat
//!
//! TUI client for live-stream chat. An external engine delivers comment,
//! heart, image-load, and moderation events from arbitrary threads; the
//! core turns that unbounded stream into a fixed-capacity, consistently
//! indexed, display-ordered collection of live comments, mutated only on
//! the owner (render) thread.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod logging;
pub mod model;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_harness;
