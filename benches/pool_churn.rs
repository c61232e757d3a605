//! Slot pool churn under sustained comment load.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use streamchat::engine::{ChatEngine, EngineError};
use streamchat::model::{Comment, CommentId, UserId, UserInfo};
use streamchat::state::StreamPresenter;

struct NullEngine;

impl ChatEngine for NullEngine {
    fn connect(&self) -> Result<(), EngineError> {
        Ok(())
    }
    fn disconnect(&self) {}
    fn save_state(&self) -> Result<(), EngineError> {
        Ok(())
    }
    fn load_stream_info(&self) {}
    fn user_info(&self, user: UserId) -> UserInfo {
        UserInfo::unknown(user)
    }
    fn heart_comment(&self, _comment: CommentId) {}
    fn unheart_comment(&self, _comment: CommentId) {}
    fn delete_comment(&self, _comment: CommentId) {}
    fn heart_stream(&self) {}
    fn post_comment(&self, _text: &str) {}
    fn mute_user(&self, _user: UserId) {}
    fn broadcaster(&self) -> UserId {
        UserId::new(1)
    }
    fn logged_in_user(&self) -> Option<UserId> {
        None
    }
}

fn pool_churn(c: &mut Criterion) {
    c.bench_function("insert_10k_comments_into_105_slot_pool", |b| {
        b.iter(|| {
            let mut presenter = StreamPresenter::with_capacity(Arc::new(NullEngine), 105, 5);
            for id in 0..10_000u64 {
                presenter.new_comment(Comment::new(
                    CommentId::new(id),
                    UserId::new(id % 50),
                    "benchmark comment body",
                ));
            }
            black_box(presenter.occupied())
        })
    });

    c.bench_function("delete_heavy_churn", |b| {
        b.iter(|| {
            let mut presenter = StreamPresenter::with_capacity(Arc::new(NullEngine), 105, 5);
            for id in 0..5_000u64 {
                presenter.new_comment(Comment::new(
                    CommentId::new(id),
                    UserId::new(id % 50),
                    "benchmark comment body",
                ));
                if id % 3 == 0 {
                    presenter.delete_comment(CommentId::new(id / 2));
                }
            }
            black_box(presenter.indexed())
        })
    });
}

criterion_group!(benches, pool_churn);
criterion_main!(benches);
