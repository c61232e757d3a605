//! Scripted local engine.
//!
//! The wire protocol of the broadcast service is out of scope here, so the
//! binary ships with a deterministic local feed: a small cast of users
//! posts on a timer, hearts and deletions land against recent comments,
//! avatar loads complete, and the stream heart counter climbs. Outbound
//! operations are acknowledged the way the service would — by pushing the
//! resulting event back through the sink.

use crate::dispatch::EventSink;
use crate::engine::{ChatEngine, ChatEvent, EngineError};
use crate::model::{Comment, CommentId, ImageRef, UserId, UserInfo};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

const BROADCASTER: UserId = UserId::new(1);
const LOGGED_IN: UserId = UserId::new(100);

const CAST: &[(u64, &str)] = &[
    (2, "rae"),
    (3, "milo"),
    (4, "tully"),
    (5, "ash"),
    (6, "vera"),
];

const LINES: &[&str] = &[
    "hello from the couch",
    "the audio is way better today",
    "LOL",
    "what did I miss?",
    "greetings from the night shift",
    "this stream is my alarm clock",
    "somebody clip that",
    "brb coffee",
];

/// How many recent comments the feed keeps around to heart and delete.
const RECENT_WINDOW: usize = 20;

struct FeedHandle {
    stop: Sender<()>,
    worker: JoinHandle<()>,
}

struct DemoState {
    next_comment: u64,
    tick: u64,
    recent: VecDeque<(CommentId, UserId)>,
    comment_hearts: HashMap<CommentId, HashSet<UserId>>,
    stream_hearts: u64,
    profiles: HashMap<UserId, UserInfo>,
    muted: Vec<UserId>,
}

struct DemoInner {
    sink: EventSink,
    interval: Duration,
    state: Mutex<DemoState>,
}

/// Offline stand-in for the broadcast service.
#[derive(Clone)]
pub struct DemoEngine {
    inner: Arc<DemoInner>,
    feed: Arc<Mutex<Option<FeedHandle>>>,
}

impl DemoEngine {
    /// Create a demo engine that pushes its feed through `sink` at the
    /// given cadence once connected.
    pub fn new(sink: EventSink, interval: Duration) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            BROADCASTER,
            UserInfo {
                id: BROADCASTER,
                name: "the host".to_string(),
                image: None,
            },
        );
        profiles.insert(
            LOGGED_IN,
            UserInfo {
                id: LOGGED_IN,
                name: "you".to_string(),
                image: None,
            },
        );
        for (raw, name) in CAST {
            let id = UserId::new(*raw);
            profiles.insert(
                id,
                UserInfo {
                    id,
                    name: (*name).to_string(),
                    image: None,
                },
            );
        }

        Self {
            inner: Arc::new(DemoInner {
                sink,
                interval,
                state: Mutex::new(DemoState {
                    next_comment: 1,
                    tick: 0,
                    recent: VecDeque::new(),
                    comment_hearts: HashMap::new(),
                    stream_hearts: 0,
                    profiles,
                    muted: Vec::new(),
                }),
            }),
            feed: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DemoState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DemoInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, DemoState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// One beat of the scripted feed.
    fn tick(&self) {
        let mut state = self.lock_state();
        let n = state.tick;
        state.tick += 1;

        let (raw_author, _) = CAST[(n as usize) % CAST.len()];
        let author = UserId::new(raw_author);
        let id = CommentId::new(state.next_comment);
        state.next_comment += 1;
        state.recent.push_back((id, author));
        if state.recent.len() > RECENT_WINDOW {
            state.recent.pop_front();
        }
        let body = LINES[(n as usize) % LINES.len()];
        self.sink
            .submit(ChatEvent::NewComment(Comment::new(id, author, body)));

        if n % 3 == 1 {
            let target = state
                .recent
                .get((n as usize) % state.recent.len())
                .map(|&(id, _)| id);
            if let Some(target) = target {
                let fan = UserId::new(CAST[((n + 2) as usize) % CAST.len()].0);
                let users = state.comment_hearts.entry(target).or_default();
                users.insert(fan);
                let users = users.clone();
                self.sink.submit(ChatEvent::CommentHearted {
                    comment: target,
                    users,
                });
            }
        }

        if n % 7 == 3 {
            if let Some((victim, _)) = state.recent.pop_front() {
                state.comment_hearts.remove(&victim);
                self.sink.submit(ChatEvent::CommentDeleted(victim));
            }
        }

        if n % 5 == 2 {
            self.load_image(&mut state, author);
        }

        if n % 4 == 0 {
            state.stream_hearts += 3;
            self.sink.submit(ChatEvent::StreamHearted {
                total: state.stream_hearts,
            });
        }

        if n % 11 == 5 {
            self.sink
                .submit(ChatEvent::SystemMessage("the host changed the scene".to_string()));
        }
    }

    /// Mark a user's avatar as loaded and announce it, once.
    fn load_image(&self, state: &mut DemoState, user: UserId) {
        let profile = state
            .profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user));
        if profile.image.is_none() {
            profile.image = Some(ImageRef::new(format!("avatar://{user}")));
            self.sink.submit(ChatEvent::ImageLoaded(user));
        }
    }
}

impl ChatEngine for DemoEngine {
    fn connect(&self) -> Result<(), EngineError> {
        let mut feed = self
            .feed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if feed.is_some() {
            warn!("demo feed already connected");
            return Ok(());
        }

        self.inner.sink.submit(ChatEvent::SystemMessage(
            "connected to the demo feed".to_string(),
        ));

        let inner = Arc::clone(&self.inner);
        let (stop, stop_rx) = mpsc::channel::<()>();
        let interval = inner.interval;
        let worker = std::thread::Builder::new()
            .name("demo-feed".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => inner.tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|err| EngineError::Connection(err.to_string()))?;

        *feed = Some(FeedHandle { stop, worker });
        info!("demo feed connected");
        Ok(())
    }

    fn disconnect(&self) {
        let handle = self
            .feed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(FeedHandle { stop, worker }) = handle {
            let _ = stop.send(());
            let _ = worker.join();
            info!("demo feed disconnected");
        }
    }

    fn save_state(&self) -> Result<(), EngineError> {
        // The demo has nothing durable to save.
        Ok(())
    }

    fn load_stream_info(&self) {
        self.inner.sink.submit(ChatEvent::BroadcastTitleChanged(
            "couch stream (demo feed)".to_string(),
        ));
    }

    fn user_info(&self, user: UserId) -> UserInfo {
        let mut state = self.lock_state();
        state
            .profiles
            .entry(user)
            .or_insert_with(|| UserInfo::unknown(user))
            .clone()
    }

    fn heart_comment(&self, comment: CommentId) {
        let mut state = self.lock_state();
        let users = state.comment_hearts.entry(comment).or_default();
        users.insert(LOGGED_IN);
        let users = users.clone();
        self.inner
            .sink
            .submit(ChatEvent::CommentHearted { comment, users });
    }

    fn unheart_comment(&self, comment: CommentId) {
        let mut state = self.lock_state();
        if let Some(users) = state.comment_hearts.get_mut(&comment) {
            users.remove(&LOGGED_IN);
            let users = users.clone();
            self.inner
                .sink
                .submit(ChatEvent::CommentHearted { comment, users });
        }
    }

    fn delete_comment(&self, comment: CommentId) {
        let mut state = self.lock_state();
        state.comment_hearts.remove(&comment);
        state.recent.retain(|(id, _)| *id != comment);
        self.inner.sink.submit(ChatEvent::CommentDeleted(comment));
    }

    fn heart_stream(&self) {
        let mut state = self.lock_state();
        state.stream_hearts += 1;
        self.inner.sink.submit(ChatEvent::StreamHearted {
            total: state.stream_hearts,
        });
    }

    fn post_comment(&self, text: &str) {
        let mut state = self.lock_state();
        let id = CommentId::new(state.next_comment);
        state.next_comment += 1;
        state.recent.push_back((id, LOGGED_IN));
        self.inner
            .sink
            .submit(ChatEvent::NewComment(Comment::new(id, LOGGED_IN, text)));
    }

    fn mute_user(&self, user: UserId) {
        let mut state = self.lock_state();
        if !state.muted.contains(&user) {
            state.muted.push(user);
        }
        info!(%user, "mute reported to service");
    }

    fn broadcaster(&self) -> UserId {
        BROADCASTER
    }

    fn logged_in_user(&self) -> Option<UserId> {
        Some(LOGGED_IN)
    }
}
