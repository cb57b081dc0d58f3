use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serenity::model::id::GuildId;
use voicelog::playback::{Clip, ClipPlayer, Completion, PlaybackQueue, PlaybackState};
use voicelog::Error;

/// Records every started clip and holds the completion of the one playing.
struct FakeConnection {
    guild_id: GuildId,
    started: Mutex<Vec<Clip>>,
    playing: Mutex<Option<Completion>>,
    overlapped: Mutex<bool>,
    broken: Vec<Clip>,
}

impl FakeConnection {
    fn new(guild: u64) -> Arc<Self> {
        Self::with_broken(guild, vec![])
    }

    fn with_broken(guild: u64, broken: Vec<Clip>) -> Arc<Self> {
        Arc::new(Self {
            guild_id: GuildId::new(guild),
            started: Mutex::new(vec![]),
            playing: Mutex::new(None),
            overlapped: Mutex::new(false),
            broken,
        })
    }

    fn started(&self) -> Vec<Clip> {
        self.started.lock().unwrap().clone()
    }

    fn take_playing(&self) -> Completion {
        self.playing
            .lock()
            .unwrap()
            .take()
            .expect("nothing is playing")
    }
}

#[async_trait]
impl ClipPlayer for FakeConnection {
    fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn play(&self, clip: &Clip, done: Completion) -> Result<(), Error> {
        if self.broken.contains(clip) {
            return Err(format!("{clip} is unavailable").into());
        }
        self.started.lock().unwrap().push(clip.clone());
        let mut playing = self.playing.lock().unwrap();
        if playing.is_some() {
            *self.overlapped.lock().unwrap() = true;
        }
        *playing = Some(done);
        Ok(())
    }
}

fn url(name: &str) -> Clip {
    Clip::Url(format!("https://tts.example/{name}"))
}

#[tokio::test]
async fn test_three_clips_play_in_order_without_overlap() {
    let queue = PlaybackQueue::new();
    let conn = FakeConnection::new(1);

    for name in ["a", "b", "c"] {
        queue.enqueue_and_play(conn.clone(), url(name)).await;
    }
    assert_eq!(conn.started(), vec![url("a")]);
    assert_eq!(queue.pending(conn.guild_id).await, 2);

    conn.take_playing().finish(None).await;
    assert_eq!(conn.started(), vec![url("a"), url("b")]);

    conn.take_playing().finish(None).await;
    assert_eq!(conn.started(), vec![url("a"), url("b"), url("c")]);

    conn.take_playing().finish(None).await;
    assert_eq!(queue.state(conn.guild_id).await, PlaybackState::Idle);
    assert!(!*conn.overlapped.lock().unwrap());
}

#[tokio::test]
async fn test_playback_error_advances_queue() {
    let queue = PlaybackQueue::new();
    let conn = FakeConnection::new(2);

    queue.enqueue_and_play(conn.clone(), url("a")).await;
    queue.enqueue_and_play(conn.clone(), url("b")).await;

    conn.take_playing()
        .finish(Some("stream closed".to_string()))
        .await;
    assert_eq!(conn.started(), vec![url("a"), url("b")]);
}

#[tokio::test]
async fn test_unplayable_clip_is_skipped() {
    let queue = PlaybackQueue::new();
    let missing = Clip::File("assets/missing.wav".into());
    let conn = FakeConnection::with_broken(3, vec![missing.clone()]);

    queue.enqueue_and_play(conn.clone(), missing).await;
    assert_eq!(queue.state(conn.guild_id).await, PlaybackState::Idle);

    queue.enqueue_and_play(conn.clone(), url("after")).await;
    assert_eq!(conn.started(), vec![url("after")]);
    assert_eq!(queue.state(conn.guild_id).await, PlaybackState::Playing);
}

#[tokio::test]
async fn test_idle_connection_restarts_on_enqueue() {
    let queue = PlaybackQueue::new();
    let conn = FakeConnection::new(4);

    queue.enqueue_and_play(conn.clone(), url("a")).await;
    conn.take_playing().finish(None).await;
    assert_eq!(queue.state(conn.guild_id).await, PlaybackState::Idle);

    queue.enqueue_and_play(conn.clone(), url("b")).await;
    assert_eq!(conn.started(), vec![url("a"), url("b")]);
}

#[tokio::test]
async fn test_connections_play_independently() {
    let queue = PlaybackQueue::new();
    let first = FakeConnection::new(10);
    let second = FakeConnection::new(20);

    queue.enqueue_and_play(first.clone(), url("first-1")).await;
    queue.enqueue_and_play(first.clone(), url("first-2")).await;
    queue.enqueue_and_play(second.clone(), url("second-1")).await;

    // both heads start without waiting on the other connection
    assert_eq!(first.started(), vec![url("first-1")]);
    assert_eq!(second.started(), vec![url("second-1")]);

    second.take_playing().finish(None).await;
    assert_eq!(queue.state(second.guild_id).await, PlaybackState::Idle);
    assert_eq!(queue.state(first.guild_id).await, PlaybackState::Playing);
    assert_eq!(queue.pending(first.guild_id).await, 1);
}

#[tokio::test]
async fn test_discard_drops_pending_clips() {
    let queue = PlaybackQueue::new();
    let conn = FakeConnection::new(5);

    queue.enqueue_and_play(conn.clone(), url("a")).await;
    queue.enqueue_and_play(conn.clone(), url("b")).await;
    queue.discard(conn.guild_id).await;

    conn.take_playing().finish(None).await;
    assert_eq!(conn.started(), vec![url("a")]);
    assert_eq!(queue.pending(conn.guild_id).await, 0);
}
