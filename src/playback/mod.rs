pub mod clip;
pub mod player;

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::GuildId;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::Error;

/// Audio source streamed into a voice connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Clip {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// The voice connection side of playback.
#[async_trait]
pub trait ClipPlayer: Send + Sync {
    fn guild_id(&self) -> GuildId;

    /// Starts streaming `clip`. Once playback stops, successfully or not, the player
    /// must call [`Completion::finish`] on `done` exactly once. When this returns `Err`
    /// the clip never started and `done` is dropped unused.
    async fn play(&self, clip: &Clip, done: Completion) -> Result<(), Error>;
}

struct ConnectionQueue {
    clips: VecDeque<Clip>,
    state: PlaybackState,
    generation: u64,
}

/// Completion callback for the clip currently playing on one connection.
pub struct Completion {
    queue: PlaybackQueue,
    player: Arc<dyn ClipPlayer>,
    generation: u64,
}

impl Completion {
    pub async fn finish(self, error: Option<String>) {
        let guild_id = self.player.guild_id();
        if let Some(e) = error {
            error!("clip playback failed (guild: {guild_id}): {e}");
        }
        if let Some(next) = self.queue.advance(guild_id, self.generation).await {
            self.queue.start(self.player, next, self.generation).await;
        }
    }
}

/// Serializes clip playback per voice connection.
#[derive(Clone, Default)]
pub struct PlaybackQueue {
    queues: Arc<RwLock<HashMap<GuildId, ConnectionQueue>>>,
    generations: Arc<AtomicU64>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `clip` and starts it right away when the connection is idle.
    pub async fn enqueue_and_play(&self, player: Arc<dyn ClipPlayer>, clip: Clip) {
        let guild_id = player.guild_id();
        let start = {
            let mut queues = self.queues.write().await;
            let queue = queues.entry(guild_id).or_insert_with(|| ConnectionQueue {
                clips: VecDeque::new(),
                state: PlaybackState::Idle,
                generation: self.generations.fetch_add(1, Ordering::Relaxed),
            });
            queue.clips.push_back(clip);
            match queue.state {
                PlaybackState::Idle => {
                    queue.state = PlaybackState::Playing;
                    queue.clips.pop_front().map(|c| (c, queue.generation))
                }
                PlaybackState::Playing => None,
            }
        };

        if let Some((clip, generation)) = start {
            self.start(player, clip, generation).await;
        }
    }

    /// Drops the connection's queue along with its pending clips.
    pub async fn discard(&self, guild_id: GuildId) {
        let mut queues = self.queues.write().await;
        if let Some(queue) = queues.remove(&guild_id) {
            debug!(
                "discarded {} pending clips (guild: {guild_id})",
                queue.clips.len()
            );
        }
    }

    pub async fn state(&self, guild_id: GuildId) -> PlaybackState {
        let queues = self.queues.read().await;
        queues.get(&guild_id).map_or(PlaybackState::Idle, |q| q.state)
    }

    pub async fn pending(&self, guild_id: GuildId) -> usize {
        let queues = self.queues.read().await;
        queues.get(&guild_id).map_or(0, |q| q.clips.len())
    }

    async fn start(&self, player: Arc<dyn ClipPlayer>, first: Clip, generation: u64) {
        let guild_id = player.guild_id();
        let mut clip = first;
        loop {
            let done = Completion {
                queue: self.clone(),
                player: player.clone(),
                generation,
            };
            match player.play(&clip, done).await {
                Ok(()) => {
                    debug!("playing {clip} (guild: {guild_id})");
                    return;
                }
                Err(e) => {
                    error!("cannot play {clip} (guild: {guild_id}): {e}");
                    match self.advance(guild_id, generation).await {
                        Some(next) => clip = next,
                        None => return,
                    }
                }
            }
        }
    }

    /// Pops the next clip, or goes idle when drained. Stale generations are ignored.
    async fn advance(&self, guild_id: GuildId, generation: u64) -> Option<Clip> {
        let mut queues = self.queues.write().await;
        let queue = queues.get_mut(&guild_id)?;
        if queue.generation != generation {
            return None;
        }
        let next = queue.clips.pop_front();
        if next.is_none() {
            queue.state = PlaybackState::Idle;
        }
        next
    }
}
