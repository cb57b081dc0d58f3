use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::GuildId;
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::{File, HttpRequest, Input};
use songbird::tracks::PlayMode;
use songbird::Call;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Clip, ClipPlayer, Completion};
use crate::Error;

/// Fires the queue completion once, on whichever of End/Error arrives first.
#[derive(Clone)]
struct TrackEndNotifier {
    done: Arc<std::sync::Mutex<Option<Completion>>>,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let error = match ctx {
            EventContext::Track(tracks) => tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(e.to_string()),
                _ => None,
            }),
            _ => None,
        };

        let done = self.done.lock().ok().and_then(|mut slot| slot.take());
        if let Some(done) = done {
            // completion callbacks must not block the driver's event thread
            tokio::spawn(async move {
                done.finish(error).await;
            });
        }

        Some(Event::Cancel)
    }
}

/// Plays clips through a songbird call.
pub struct SongbirdPlayer {
    guild_id: GuildId,
    call: Arc<Mutex<Call>>,
    http_client: reqwest::Client,
}

impl SongbirdPlayer {
    pub fn new(guild_id: GuildId, call: Arc<Mutex<Call>>, http_client: reqwest::Client) -> Self {
        Self {
            guild_id,
            call,
            http_client,
        }
    }
}

#[async_trait]
impl ClipPlayer for SongbirdPlayer {
    fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn play(&self, clip: &Clip, done: Completion) -> Result<(), Error> {
        let input: Input = match clip {
            Clip::Url(url) => HttpRequest::new(self.http_client.clone(), url.clone()).into(),
            Clip::File(path) => {
                if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                    return Err(format!("clip file not found: {}", path.display()).into());
                }
                File::new(path.clone()).into()
            }
        };

        let slot = Arc::new(std::sync::Mutex::new(Some(done)));
        let notifier = TrackEndNotifier { done: slot.clone() };

        let mut handler = self.call.lock().await;
        let track_handle = handler.play_input(input);

        let registered = track_handle
            .add_event(Event::Track(TrackEvent::End), notifier.clone())
            .and_then(|()| track_handle.add_event(Event::Track(TrackEvent::Error), notifier));
        if let Err(e) = registered {
            // the caller advances the queue itself on Err
            drop(slot.lock().ok().and_then(|mut s| s.take()));
            if let Err(stop_err) = track_handle.stop() {
                debug!("cannot stop unobserved track (guild: {}): {stop_err}", self.guild_id);
            }
            return Err(e.into());
        }

        Ok(())
    }
}
