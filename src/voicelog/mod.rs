pub mod gateway;
pub mod setup;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::lang::{Lang, MessageKey};
use crate::playback::clip::{ClipEvent, ClipResolver};
use crate::playback::{ClipPlayer, PlaybackQueue};
use crate::settings::SettingsStore;
use crate::Error;

#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: Option<String>,
}

impl ChannelRef {
    fn name(&self) -> Result<&str, Error> {
        self.name
            .as_deref()
            .ok_or_else(|| format!("cannot resolve name of channel {}", self.id).into())
    }
}

/// One voice presence change. `None` means "not in any voice channel".
#[derive(Clone, Debug)]
pub struct VoiceTransition {
    pub guild_id: GuildId,
    pub member: MemberInfo,
    pub before: Option<ChannelRef>,
    pub after: Option<ChannelRef>,
}

impl VoiceTransition {
    fn before_id(&self) -> Option<ChannelId> {
        self.before.as_ref().map(|c| c.id)
    }

    fn after_id(&self) -> Option<ChannelId> {
        self.after.as_ref().map(|c| c.id)
    }

    fn involves(&self, channel_id: ChannelId) -> bool {
        self.before_id() == Some(channel_id) || self.after_id() == Some(channel_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Joined,
    Left,
    Moved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub avatar_url: Option<String>,
}

impl Notification {
    pub fn color(&self) -> u32 {
        match self.kind {
            NotificationKind::Joined => 0x417505,
            NotificationKind::Left => 0x810011,
            NotificationKind::Moved => 0x9f6d16,
        }
    }
}

/// Extra connect attempts after a failed auto-rejoin or startup reconnect.
pub const REJOIN_RETRIES: usize = 5;

/// Result of an explicit request to join a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    AlreadyConnected,
    Joined,
    /// The bot was connected elsewhere in the guild and moved over.
    Moved,
}

/// The bot's own voice connection and the guild's voice roster.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connected_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    /// Non-bot members currently in `channel_id`, `None` when the roster is unknown.
    fn human_members(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<usize>;

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), Error>;

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), Error>;

    async fn player(&self, guild_id: GuildId) -> Option<Arc<dyn ClipPlayer>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: ChannelId, notification: &Notification) -> Result<(), Error>;
}

/// Keeps the bot's voice connection in step with the members around it and turns
/// presence changes into voice log messages and spoken clips.
pub struct VoiceStateReconciler {
    settings: SettingsStore,
    lang: Arc<Lang>,
    playback: PlaybackQueue,
    clips: ClipResolver,
    guild_locks: Mutex<HashMap<GuildId, Arc<Mutex<()>>>>,
}

impl VoiceStateReconciler {
    pub fn new(
        settings: SettingsStore,
        lang: Arc<Lang>,
        playback: PlaybackQueue,
        clips: ClipResolver,
    ) -> Self {
        Self {
            settings,
            lang,
            playback,
            clips,
            guild_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn clips(&self) -> &ClipResolver {
        &self.clips
    }

    async fn guild_lock(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        let mut locks = self.guild_locks.lock().await;
        locks.entry(guild_id).or_default().clone()
    }

    /// Handles one presence change. Failures are logged and stay inside this call.
    pub async fn on_voice_state_changed(
        &self,
        voice: &dyn VoiceGateway,
        notifier: &dyn Notifier,
        transition: &VoiceTransition,
    ) {
        let guild_id = transition.guild_id;
        let guild_lock = self.guild_lock(guild_id).await;
        let _guard = guild_lock.lock().await;

        let connected = match self.reconcile(voice, transition).await {
            Ok(connected) => connected,
            Err(e) => {
                warn!("voice reconciliation failed (guild: {guild_id}): {e}");
                voice.connected_channel(guild_id).await
            }
        };

        if let Err(e) = self.notify(notifier, transition).await {
            warn!("voice log message skipped (guild: {guild_id}): {e}");
        }

        if let Some(connected) = connected {
            self.announce(voice, transition, connected).await;
        }
    }

    /// Auto-leave / auto-rejoin. Returns the channel the bot is connected to afterwards.
    async fn reconcile(
        &self,
        voice: &dyn VoiceGateway,
        transition: &VoiceTransition,
    ) -> Result<Option<ChannelId>, Error> {
        let guild_id = transition.guild_id;
        let Some(interest) = transition.after_id().or(transition.before_id()) else {
            return Ok(voice.connected_channel(guild_id).await);
        };

        if let Some(connected) = voice.connected_channel(guild_id).await {
            let interest = if transition.involves(connected) {
                connected
            } else {
                interest
            };
            if interest == connected && voice.human_members(guild_id, connected) == Some(0) {
                info!("channel {connected} is empty, leaving (guild: {guild_id})");
                self.settings
                    .record_disconnected(guild_id, Some(connected))
                    .await?;
                voice.disconnect(guild_id).await?;
                self.playback.discard(guild_id).await;
                return Ok(None);
            }
            return Ok(Some(connected));
        }

        let Some(last) = self.settings.get(guild_id).await?.last_voice_channel() else {
            return Ok(None);
        };
        let interest = if transition.involves(last) { last } else { interest };
        if interest == last && voice.human_members(guild_id, last).is_some_and(|n| n > 0) {
            info!("activity resumed in {last}, rejoining (guild: {guild_id})");
            self.connect_with_retry(voice, guild_id, last).await?;
            self.settings.record_connected(guild_id, last).await?;
            return Ok(Some(last));
        }
        Ok(None)
    }

    /// Drops the half-open call between attempts.
    async fn connect_with_retry(
        &self,
        voice: &dyn VoiceGateway,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<(), Error> {
        let mut retries = 0;
        loop {
            match voice.connect(guild_id, channel_id).await {
                Ok(()) => return Ok(()),
                Err(e) if retries < REJOIN_RETRIES => {
                    retries += 1;
                    warn!(
                        "connecting to {channel_id} failed, retrying ({retries}/{REJOIN_RETRIES}) (guild: {guild_id}): {e}"
                    );
                    if let Err(e) = voice.disconnect(guild_id).await {
                        debug!("cannot drop call before retry (guild: {guild_id}): {e}");
                    }
                }
                Err(e) => {
                    return Err(format!(
                        "connecting to {channel_id} failed after {REJOIN_RETRIES} retries: {e}"
                    )
                    .into())
                }
            }
        }
    }

    /// Joins `channel_id` on request, serialized with voice events of the same guild.
    pub async fn join(
        &self,
        voice: &dyn VoiceGateway,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<JoinOutcome, Error> {
        let guild_lock = self.guild_lock(guild_id).await;
        let _guard = guild_lock.lock().await;

        let previous = voice.connected_channel(guild_id).await;
        if previous == Some(channel_id) {
            return Ok(JoinOutcome::AlreadyConnected);
        }

        voice.connect(guild_id, channel_id).await?;
        if let Err(e) = self.settings.record_connected(guild_id, channel_id).await {
            warn!("cannot record voice connection (guild: {guild_id}): {e}");
        }
        Ok(match previous {
            Some(_) => JoinOutcome::Moved,
            None => JoinOutcome::Joined,
        })
    }

    /// Leaves voice on request. Returns `false` when the bot was not connected.
    /// The channel is not remembered for auto-rejoin.
    pub async fn leave(&self, voice: &dyn VoiceGateway, guild_id: GuildId) -> Result<bool, Error> {
        let guild_lock = self.guild_lock(guild_id).await;
        let _guard = guild_lock.lock().await;

        if voice.connected_channel(guild_id).await.is_none() {
            return Ok(false);
        }

        voice.disconnect(guild_id).await?;
        self.playback.discard(guild_id).await;
        if let Err(e) = self.settings.record_disconnected(guild_id, None).await {
            warn!("cannot record voice disconnect (guild: {guild_id}): {e}");
        }
        Ok(true)
    }

    /// Reconnects to the channels the bot was in before the process stopped.
    ///
    /// An empty channel is not joined but remembered for auto-rejoin, as is a
    /// channel that keeps refusing the connection.
    pub async fn restore_connections(&self, voice: &dyn VoiceGateway) {
        for (guild_id, channel_id) in self.settings.current_voice_channels().await {
            let guild_lock = self.guild_lock(guild_id).await;
            let _guard = guild_lock.lock().await;

            if voice.connected_channel(guild_id).await == Some(channel_id) {
                continue;
            }

            let outcome = if voice.human_members(guild_id, channel_id) == Some(0) {
                info!("channel {channel_id} is empty, not reconnecting (guild: {guild_id})");
                self.settings
                    .record_disconnected(guild_id, Some(channel_id))
                    .await
            } else {
                info!("reconnecting to {channel_id} (guild: {guild_id})");
                match self.connect_with_retry(voice, guild_id, channel_id).await {
                    Ok(()) => continue,
                    Err(e) => {
                        warn!("{e} (guild: {guild_id})");
                        self.settings
                            .record_disconnected(guild_id, Some(channel_id))
                            .await
                    }
                }
            };
            if let Err(e) = outcome {
                warn!("cannot record voice disconnect (guild: {guild_id}): {e}");
            }
        }
    }

    async fn notify(&self, notifier: &dyn Notifier, transition: &VoiceTransition) -> Result<(), Error> {
        let settings = self.settings.get(transition.guild_id).await?;
        let Some(target) = settings.notify_channel() else {
            return Ok(());
        };

        let (kind, description) = match (&transition.before, &transition.after) {
            (None, Some(after)) => (
                NotificationKind::Joined,
                self.lang
                    .text(&settings.lang, MessageKey::VoiceJoined, &[after.name()?]),
            ),
            (Some(before), None) => (
                NotificationKind::Left,
                self.lang
                    .text(&settings.lang, MessageKey::VoiceLeft, &[before.name()?]),
            ),
            (Some(before), Some(after)) if before.id != after.id => (
                NotificationKind::Moved,
                self.lang.text(
                    &settings.lang,
                    MessageKey::VoiceMoved,
                    &[before.name()?, after.name()?],
                ),
            ),
            _ => return Ok(()),
        };

        let title = transition
            .member
            .display_name
            .clone()
            .ok_or_else(|| format!("member {} has no display name", transition.member.id))?;

        let notification = Notification {
            kind,
            title,
            description,
            avatar_url: transition.member.avatar_url.clone(),
        };
        notifier.send(target, &notification).await
    }

    /// Speaks the transition into the bot's channel when it happened there.
    /// Guilds without a log channel stay silent.
    async fn announce(&self, voice: &dyn VoiceGateway, transition: &VoiceTransition, connected: ChannelId) {
        let guild_id = transition.guild_id;
        let event = match (transition.before_id(), transition.after_id()) {
            (None, Some(after)) if after == connected => ClipEvent::Join,
            (Some(before), None) if before == connected => ClipEvent::Left,
            (Some(before), Some(after)) if before != after && after == connected => {
                ClipEvent::SwitchedIn
            }
            (Some(before), Some(after)) if before != after && before == connected => {
                ClipEvent::SwitchedOut
            }
            _ => return,
        };

        let settings = match self.settings.get(guild_id).await {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot read settings for clip (guild: {guild_id}): {e}");
                return;
            }
        };
        if settings.notify_channel().is_none() {
            return;
        }
        let fallback_text = transition
            .member
            .display_name
            .as_deref()
            .map(|name| self.lang.text(&settings.lang, event.message_key(), &[name]))
            .unwrap_or_default();

        let Some(clip) = self
            .clips
            .resolve(
                transition.member.id,
                event,
                &fallback_text,
                &self.lang.tts_lang(&settings.lang),
            )
            .await
        else {
            return;
        };

        match voice.player(guild_id).await {
            Some(player) => self.playback.enqueue_and_play(player, clip).await,
            None => warn!("no voice connection to play {clip} (guild: {guild_id})"),
        }
    }
}
