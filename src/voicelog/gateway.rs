use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use serenity::builder::CreateMessage;
use serenity::model::id::{ChannelId, GuildId};
use songbird::Songbird;
use tokio::time;

use super::{Notification, Notifier, VoiceGateway};
use crate::playback::player::SongbirdPlayer;
use crate::playback::ClipPlayer;
use crate::utils::embed;
use crate::{Data, Error};

/// serenity cache + songbird manager, with every network call bounded by `timeout`.
pub struct SerenityGateway {
    ctx: serenity::Context,
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl SerenityGateway {
    pub fn new(
        ctx: serenity::Context,
        songbird: Arc<Songbird>,
        http_client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            ctx,
            songbird,
            http_client,
            timeout,
        }
    }

    /// Gateway over the songbird manager registered on the client.
    pub async fn from_context(ctx: &serenity::Context, data: &Data) -> Result<Self, Error> {
        let songbird = songbird::get(ctx)
            .await
            .ok_or("songbird is not registered")?;
        Ok(Self::new(
            ctx.clone(),
            songbird,
            data.http_client.clone(),
            data.config.call_timeout,
        ))
    }
}

#[async_trait]
impl VoiceGateway for SerenityGateway {
    async fn connected_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.songbird.get(guild_id)?;
        let handler = call.lock().await;
        handler
            .current_channel()
            .map(|ch| ChannelId::new(ch.0.get()))
    }

    fn human_members(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<usize> {
        let guild = self.ctx.cache.guild(guild_id)?;
        let count = guild
            .voice_states
            .values()
            .filter(|vs| vs.channel_id == Some(channel_id))
            .filter(|vs| {
                let is_bot = vs
                    .member
                    .as_ref()
                    .map(|m| m.user.bot)
                    .or_else(|| guild.members.get(&vs.user_id).map(|m| m.user.bot))
                    .unwrap_or(false);
                !is_bot
            })
            .count();
        Some(count)
    }

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), Error> {
        time::timeout(self.timeout, self.songbird.join(guild_id, channel_id))
            .await
            .map_err(|_| format!("joining {channel_id} timed out"))??;
        Ok(())
    }

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), Error> {
        time::timeout(self.timeout, self.songbird.remove(guild_id))
            .await
            .map_err(|_| "leaving voice timed out")??;
        Ok(())
    }

    async fn player(&self, guild_id: GuildId) -> Option<Arc<dyn ClipPlayer>> {
        let call = self.songbird.get(guild_id)?;
        Some(Arc::new(SongbirdPlayer::new(
            guild_id,
            call,
            self.http_client.clone(),
        )))
    }
}

#[async_trait]
impl Notifier for SerenityGateway {
    async fn send(&self, channel_id: ChannelId, notification: &Notification) -> Result<(), Error> {
        let message = CreateMessage::new().embed(embed::voice_log(notification));
        time::timeout(self.timeout, channel_id.send_message(&self.ctx, message))
            .await
            .map_err(|_| format!("sending to {channel_id} timed out"))??;
        Ok(())
    }
}
