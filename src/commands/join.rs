use super::{authorize, reply};
use crate::lang::MessageKey;
use crate::utils::embed;
use crate::voicelog::gateway::SerenityGateway;
use crate::voicelog::{JoinOutcome, VoiceGateway};
use crate::{Context, Error};

async fn join_impl(ctx: Context<'_>) -> Result<(), Error> {
    let Some((guild_id, current)) = authorize(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();
    let lang = &data.lang;

    let channel_id = {
        let guild = ctx.guild().ok_or("guild is not cached")?;
        guild
            .voice_states
            .get(&ctx.author().id)
            .and_then(|vs| vs.channel_id)
    };
    let Some(channel_id) = channel_id else {
        let text = lang.text(&current, MessageKey::CommandNotInChannel, &[]);
        return reply(ctx, vec![embed::error(&text)], true).await;
    };

    let gateway = SerenityGateway::from_context(ctx.serenity_context(), data).await?;

    let already_connected = {
        let text = lang.text(&current, MessageKey::CommandAlreadyConnected, &[]);
        vec![embed::not_changed(&text)]
    };
    if gateway.connected_channel(guild_id).await == Some(channel_id) {
        return reply(ctx, already_connected, true).await;
    }

    ctx.defer().await?;
    let greeting = match data.reconciler.join(&gateway, guild_id, channel_id).await? {
        JoinOutcome::AlreadyConnected => return reply(ctx, already_connected, true).await,
        JoinOutcome::Joined => MessageKey::TtsReady,
        JoinOutcome::Moved => MessageKey::TtsMovedHere,
    };

    let clip = data
        .reconciler
        .clips()
        .speech(&lang.text(&current, greeting, &[]), &lang.tts_lang(&current));
    if let (Some(clip), Some(player)) = (clip, gateway.player(guild_id).await) {
        data.playback.enqueue_and_play(player, clip).await;
    }

    let text = lang.text(&current, MessageKey::CommandJoinSuccess, &[]);
    reply(ctx, vec![embed::success(&text)], false).await
}

/// Join your voice channel (admin)
#[poise::command(prefix_command, slash_command)]
pub async fn join(ctx: Context<'_>) -> Result<(), Error> {
    join_impl(ctx).await
}
