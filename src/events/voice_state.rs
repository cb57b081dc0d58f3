use poise::serenity_prelude as serenity;
use serenity::model::id::{ChannelId, GuildId};

use crate::voicelog::gateway::SerenityGateway;
use crate::voicelog::{ChannelRef, MemberInfo, VoiceTransition};
use crate::{Data, Error};

pub async fn handle(
    ctx: &serenity::Context,
    old: &Option<serenity::VoiceState>,
    new: &serenity::VoiceState,
    data: &Data,
) -> Result<(), Error> {
    let guild_id = match new.guild_id {
        Some(id) => id,
        None => return Ok(()),
    };

    // the bot's own state: only drop clips that can no longer play
    if new.user_id == ctx.cache.current_user().id {
        if new.channel_id.is_none() {
            data.playback.discard(guild_id).await;
        }
        return Ok(());
    }

    let before = old.as_ref().and_then(|vs| vs.channel_id);
    let after = new.channel_id;
    if before.is_none() && after.is_none() {
        return Ok(());
    }

    let transition = build_transition(ctx, guild_id, new, before, after);
    let gateway = SerenityGateway::from_context(ctx, data).await?;

    data.reconciler
        .on_voice_state_changed(&gateway, &gateway, &transition)
        .await;
    Ok(())
}

fn build_transition(
    ctx: &serenity::Context,
    guild_id: GuildId,
    new: &serenity::VoiceState,
    before: Option<ChannelId>,
    after: Option<ChannelId>,
) -> VoiceTransition {
    let guild = ctx.cache.guild(guild_id);

    let channel = |id: ChannelId| ChannelRef {
        id,
        name: guild
            .as_ref()
            .and_then(|g| g.channels.get(&id))
            .map(|c| c.name.clone()),
    };

    let member = new
        .member
        .clone()
        .or_else(|| guild.as_ref().and_then(|g| g.members.get(&new.user_id).cloned()));

    let member = match member {
        Some(m) => MemberInfo {
            id: new.user_id,
            display_name: Some(m.display_name().to_string()),
            avatar_url: Some(m.face()),
        },
        None => MemberInfo {
            id: new.user_id,
            display_name: None,
            avatar_url: None,
        },
    };

    VoiceTransition {
        guild_id,
        member,
        before: before.map(&channel),
        after: after.map(&channel),
    }
}
