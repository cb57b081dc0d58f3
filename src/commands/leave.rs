use super::{authorize, reply};
use crate::lang::MessageKey;
use crate::utils::embed;
use crate::voicelog::gateway::SerenityGateway;
use crate::{Context, Error};

async fn leave_impl(ctx: Context<'_>) -> Result<(), Error> {
    let Some((guild_id, current)) = authorize(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();
    let lang = &data.lang;

    let gateway = SerenityGateway::from_context(ctx.serenity_context(), data).await?;

    if !data.reconciler.leave(&gateway, guild_id).await? {
        let text = lang.text(&current, MessageKey::CommandBotNotConnected, &[]);
        return reply(ctx, vec![embed::not_changed(&text)], true).await;
    }

    let text = lang.text(&current, MessageKey::CommandLeaveSuccess, &[]);
    reply(ctx, vec![embed::success(&text)], false).await
}

/// Leave the voice channel (admin)
#[poise::command(prefix_command, slash_command)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    leave_impl(ctx).await
}
