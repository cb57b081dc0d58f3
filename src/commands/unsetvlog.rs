use tracing::warn;

use super::{authorize, reply};
use crate::lang::MessageKey;
use crate::utils::embed;
use crate::{Context, Error};

async fn unsetvlog_impl(ctx: Context<'_>) -> Result<(), Error> {
    let Some((guild_id, current)) = authorize(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();

    match data.settings.unset_channel(guild_id).await {
        Ok(_) => {
            let text = data.lang.text(&current, MessageKey::ConfigUnset, &[]);
            reply(ctx, vec![embed::success(&text)], false).await
        }
        Err(e) => {
            warn!("cannot disable voice log (guild: {guild_id}): {e}");
            let text = data.lang.text(&current, MessageKey::ConfigError, &[]);
            reply(ctx, vec![embed::error(&text)], true).await
        }
    }
}

/// Stop sending the voice log (admin)
#[poise::command(prefix_command, slash_command)]
pub async fn unsetvlog(ctx: Context<'_>) -> Result<(), Error> {
    unsetvlog_impl(ctx).await
}
