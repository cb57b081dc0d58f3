mod help;
mod join;
mod leave;
mod setlang;
mod setvlog;
mod unsetvlog;

use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::CreateEmbed;
use serenity::model::id::GuildId;

use crate::lang::{MessageKey, DEFAULT_LANG};
use crate::utils::embed;
use crate::{Context, Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        setvlog::setvlog(),
        setlang::setlang(),
        unsetvlog::unsetvlog(),
        join::join(),
        leave::leave(),
    ]
}

/// Guild and stored language of a caller allowed to change voice log settings.
/// Replies and yields `None` otherwise.
async fn authorize(ctx: Context<'_>) -> Result<Option<(GuildId, String)>, Error> {
    let data = ctx.data();

    let guild_id = match ctx.guild_id() {
        Some(id) => id,
        None => {
            let text = data.lang.text(DEFAULT_LANG, MessageKey::CommandGuildOnly, &[]);
            reply(ctx, vec![embed::error(&text)], true).await?;
            return Ok(None);
        }
    };

    let lang = data.settings.get(guild_id).await?.lang;

    let permitted = data.config.is_admin(ctx.author().id.get())
        || match ctx.author_member().await {
            Some(member) => member
                .permissions
                .or_else(|| ctx.guild().map(|g| g.member_permissions(&member)))
                .is_some_and(|p| p.manage_messages()),
            None => false,
        };

    if !permitted {
        let text = data.lang.text(&lang, MessageKey::CommandNoPermission, &[]);
        reply(ctx, vec![embed::error(&text)], true).await?;
        return Ok(None);
    }

    Ok(Some((guild_id, lang)))
}

async fn reply(ctx: Context<'_>, embeds: Vec<CreateEmbed>, ephemeral: bool) -> Result<(), Error> {
    let mut response = CreateReply::default().ephemeral(ephemeral);
    for e in embeds {
        response = response.embed(e);
    }
    ctx.send(response).await?;
    Ok(())
}
