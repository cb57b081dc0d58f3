use tracing::warn;

use super::{authorize, reply};
use crate::lang::MessageKey;
use crate::utils::embed;
use crate::voicelog::setup::{self, SetLanguageStatus};
use crate::{Context, Error};

async fn setlang_impl(ctx: Context<'_>, language: Option<String>) -> Result<(), Error> {
    let Some((guild_id, current)) = authorize(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();
    let lang = &data.lang;

    let Some(language) = language else {
        let text = lang.text(&current, MessageKey::ConfigNotEnoughArgument, &[]);
        return reply(ctx, vec![embed::error(&text)], true).await;
    };

    match setup::set_language(&data.settings, lang, guild_id, &language).await {
        Ok(SetLanguageStatus::MissingLang) => {
            let text = lang.text(&current, MessageKey::ConfigLangNotFound, &[]);
            reply(ctx, vec![embed::error(&text)], true).await
        }
        Ok(SetLanguageStatus::NotChanged) => {
            let text = lang.text(
                &current,
                MessageKey::ConfigLangExist,
                &[&lang.display_name(&current)],
            );
            reply(ctx, vec![embed::not_changed(&text)], true).await
        }
        Ok(SetLanguageStatus::LangSuccess) => {
            let text = lang.text(
                &language,
                MessageKey::ConfigLangSuccess,
                &[&lang.display_name(&language)],
            );
            reply(ctx, vec![embed::success(&text)], false).await
        }
        Err(e) => {
            warn!("cannot save language (guild: {guild_id}): {e}");
            let text = lang.text(&current, MessageKey::ConfigError, &[]);
            reply(ctx, vec![embed::error(&text)], true).await
        }
    }
}

/// Change the voice log language (admin)
#[poise::command(prefix_command, slash_command)]
pub async fn setlang(
    ctx: Context<'_>,
    #[description = "Language code, e.g. zh_TW"] language: Option<String>,
) -> Result<(), Error> {
    setlang_impl(ctx, language).await
}
