use tracing::warn;

use super::{authorize, reply};
use crate::lang::MessageKey;
use crate::utils::embed;
use crate::voicelog::setup::{self, SetVoiceLogStatus};
use crate::{Context, Error};

async fn setvlog_impl(ctx: Context<'_>, language: Option<String>) -> Result<(), Error> {
    let Some((guild_id, current)) = authorize(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();
    let lang = &data.lang;

    let status = match setup::set_voice_log(
        &data.settings,
        lang,
        guild_id,
        ctx.channel_id(),
        language.as_deref(),
    )
    .await
    {
        Ok(status) => status,
        Err(e) => {
            warn!("cannot save voice log channel (guild: {guild_id}): {e}");
            let text = lang.text(&current, MessageKey::ConfigError, &[]);
            return reply(ctx, vec![embed::error(&text)], true).await;
        }
    };

    let requested = language.as_deref().unwrap_or(&current);
    let lang_success = || {
        lang.text(
            requested,
            MessageKey::ConfigLangSuccess,
            &[&lang.display_name(requested)],
        )
    };

    match status {
        SetVoiceLogStatus::NotChanged => {
            let text = lang.text(&current, MessageKey::ConfigExist, &[]);
            reply(ctx, vec![embed::not_changed(&text)], true).await
        }
        SetVoiceLogStatus::ChannelSuccess => {
            let mut embeds = Vec::new();
            if language.is_some() {
                let text = lang.text(
                    &current,
                    MessageKey::ConfigLangExist,
                    &[&lang.display_name(&current)],
                );
                embeds.push(embed::not_changed(&text));
            }
            let text = lang.text(&current, MessageKey::ConfigSuccess, &[]);
            embeds.push(embed::success(&text));
            reply(ctx, embeds, false).await
        }
        SetVoiceLogStatus::AllSuccess => {
            let text = lang.text(requested, MessageKey::ConfigSuccess, &[]);
            reply(
                ctx,
                vec![embed::success(&lang_success()), embed::success(&text)],
                false,
            )
            .await
        }
        SetVoiceLogStatus::LangSuccess => {
            let text = lang.text(requested, MessageKey::ConfigExist, &[]);
            reply(
                ctx,
                vec![embed::success(&lang_success()), embed::not_changed(&text)],
                false,
            )
            .await
        }
        SetVoiceLogStatus::MissingLang => {
            let missing = lang.text(&current, MessageKey::ConfigLangNotFoundKept, &[]);
            let text = lang.text(&current, MessageKey::ConfigExist, &[]);
            reply(
                ctx,
                vec![embed::error(&missing), embed::not_changed(&text)],
                true,
            )
            .await
        }
        SetVoiceLogStatus::ChannelSuccessMissingLang => {
            let missing = lang.text(&current, MessageKey::ConfigLangNotFoundKept, &[]);
            let text = lang.text(&current, MessageKey::ConfigSuccess, &[]);
            reply(
                ctx,
                vec![embed::error(&missing), embed::success(&text)],
                false,
            )
            .await
        }
    }
}

/// Send the voice log to this channel (admin)
#[poise::command(prefix_command, slash_command)]
pub async fn setvlog(
    ctx: Context<'_>,
    #[description = "Voice log language, e.g. en_US"] language: Option<String>,
) -> Result<(), Error> {
    setvlog_impl(ctx, language).await
}
