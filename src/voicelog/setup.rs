use serenity::model::id::{ChannelId, GuildId};

use crate::lang::Lang;
use crate::settings::SettingsStore;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetVoiceLogStatus {
    AllSuccess,
    NotChanged,
    ChannelSuccess,
    LangSuccess,
    MissingLang,
    ChannelSuccessMissingLang,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetLanguageStatus {
    LangSuccess,
    NotChanged,
    MissingLang,
}

/// Points the guild's voice log at `channel_id`, optionally switching language as well.
pub async fn set_voice_log(
    store: &SettingsStore,
    lang: &Lang,
    guild_id: GuildId,
    channel_id: ChannelId,
    new_lang: Option<&str>,
) -> Result<SetVoiceLogStatus, Error> {
    let current = store.get(guild_id).await?;
    let same_channel = current.notify_channel() == Some(channel_id);

    let Some(new_lang) = new_lang else {
        if same_channel {
            return Ok(SetVoiceLogStatus::NotChanged);
        }
        store
            .set_channel_and_language(guild_id, channel_id, &current.lang)
            .await?;
        return Ok(SetVoiceLogStatus::ChannelSuccess);
    };

    if same_channel {
        return Ok(match set_language(store, lang, guild_id, new_lang).await? {
            SetLanguageStatus::LangSuccess => SetVoiceLogStatus::LangSuccess,
            SetLanguageStatus::NotChanged => SetVoiceLogStatus::NotChanged,
            SetLanguageStatus::MissingLang => SetVoiceLogStatus::MissingLang,
        });
    }

    if !lang.exists(new_lang) {
        store
            .set_channel_and_language(guild_id, channel_id, &current.lang)
            .await?;
        return Ok(SetVoiceLogStatus::ChannelSuccessMissingLang);
    }

    store
        .set_channel_and_language(guild_id, channel_id, new_lang)
        .await?;
    Ok(if current.lang == new_lang {
        SetVoiceLogStatus::ChannelSuccess
    } else {
        SetVoiceLogStatus::AllSuccess
    })
}

/// Unknown codes leave the stored language untouched.
pub async fn set_language(
    store: &SettingsStore,
    lang: &Lang,
    guild_id: GuildId,
    new_lang: &str,
) -> Result<SetLanguageStatus, Error> {
    if !lang.exists(new_lang) {
        return Ok(SetLanguageStatus::MissingLang);
    }
    let current = store.get(guild_id).await?;
    if current.lang == new_lang {
        return Ok(SetLanguageStatus::NotChanged);
    }
    store.set_language(guild_id, new_lang).await?;
    Ok(SetLanguageStatus::LangSuccess)
}
