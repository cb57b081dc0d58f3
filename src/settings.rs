use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId};
use tokio::sync::Mutex;
use tracing::info;

use crate::lang::DEFAULT_LANG;
use crate::Error;

/// Stored in place of a channel id while notifications are disabled.
pub const UNSET_CHANNEL: &str = "-1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(rename = "lastVoiceChannel", default)]
    pub last_voice_channel: String,
    /// Channel the bot was connected to when last seen, restored on startup.
    #[serde(rename = "currentVoiceChannel", default)]
    pub current_voice_channel: String,
}

fn default_channel() -> String {
    UNSET_CHANNEL.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

impl Default for GuildSettings {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            lang: default_lang(),
            last_voice_channel: String::new(),
            current_voice_channel: String::new(),
        }
    }
}

impl GuildSettings {
    pub fn notify_channel(&self) -> Option<ChannelId> {
        parse_channel(&self.channel)
    }

    pub fn last_voice_channel(&self) -> Option<ChannelId> {
        parse_channel(&self.last_voice_channel)
    }

    pub fn current_voice_channel(&self) -> Option<ChannelId> {
        parse_channel(&self.current_voice_channel)
    }
}

fn parse_channel(raw: &str) -> Option<ChannelId> {
    raw.parse::<u64>().ok().filter(|id| *id != 0).map(ChannelId::new)
}

struct StoreInner {
    path: PathBuf,
    records: BTreeMap<String, GuildSettings>,
    /// Guilds whose stored record was missing fields at load time.
    needs_backfill: HashSet<String>,
}

impl StoreInner {
    async fn persist(&self) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(&self.records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Per-guild settings backed by a single JSON file.
///
/// Every operation takes the store lock for its whole read-modify-write-persist
/// cycle and hands back a snapshot, so concurrent handlers never lose updates.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl SettingsStore {
    /// Loads `path`, creating it as an empty object when it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let raw: BTreeMap<String, serde_json::Value> = match tokio::fs::read_to_string(&path).await
        {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| format!("cannot parse {}: {e}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, "{}").await?;
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = BTreeMap::new();
        let mut needs_backfill = HashSet::new();
        for (guild, value) in raw {
            let complete = ["channel", "lang", "lastVoiceChannel", "currentVoiceChannel"]
                .iter()
                .all(|field| value.get(field).is_some());
            let settings: GuildSettings = serde_json::from_value(value)
                .map_err(|e| format!("invalid settings for guild {guild}: {e}"))?;
            if !complete {
                needs_backfill.insert(guild.clone());
            }
            records.insert(guild, settings);
        }

        info!("loaded settings for {} guilds from {}", records.len(), path.display());
        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path,
                records,
                needs_backfill,
            })),
        })
    }

    /// Returns the guild's settings, creating and persisting defaults on first access.
    pub async fn get(&self, guild_id: GuildId) -> Result<GuildSettings, Error> {
        let key = guild_id.to_string();
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.records.get(&key).cloned() {
            if inner.needs_backfill.remove(&key) {
                inner.persist().await?;
            }
            return Ok(existing);
        }

        inner.records.insert(key.clone(), GuildSettings::default());
        if let Err(e) = inner.persist().await {
            inner.records.remove(&key);
            return Err(e);
        }
        Ok(GuildSettings::default())
    }

    pub async fn set_channel_and_language(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        lang: &str,
    ) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| {
            s.channel = channel_id.to_string();
            s.lang = lang.to_string();
        })
        .await
    }

    pub async fn set_language(&self, guild_id: GuildId, lang: &str) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| s.lang = lang.to_string()).await
    }

    /// `None` clears the remembered channel.
    pub async fn set_last_voice_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| {
            s.last_voice_channel = channel_id.map(|c| c.to_string()).unwrap_or_default();
        })
        .await
    }

    /// The bot is now in `channel_id`: remember it for restarts and forget the auto-leave channel.
    pub async fn record_connected(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| {
            s.current_voice_channel = channel_id.to_string();
            s.last_voice_channel.clear();
        })
        .await
    }

    /// The bot left voice. `last` is the channel to rejoin on resumed activity, if any.
    pub async fn record_disconnected(
        &self,
        guild_id: GuildId,
        last: Option<ChannelId>,
    ) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| {
            s.current_voice_channel.clear();
            s.last_voice_channel = last.map(|c| c.to_string()).unwrap_or_default();
        })
        .await
    }

    /// Guilds whose bot was connected when the settings were last written.
    pub async fn current_voice_channels(&self) -> Vec<(GuildId, ChannelId)> {
        let inner = self.inner.lock().await;
        inner
            .records
            .iter()
            .filter_map(|(guild, s)| {
                let guild_id = guild.parse::<u64>().ok().filter(|id| *id != 0)?;
                Some((GuildId::new(guild_id), s.current_voice_channel()?))
            })
            .collect()
    }

    pub async fn unset_channel(&self, guild_id: GuildId) -> Result<GuildSettings, Error> {
        self.update(guild_id, |s| s.channel = UNSET_CHANNEL.to_string())
            .await
    }

    async fn update(
        &self,
        guild_id: GuildId,
        apply: impl FnOnce(&mut GuildSettings),
    ) -> Result<GuildSettings, Error> {
        let key = guild_id.to_string();
        let mut inner = self.inner.lock().await;

        let previous = inner.records.get(&key).cloned();
        let mut updated = previous.clone().unwrap_or_default();
        apply(&mut updated);
        inner.records.insert(key.clone(), updated.clone());

        if let Err(e) = inner.persist().await {
            match previous {
                Some(prev) => inner.records.insert(key, prev),
                None => inner.records.remove(&key),
            };
            return Err(e);
        }
        inner.needs_backfill.remove(&key);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_channel_parses_to_none() {
        let s = GuildSettings::default();
        assert!(s.notify_channel().is_none());
        assert!(s.last_voice_channel().is_none());
        assert_eq!(s.lang, "en_US");
    }

    #[test]
    fn test_partial_record_deserializes_with_defaults() {
        let s: GuildSettings = serde_json::from_str(r#"{"channel": "42"}"#).unwrap();
        assert_eq!(s.notify_channel(), Some(ChannelId::new(42)));
        assert_eq!(s.lang, "en_US");
        assert_eq!(s.last_voice_channel, "");
    }

    #[test]
    fn test_serializes_camel_case_last_voice_channel() {
        let s = GuildSettings {
            last_voice_channel: "7".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["lastVoiceChannel"], "7");
        assert_eq!(json["channel"], "-1");
        assert_eq!(json["currentVoiceChannel"], "");
    }
}
