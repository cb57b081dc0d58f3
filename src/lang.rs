use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::Error;

pub const DEFAULT_LANG: &str = "en_US";

/// Every message the bot can produce. Each key lives at `section.name` inside a bundle file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
    VoiceJoined,
    VoiceLeft,
    VoiceMoved,
    TtsJoined,
    TtsLeft,
    TtsSwitchedIn,
    TtsSwitchedOut,
    TtsReady,
    TtsMovedHere,
    ConfigSuccess,
    ConfigExist,
    ConfigLangSuccess,
    ConfigLangExist,
    ConfigLangNotFound,
    ConfigLangNotFoundKept,
    ConfigNotEnoughArgument,
    ConfigUnset,
    ConfigError,
    CommandGuildOnly,
    CommandNoPermission,
    CommandNotInChannel,
    CommandAlreadyConnected,
    CommandJoinSuccess,
    CommandLeaveSuccess,
    CommandBotNotConnected,
}

impl MessageKey {
    pub const ALL: [MessageKey; 25] = [
        Self::VoiceJoined,
        Self::VoiceLeft,
        Self::VoiceMoved,
        Self::TtsJoined,
        Self::TtsLeft,
        Self::TtsSwitchedIn,
        Self::TtsSwitchedOut,
        Self::TtsReady,
        Self::TtsMovedHere,
        Self::ConfigSuccess,
        Self::ConfigExist,
        Self::ConfigLangSuccess,
        Self::ConfigLangExist,
        Self::ConfigLangNotFound,
        Self::ConfigLangNotFoundKept,
        Self::ConfigNotEnoughArgument,
        Self::ConfigUnset,
        Self::ConfigError,
        Self::CommandGuildOnly,
        Self::CommandNoPermission,
        Self::CommandNotInChannel,
        Self::CommandAlreadyConnected,
        Self::CommandJoinSuccess,
        Self::CommandLeaveSuccess,
        Self::CommandBotNotConnected,
    ];

    /// `(section, name, built-in English text)`
    fn entry(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::VoiceJoined => ("voice_log", "joined", "Joined {0}"),
            Self::VoiceLeft => ("voice_log", "left", "Left {0}"),
            Self::VoiceMoved => ("voice_log", "moved", "{0} ▶️ {1}"),
            Self::TtsJoined => ("tts", "joined", "{0} joined the channel"),
            Self::TtsLeft => ("tts", "left", "{0} left the channel"),
            Self::TtsSwitchedIn => ("tts", "switched_in", "{0} moved in"),
            Self::TtsSwitchedOut => ("tts", "switched_out", "{0} moved to another channel"),
            Self::TtsReady => ("tts", "ready", "VoiceLog TTS is ready."),
            Self::TtsMovedHere => ("tts", "moved_here", "VoiceLog TTS is moved to your channel."),
            Self::ConfigSuccess => ("config", "success", "Voice log will be sent to this channel."),
            Self::ConfigExist => ("config", "exist", "Voice log is already set to this channel."),
            Self::ConfigLangSuccess => ("config", "lang_success", "Language changed to {0}."),
            Self::ConfigLangExist => ("config", "lang_exist", "Language is already {0}."),
            Self::ConfigLangNotFound => ("config", "lang_not_found", "Language not exist."),
            Self::ConfigLangNotFoundKept => (
                "config",
                "lang_not_found_kept",
                "Language not exist, will not change your language.",
            ),
            Self::ConfigNotEnoughArgument => {
                ("config", "not_enough_argument", "Please specify a language.")
            }
            Self::ConfigUnset => ("config", "unset", "Voice log is disabled for this server."),
            Self::ConfigError => ("config", "error", "Failed to save the settings."),
            Self::CommandGuildOnly => (
                "command",
                "guild_only",
                "This function is not available for private chat.",
            ),
            Self::CommandNoPermission => ("command", "no_permission", "Permission denied"),
            Self::CommandNotInChannel => {
                ("command", "not_in_channel", "You are not even in a voice channel")
            }
            Self::CommandAlreadyConnected => ("command", "already_connected", "Already connected"),
            Self::CommandJoinSuccess => ("command", "join_success", "Joined your voice channel."),
            Self::CommandLeaveSuccess => ("command", "leave_success", "Left the voice channel."),
            Self::CommandBotNotConnected => {
                ("command", "bot_not_connected", "Bot is not in a voice channel.")
            }
        }
    }
}

#[derive(Deserialize)]
struct ListEntry {
    file: String,
    display_name: String,
    #[serde(default)]
    tts_lang: Option<String>,
}

pub struct Bundle {
    pub display_name: String,
    pub tts_lang: String,
    messages: HashMap<String, HashMap<String, String>>,
}

impl Bundle {
    pub fn new(
        display_name: impl Into<String>,
        tts_lang: impl Into<String>,
        messages: HashMap<String, HashMap<String, String>>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            tts_lang: tts_lang.into(),
            messages,
        }
    }

    fn template(&self, key: MessageKey) -> Option<&str> {
        let (section, name, _) = key.entry();
        self.messages
            .get(section)
            .and_then(|s| s.get(name))
            .map(String::as_str)
    }
}

/// Loaded localization bundles. Lookups never fail.
pub struct Lang {
    bundles: BTreeMap<String, Bundle>,
}

impl Lang {
    /// Reads `<dir>/list.json` and every bundle it names.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let list_path = dir.join("list.json");
        let list_raw = std::fs::read_to_string(&list_path)
            .map_err(|e| format!("cannot read {}: {e}", list_path.display()))?;
        let list: BTreeMap<String, ListEntry> = serde_json::from_str(&list_raw)
            .map_err(|e| format!("cannot parse {}: {e}", list_path.display()))?;

        let mut bundles = BTreeMap::new();
        for (code, entry) in list {
            let file = dir.join(&entry.file);
            let raw = std::fs::read_to_string(&file)
                .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let messages = serde_json::from_str(&raw)
                .map_err(|e| format!("cannot parse {}: {e}", file.display()))?;
            let tts_lang = entry
                .tts_lang
                .unwrap_or_else(|| code.replace('_', "-"));
            bundles.insert(code, Bundle::new(entry.display_name, tts_lang, messages));
        }

        if !bundles.contains_key(DEFAULT_LANG) {
            warn!("{DEFAULT_LANG} bundle missing, built-in English texts will be used");
        }
        info!("loaded {} language bundles", bundles.len());
        Ok(Self { bundles })
    }

    pub fn from_bundles(bundles: impl IntoIterator<Item = (String, Bundle)>) -> Self {
        Self {
            bundles: bundles.into_iter().collect(),
        }
    }

    /// Only the default language, rendering built-in texts.
    pub fn builtin() -> Self {
        Self::from_bundles([(
            DEFAULT_LANG.to_string(),
            Bundle::new("English (US)", "en-US", HashMap::new()),
        )])
    }

    pub fn exists(&self, code: &str) -> bool {
        self.bundles.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn display_name(&self, code: &str) -> String {
        self.bundle(code)
            .map(|b| b.display_name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Language tag handed to the speech endpoint.
    pub fn tts_lang(&self, code: &str) -> String {
        self.bundle(code)
            .map(|b| b.tts_lang.clone())
            .unwrap_or_else(|| "en-US".to_string())
    }

    /// Renders `key` in `code`, falling back to the default bundle and then the built-in text.
    pub fn text(&self, code: &str, key: MessageKey, args: &[&str]) -> String {
        let template = self
            .bundles
            .get(code)
            .and_then(|b| b.template(key))
            .or_else(|| self.bundles.get(DEFAULT_LANG).and_then(|b| b.template(key)))
            .unwrap_or(key.entry().2);
        render(template, args)
    }

    fn bundle(&self, code: &str) -> Option<&Bundle> {
        self.bundles
            .get(code)
            .or_else(|| self.bundles.get(DEFAULT_LANG))
    }
}

/// Replaces `{0}`, `{1}`, ... with the matching argument. Unmatched placeholders stay as written.
/// Arguments are inserted as-is and never scanned again.
fn render(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let arg = tail.find('}').and_then(|close| {
            let index = tail[..close].parse::<usize>().ok()?;
            Some((args.get(index)?, close))
        });
        match arg {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
