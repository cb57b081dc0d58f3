use std::path::PathBuf;

use serde::Deserialize;
use serenity::model::id::UserId;
use tracing::warn;

use super::Clip;
use crate::lang::MessageKey;

/// Which side of a transition the bot's channel was on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipEvent {
    Join,
    Left,
    SwitchedIn,
    SwitchedOut,
}

impl ClipEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Left => "left",
            Self::SwitchedIn => "switched_in",
            Self::SwitchedOut => "switched_out",
        }
    }

    pub fn message_key(self) -> MessageKey {
        match self {
            Self::Join => MessageKey::TtsJoined,
            Self::Left => MessageKey::TtsLeft,
            Self::SwitchedIn => MessageKey::TtsSwitchedIn,
            Self::SwitchedOut => MessageKey::TtsSwitchedOut,
        }
    }
}

/// `assets/<user id>.json`
#[derive(Deserialize, Default)]
struct CustomSpeech {
    lang: Option<String>,
    join: Option<String>,
    left: Option<String>,
    switched_in: Option<String>,
    switched_out: Option<String>,
}

impl CustomSpeech {
    fn text(&self, event: ClipEvent) -> Option<&str> {
        match event {
            ClipEvent::Join => self.join.as_deref(),
            ClipEvent::Left => self.left.as_deref(),
            ClipEvent::SwitchedIn => self.switched_in.as_deref(),
            ClipEvent::SwitchedOut => self.switched_out.as_deref(),
        }
    }
}

pub struct ClipResolver {
    assets_dir: PathBuf,
    tts_url: String,
}

impl ClipResolver {
    pub fn new(assets_dir: impl Into<PathBuf>, tts_url: impl Into<String>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            tts_url: tts_url.into(),
        }
    }

    /// Custom speech text, then a recorded wav, then `fallback_text` spoken in `fallback_lang`.
    pub async fn resolve(
        &self,
        user_id: UserId,
        event: ClipEvent,
        fallback_text: &str,
        fallback_lang: &str,
    ) -> Option<Clip> {
        if let Some(custom) = self.custom_speech(user_id).await {
            if let (Some(lang), Some(text)) = (custom.lang.as_deref(), custom.text(event)) {
                return self.speech(text, lang);
            }
        }

        let recorded = self
            .assets_dir
            .join(format!("{user_id}_{}.wav", event.as_str()));
        if tokio::fs::try_exists(&recorded).await.unwrap_or(false) {
            return Some(Clip::File(recorded));
        }

        self.speech(fallback_text, fallback_lang)
    }

    /// Synthesized speech for `text`. `None` for empty text or an unusable endpoint.
    pub fn speech(&self, text: &str, lang: &str) -> Option<Clip> {
        if text.trim().is_empty() {
            return None;
        }
        match reqwest::Url::parse_with_params(
            &self.tts_url,
            &[("ie", "UTF-8"), ("q", text), ("tl", lang), ("client", "tw-ob")],
        ) {
            Ok(url) => Some(Clip::Url(url.into())),
            Err(e) => {
                warn!("invalid TTS endpoint {}: {e}", self.tts_url);
                None
            }
        }
    }

    async fn custom_speech(&self, user_id: UserId) -> Option<CustomSpeech> {
        let path = self.assets_dir.join(format!("{user_id}.json"));
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(custom) => Some(custom),
            Err(e) => {
                warn!("ignoring malformed {}: {e}", path.display());
                None
            }
        }
    }
}
