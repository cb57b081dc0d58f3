use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com.tw/translate_tts";

pub struct Config {
    pub discord_token: String,
    pub prefix: String,
    pub admins: Vec<u64>,
    pub data_path: PathBuf,
    pub lang_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub tts_url: String,
    pub call_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// `lookup` is consulted once per variable.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let admins = lookup("VOICELOG_ADMINS")
            .map(|raw| parse_admins(&raw))
            .unwrap_or_default();

        let call_timeout = lookup("VOICELOG_CALL_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(10);

        Self {
            discord_token: lookup("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set"),
            prefix: lookup("VOICELOG_PREFIX").unwrap_or_else(|| "$".to_string()),
            admins,
            data_path: lookup("VOICELOG_DATA_PATH")
                .unwrap_or_else(|| "vlogdata.json".to_string())
                .into(),
            lang_dir: lookup("VOICELOG_LANG_DIR")
                .unwrap_or_else(|| "langs".to_string())
                .into(),
            assets_dir: lookup("VOICELOG_ASSETS_DIR")
                .unwrap_or_else(|| "assets".to_string())
                .into(),
            tts_url: lookup("VOICELOG_TTS_URL").unwrap_or_else(|| DEFAULT_TTS_URL.to_string()),
            call_timeout: Duration::from_secs(call_timeout),
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.contains(&user_id)
    }
}

fn parse_admins(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("ignoring invalid admin id in VOICELOG_ADMINS: {s}");
                None
            }
        })
        .collect()
}
