use std::collections::HashMap;
use std::time::Duration;

use voicelog::config::{Config, DEFAULT_TTS_URL};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
#[should_panic(expected = "DISCORD_TOKEN")]
fn test_config_missing_token_panics() {
    let env = vars(&[]);
    Config::from_vars(|k| env.get(k).cloned());
}

#[test]
fn test_config_defaults() {
    let env = vars(&[("DISCORD_TOKEN", "token")]);
    let config = Config::from_vars(|k| env.get(k).cloned());

    assert_eq!(config.discord_token, "token");
    assert_eq!(config.prefix, "$");
    assert!(config.admins.is_empty());
    assert_eq!(config.data_path.to_str(), Some("vlogdata.json"));
    assert_eq!(config.lang_dir.to_str(), Some("langs"));
    assert_eq!(config.assets_dir.to_str(), Some("assets"));
    assert_eq!(config.tts_url, DEFAULT_TTS_URL);
    assert_eq!(config.call_timeout, Duration::from_secs(10));
}

#[test]
fn test_config_overrides() {
    let env = vars(&[
        ("DISCORD_TOKEN", "token"),
        ("VOICELOG_PREFIX", "!"),
        ("VOICELOG_ADMINS", "11, 22"),
        ("VOICELOG_CALL_TIMEOUT_SECS", "3"),
    ]);
    let config = Config::from_vars(|k| env.get(k).cloned());

    assert_eq!(config.prefix, "!");
    assert!(config.is_admin(11));
    assert!(config.is_admin(22));
    assert!(!config.is_admin(33));
    assert_eq!(config.call_timeout, Duration::from_secs(3));
}

#[test]
fn test_config_bad_timeout_uses_default() {
    let env = vars(&[("DISCORD_TOKEN", "token"), ("VOICELOG_CALL_TIMEOUT_SECS", "soon")]);
    let config = Config::from_vars(|k| env.get(k).cloned());
    assert_eq!(config.call_timeout, Duration::from_secs(10));
}
