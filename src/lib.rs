pub mod commands;
pub mod config;
pub mod events;
pub mod lang;
pub mod playback;
pub mod settings;
pub mod utils;
pub mod voicelog;

use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub config: Arc<config::Config>,
    pub settings: settings::SettingsStore,
    pub lang: Arc<lang::Lang>,
    pub playback: playback::PlaybackQueue,
    pub reconciler: voicelog::VoiceStateReconciler,
    pub http_client: reqwest::Client,
}
