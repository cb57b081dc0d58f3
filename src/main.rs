use std::sync::Arc;

use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use tracing_subscriber::EnvFilter;
use voicelog::lang::Lang;
use voicelog::playback::clip::ClipResolver;
use voicelog::playback::PlaybackQueue;
use voicelog::settings::SettingsStore;
use voicelog::voicelog::VoiceStateReconciler;
use voicelog::{commands, config, events, Data};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(config::Config::from_env());

    let lang = match Lang::load(&config.lang_dir) {
        Ok(lang) => Arc::new(lang),
        Err(e) => {
            tracing::error!("cannot load languages: {e}");
            std::process::exit(1);
        }
    };

    let settings = match SettingsStore::open(&config.data_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("cannot load settings: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.assets_dir).await {
        tracing::warn!("cannot create {}: {e}", config.assets_dir.display());
    }

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord_token.clone();
    let prefix = config.prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let playback = PlaybackQueue::new();
                let clips = ClipResolver::new(&config.assets_dir, &config.tts_url);
                let reconciler = VoiceStateReconciler::new(
                    settings.clone(),
                    lang.clone(),
                    playback.clone(),
                    clips,
                );

                tracing::info!("bot is ready, listening...");
                Ok(Data {
                    config,
                    settings,
                    lang,
                    playback,
                    reconciler,
                    http_client: reqwest::Client::new(),
                })
            })
        })
        .build();

    let mut client = match serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .register_songbird()
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("cannot create client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = client.start().await {
        tracing::error!("client error: {e}");
    }
}
