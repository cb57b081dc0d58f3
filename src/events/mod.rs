pub mod message;
pub mod voice_state;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::voicelog::gateway::SerenityGateway;
use crate::{Data, Error};

pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "logged in as {} {}",
                data_about_bot.user.name, data_about_bot.user.id
            );
        }
        serenity::FullEvent::CacheReady { guilds } => {
            info!("cache ready for {} guilds", guilds.len());
            let gateway = SerenityGateway::from_context(ctx, data).await?;
            data.reconciler.restore_connections(&gateway).await;
        }
        serenity::FullEvent::Message { new_message } => {
            message::log(ctx, new_message);
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            voice_state::handle(ctx, old, new, data).await?;
        }
        _ => {}
    }
    Ok(())
}
