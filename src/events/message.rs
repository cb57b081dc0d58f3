use poise::serenity_prelude as serenity;
use tracing::info;

/// `display@name in #channel (id) : content`, or without the channel part in DMs.
pub fn log(ctx: &serenity::Context, msg: &serenity::Message) {
    let display_name = msg
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .or_else(|| msg.author.global_name.clone())
        .unwrap_or_else(|| msg.author.name.clone());

    let channel_name = msg.guild_id.and_then(|guild_id| {
        let guild = ctx.cache.guild(guild_id)?;
        guild.channels.get(&msg.channel_id).map(|c| c.name.clone())
    });

    match channel_name {
        Some(channel) => info!(
            "{display}@{} in {channel} ({}) : {}",
            msg.author.name, msg.channel_id, msg.content,
            display = display_name
        ),
        None => info!(
            "{display}@{} : {}",
            msg.author.name,
            msg.content,
            display = display_name
        ),
    }
}
