use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::{Context, Error};

fn command_list(prefix: &str) -> String {
    format!(
        "\
`{prefix}setvlog [language]` - send the voice log to this channel
`{prefix}setlang <language>` - change the voice log language
`{prefix}unsetvlog` - stop sending the voice log
`{prefix}join` - join your voice channel
`{prefix}leave` - leave the voice channel"
    )
}

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = &ctx.data().config.prefix;
    let langs = ctx.data().lang.codes().collect::<Vec<_>>().join(", ");
    let commands = command_list(prefix);

    let embed = CreateEmbed::new()
        .title("VoiceLog")
        .field("Commands", commands, false)
        .field("Languages", langs, false)
        .color(0x5865F2);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show VoiceLog commands
#[poise::command(prefix_command, slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_list_uses_prefix_and_plain_separators() {
        let list = command_list("$");
        assert_eq!(list.lines().count(), 5);
        for line in list.lines() {
            assert!(line.starts_with("`$"), "{line}");
            assert!(line.contains("` - "), "{line}");
        }
        assert!(!list.contains('\u{2014}'));
    }
}
