use serenity::builder::{CreateEmbed, CreateEmbedAuthor};
use serenity::model::Timestamp;

use crate::voicelog::Notification;

/// Invisible author name, so only the avatar shows next to the title.
const BLANK_AUTHOR: &str = "𝅺";

pub fn voice_log(notification: &Notification) -> CreateEmbed {
    let mut author = CreateEmbedAuthor::new(BLANK_AUTHOR);
    if let Some(ref avatar) = notification.avatar_url {
        author = author.icon_url(avatar);
    }

    CreateEmbed::new()
        .title(&notification.title)
        .description(&notification.description)
        .color(notification.color())
        .author(author)
        .timestamp(Timestamp::now())
}

pub fn success(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("✅")
        .description(message)
        .color(0x57F287)
}

pub fn not_changed(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("ℹ️")
        .description(message)
        .color(0x5865F2)
}

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌")
        .description(message)
        .color(0xED4245)
}
