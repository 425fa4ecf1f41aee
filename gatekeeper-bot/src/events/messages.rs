use poise::serenity_prelude as serenity;

use gatekeeper_commands::{Dispatch, InboundMessage};
use gatekeeper_core::Data;

use crate::events::greeting::handle_message_mention_greeting;
use crate::platform::{SerenityPlatform, user_info};

/// Every guild message: count it against the channel throttle, then route it
/// as a command, then greet if the bot was mentioned outside a command.
pub async fn handle_message(ctx: &serenity::Context, data: &Data, message: &serenity::Message) {
    if message.author.bot || message.webhook_id.is_some() {
        return;
    }

    if message.guild_id.is_none() {
        return;
    }

    let platform = SerenityPlatform::new(ctx);

    if data.throttle_enabled {
        gatekeeper_commands::throttle::observe_message(&platform, data, message.channel_id).await;
    }

    let inbound = InboundMessage {
        guild_id: message.guild_id,
        channel_id: message.channel_id,
        message_id: message.id,
        author: user_info(&message.author),
        content: message.content.clone(),
        mentions: message.mentions.iter().map(user_info).collect(),
    };

    let dispatch = gatekeeper_commands::router()
        .dispatch(&platform, data, &inbound)
        .await;

    if dispatch == Dispatch::Ignored && data.greeting_enabled {
        handle_message_mention_greeting(&platform, message).await;
    }
}
