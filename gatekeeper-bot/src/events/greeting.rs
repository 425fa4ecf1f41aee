use poise::serenity_prelude as serenity;
use tracing::warn;

use gatekeeper_core::Platform;
use gatekeeper_utils::COMMAND_PREFIX;

/// Introduce the bot when someone mentions it.
pub async fn handle_message_mention_greeting(platform: &dyn Platform, message: &serenity::Message) {
    if !message.mentions_user_id(platform.bot_user_id()) {
        return;
    }

    if message.content.starts_with(COMMAND_PREFIX) {
        return;
    }

    if let Err(source) = platform
        .send_message(message.channel_id, &greeting(message.author.id))
        .await
    {
        warn!(?source, "failed to send mention greeting");
    }
}

fn greeting(user_id: serenity::UserId) -> String {
    format!(
        "Hi <@{}>! I keep the gate of this server. New members can say `{COMMAND_PREFIX}apply` \
         in the limbo channel to start their approval, and moderators can say \
         `{COMMAND_PREFIX}help` for my commands.",
        user_id.get()
    )
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::greeting;

    #[test]
    fn greeting_mentions_author_and_commands() {
        let text = greeting(serenity::UserId::new(42));

        assert!(text.starts_with("Hi <@42>!"));
        assert!(text.contains("`*apply`"));
        assert!(text.contains("`*help`"));
    }
}
