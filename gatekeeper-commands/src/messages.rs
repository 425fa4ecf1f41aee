use poise::serenity_prelude as serenity;

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn reason_required_message(usage: &str) -> String {
    format!("Reason required! Usage: `{usage}`")
}

pub fn command_failed_message() -> &'static str {
    "Something went wrong while running this command."
}

pub fn not_ticket_channel_message() -> &'static str {
    "This command can only be used inside an approval ticket channel."
}

pub fn mentions_required_message(usage: &str) -> String {
    format!("You must mention at least one user. Usage: `{usage}`")
}

pub fn channel_mention(channel_id: serenity::ChannelId) -> String {
    format!("<#{}>", channel_id.get())
}
