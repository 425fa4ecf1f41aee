use poise::serenity_prelude as serenity;

use gatekeeper_core::{ChannelInfo, Error, Platform};
use gatekeeper_database::{ConfigStore, ResourceKind};
use gatekeeper_utils::formatting::{transcript_line, transcript_messages};

use crate::resources::ensure_resource;

/// Post the full history of `channel` to the guild's logs channel.
pub async fn archive_transcript(
    platform: &dyn Platform,
    store: &ConfigStore,
    guild_id: serenity::GuildId,
    channel: &ChannelInfo,
    reason: &str,
) -> Result<(), Error> {
    let history = platform.message_history(channel.id).await?;
    let lines: Vec<String> = history
        .iter()
        .map(|message| {
            transcript_line(
                &message.timestamp,
                &message.author_display,
                &message.author_tag,
                &message.content,
                message.edited,
            )
        })
        .collect();

    let logs_channel = serenity::ChannelId::new(
        ensure_resource(platform, store, guild_id, ResourceKind::LogsChannel).await?,
    );

    let header = format!(
        "Logs from approval channel {} (Deletion reason: `{}`)",
        channel.name, reason
    );
    for message in transcript_messages(&header, &lines) {
        platform.send_message(logs_channel, &message).await?;
    }

    Ok(())
}
