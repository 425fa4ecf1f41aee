use poise::serenity_prelude as serenity;
use tokio::time::{Duration, sleep};
use tracing::warn;

const HISTORY_PAGE_SIZE: u8 = 100;
const HISTORY_PAGE_DELAY_MS: u64 = 250;
/// Upper bound on pages fetched for one channel.
const HISTORY_MAX_PAGES: usize = 50;

/// Fetch a channel's messages page by page, returned oldest first.
pub async fn fetch_channel_history(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
) -> Result<Vec<serenity::Message>, serenity::Error> {
    let mut collected: Vec<serenity::Message> = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    let mut exhausted = true;
    for _ in 0..HISTORY_MAX_PAGES {
        let get_messages = match before {
            Some(before_id) => serenity::GetMessages::new()
                .before(before_id)
                .limit(HISTORY_PAGE_SIZE),
            None => serenity::GetMessages::new().limit(HISTORY_PAGE_SIZE),
        };

        let messages = channel_id.messages(http, get_messages).await?;
        let page_len = messages.len();
        before = messages.last().map(|message| message.id);
        collected.extend(messages);

        if page_len < usize::from(HISTORY_PAGE_SIZE) {
            exhausted = false;
            break;
        }

        sleep(Duration::from_millis(HISTORY_PAGE_DELAY_MS)).await;
    }

    if exhausted {
        warn!(
            channel_id = %channel_id,
            pages = HISTORY_MAX_PAGES,
            "channel history truncated, oldest messages omitted"
        );
    }

    collected.reverse();
    Ok(collected)
}
