use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use gatekeeper_core::{Data, Platform, ThrottleOutcome};
use gatekeeper_utils::time::now_unix_millis;

/// Count one message against its channel's throttle and apply whatever the
/// throttle decided. Platform failures are logged and swallowed.
pub async fn observe_message(
    platform: &dyn Platform,
    data: &Data,
    channel_id: serenity::ChannelId,
) -> ThrottleOutcome {
    let outcome = data.throttles.record(channel_id.get(), now_unix_millis());
    apply_outcome(platform, channel_id, outcome).await;
    outcome
}

pub async fn apply_outcome(
    platform: &dyn Platform,
    channel_id: serenity::ChannelId,
    outcome: ThrottleOutcome,
) {
    if outcome.cooldown_ended {
        info!(channel_id = %channel_id, "slowmode cooldown ended");
        if let Err(source) = platform.set_slowmode(channel_id, 0).await {
            warn!(?source, channel_id = %channel_id, "failed to clear slowmode");
        }
        if let Err(source) = platform
            .send_message(channel_id, "**Cooldown period ended!**")
            .await
        {
            warn!(?source, channel_id = %channel_id, "failed to announce cooldown end");
        }
    }

    if let Some(seconds) = outcome.penalty_seconds {
        info!(channel_id = %channel_id, seconds, "slowmode escalated");
        if let Err(source) = platform.set_slowmode(channel_id, seconds).await {
            warn!(?source, channel_id = %channel_id, "failed to apply slowmode");
        }
        if let Err(source) = platform
            .send_message(channel_id, &format!("**Cooldown set to {seconds} seconds!**"))
            .await
        {
            warn!(?source, channel_id = %channel_id, "failed to announce cooldown");
        }
    }
}
