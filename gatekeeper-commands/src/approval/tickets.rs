//! Approval ticket lifecycle.
//!
//! A ticket is nothing more than a channel named `approval-<userId>` inside a
//! category whose name starts with `Approval`. It is opened by `*apply` and
//! ends when the channel is deleted by an approval, a ban, a close, or the
//! applicant leaving the guild.

use anyhow::bail;
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use gatekeeper_core::{ChannelInfo, ChannelKind, Data, Error, NewChannel, Platform, UserInfo};
use gatekeeper_database::ResourceKind;
use gatekeeper_utils::parse::{TICKET_CHANNEL_PREFIX, ticket_channel_name, ticket_user_id};

use crate::approval::transcript::archive_transcript;
use crate::resources::{ensure_in, ensure_resource};

/// Name of the category new tickets are created in.
pub const APPROVAL_CATEGORY: &str = "Approval";
/// Channels the approval category may hold before `*apply` is refused.
pub const CATEGORY_CAPACITY: usize = 45;

/// An open ticket channel and the applicant it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub channel: ChannelInfo,
    pub applicant_id: serenity::UserId,
}

impl Ticket {
    pub fn applicant_mention(&self) -> String {
        format!("<@{}>", self.applicant_id.get())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(ChannelInfo),
    AlreadyExists(ChannelInfo),
    CategoryFull,
}

/// Whether `channel` is a ticket: prefixed name and a parent category whose
/// name starts with `Approval`.
pub fn is_ticket_channel(channel: &ChannelInfo, channels: &[ChannelInfo]) -> bool {
    if !channel.name.starts_with(TICKET_CHANNEL_PREFIX) {
        return false;
    }

    let Some(parent_id) = channel.parent_id else {
        return false;
    };

    channels.iter().any(|parent| {
        parent.id == parent_id
            && parent.kind == ChannelKind::Category
            && parent.name.starts_with(APPROVAL_CATEGORY)
    })
}

fn find_ticket_in(channels: &[ChannelInfo], user_id: serenity::UserId) -> Option<&ChannelInfo> {
    let name = ticket_channel_name(user_id.get());
    channels
        .iter()
        .find(|channel| channel.name == name && is_ticket_channel(channel, channels))
}

/// Look up `channel_id` as a ticket.
///
/// Fails when the channel no longer exists, so a second approve/ban/close
/// racing the first one stops here. Returns `None` for channels that exist but
/// are not tickets.
pub async fn resolve_ticket(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> Result<Option<Ticket>, Error> {
    let channels = platform.channels(guild_id).await?;
    let Some(channel) = channels.iter().find(|channel| channel.id == channel_id) else {
        bail!("channel {channel_id} can no longer be found");
    };

    if !is_ticket_channel(channel, &channels) {
        return Ok(None);
    }

    let Some(applicant_id) = ticket_user_id(&channel.name) else {
        return Ok(None);
    };

    Ok(Some(Ticket {
        channel: channel.clone(),
        applicant_id: serenity::UserId::new(applicant_id),
    }))
}

/// Open a ticket for `applicant` unless one exists or the category is full.
///
/// Runs under the guild's config lock so concurrent applications from the
/// same user cannot both create a channel.
pub async fn create_ticket_if_absent(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    applicant: &UserInfo,
) -> Result<ApplyOutcome, Error> {
    let mut config = data.store.lock(guild_id.get()).await;
    let before = config.clone();

    let channels = platform.channels(guild_id).await?;
    if let Some(existing) = find_ticket_in(&channels, applicant.id) {
        return Ok(ApplyOutcome::AlreadyExists(existing.clone()));
    }

    let category = match channels
        .iter()
        .find(|channel| channel.kind == ChannelKind::Category && channel.name == APPROVAL_CATEGORY)
    {
        Some(category) => category.clone(),
        None => {
            info!(guild_id = %guild_id, "creating missing approval category");
            let mut new_category = NewChannel::category(APPROVAL_CATEGORY);
            new_category.reason = Some("Approval category missing, created it.".to_owned());
            platform.create_channel(guild_id, &new_category).await?
        }
    };

    let occupied = channels
        .iter()
        .filter(|channel| channel.parent_id == Some(category.id))
        .count();
    if occupied >= CATEGORY_CAPACITY {
        warn!(guild_id = %guild_id, occupied, "approval category is full");
        return Ok(ApplyOutcome::CategoryFull);
    }

    let moderator_role =
        ensure_in(platform, guild_id, &mut config, ResourceKind::ModeratorRole).await?;
    if *config != before {
        config.save();
    }

    let ticket = NewChannel {
        name: ticket_channel_name(applicant.id.get()),
        category: false,
        parent_id: Some(category.id),
        visible_to_roles: vec![serenity::RoleId::new(moderator_role)],
        visible_to_users: vec![platform.bot_user_id(), applicant.id],
        reason: Some(format!("Approval ticket for {}", applicant.name)),
    };
    let created = platform.create_channel(guild_id, &ticket).await?;

    info!(
        guild_id = %guild_id,
        user_id = %applicant.id,
        channel_id = %created.id,
        "approval ticket opened"
    );

    Ok(ApplyOutcome::Created(created))
}

/// Archive the transcript of `channel`, then delete it.
///
/// The archive step is best-effort: its failure is logged and the deletion
/// still happens.
pub async fn delete_ticket_channel(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    channel: &ChannelInfo,
    reason: &str,
) -> Result<(), Error> {
    if let Err(source) = archive_transcript(platform, &data.store, guild_id, channel, reason).await
    {
        warn!(?source, channel_id = %channel.id, "failed to archive ticket transcript");
    }

    platform.delete_channel(channel.id, reason).await?;
    info!(guild_id = %guild_id, channel = %channel.name, reason, "approval ticket deleted");
    Ok(())
}

/// Close a ticket without approving or banning the applicant.
///
/// The applicant is told in the limbo channel who closed it (`closer`), or
/// that it was closed automatically.
pub async fn close_ticket(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    ticket: &Ticket,
    reason: &str,
    closer: Option<&UserInfo>,
) -> Result<(), Error> {
    let who = match closer {
        Some(closer) => format!("by {}", closer.display_name),
        None => "automatically".to_owned(),
    };

    if let Err(source) = notify_closed(platform, data, guild_id, ticket, &who, reason).await {
        warn!(?source, user_id = %ticket.applicant_id, "failed to notify applicant of closed ticket");
    }

    delete_ticket_channel(
        platform,
        data,
        guild_id,
        &ticket.channel,
        &format!("Approval channel closed {who}. Reason: '{reason}'"),
    )
    .await
}

async fn notify_closed(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    ticket: &Ticket,
    who: &str,
    reason: &str,
) -> Result<(), Error> {
    let limbo = ensure_resource(platform, &data.store, guild_id, ResourceKind::LimboChannel).await?;
    platform
        .send_message(
            serenity::ChannelId::new(limbo),
            &format!(
                "{} your approval ticket has been closed {}. Reason: {}\n\n\
                 Please say `*apply` in this limbo channel to apply again.",
                ticket.applicant_mention(),
                who,
                reason
            ),
        )
        .await
}

/// Delete every ticket belonging to `user_id`; returns how many were removed.
pub async fn delete_tickets_of(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    reason: &str,
) -> Result<usize, Error> {
    let channels = platform.channels(guild_id).await?;
    let name = ticket_channel_name(user_id.get());

    let mut deleted = 0;
    for channel in channels
        .iter()
        .filter(|channel| channel.name == name && is_ticket_channel(channel, &channels))
    {
        match delete_ticket_channel(platform, data, guild_id, channel, reason).await {
            Ok(()) => deleted += 1,
            Err(source) => {
                warn!(?source, channel_id = %channel.id, "failed to delete ticket of departed member")
            }
        }
    }

    Ok(deleted)
}

/// Message posted when a ticket opens.
pub fn questionnaire(guild_name: &str, applicant: &UserInfo) -> String {
    let joined_discord = applicant.id.created_at().unix_timestamp();

    format!(
        "{} welcome to the {} Discord server! Since we get a lot of trolls and spammers, \
         we require you to go through an approval process.\n\n\
         Please answer the following questions:\n\
         **1)** What is your faith/religion? (You don't have to share our faith to join!)\n\
         **2)** Where did you hear of this server? __(Please be detailed - if a friend invited you, give their name)__\n\
         **3)** What do you want to do in this server?\n\
         **4)** Is there anything else the moderators should know?\n\n\
         A moderator will review your answers shortly.\n\
         **Joined Discord :** <t:{}:f>",
        applicant.mention(),
        guild_name,
        joined_discord
    )
}
