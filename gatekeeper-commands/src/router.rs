//! Text command dispatch.
//!
//! A flat table maps the lower-cased command name to a handler. Anything that
//! does not start with the prefix, or names an unknown command, is ignored.

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::{debug, error};

use gatekeeper_core::{BoxFuture, Data, Error, Platform, UserInfo};
use gatekeeper_utils::parse::{ParsedCommand, parse_command};

use crate::messages::command_failed_message;
use crate::{approval, jail, roles, utility};

/// A guild text message as delivered by the gateway.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub guild_id: Option<serenity::GuildId>,
    pub channel_id: serenity::ChannelId,
    pub message_id: serenity::MessageId,
    pub author: UserInfo,
    pub content: String,
    pub mentions: Vec<UserInfo>,
}

/// Everything a command handler gets to work with.
pub struct CommandContext<'a> {
    pub platform: &'a dyn Platform,
    pub data: &'a Data,
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub message_id: serenity::MessageId,
    pub author: &'a UserInfo,
    pub mentions: &'a [UserInfo],
    pub command: ParsedCommand,
}

impl CommandContext<'_> {
    pub fn args(&self) -> &[String] {
        &self.command.args
    }

    /// Reply in the invoking channel.
    pub async fn say(&self, content: impl AsRef<str>) -> Result<(), Error> {
        self.platform
            .send_message(self.channel_id, content.as_ref())
            .await
    }
}

pub type Handler = for<'a> fn(&'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>>;

/// What [`CommandRouter::dispatch`] did with a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a command, not in a guild, from a bot, or an unknown name.
    Ignored,
    Handled,
    /// The handler failed; the failure was logged and reported.
    Failed,
}

#[derive(Default)]
pub struct CommandRouter {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_commands() -> Self {
        let mut router = Self::new();
        router
            .register(approval::apply::META.name, approval::apply::apply)
            .register(approval::approve::META.name, approval::approve::approve)
            .register(approval::ban::META.name, approval::ban::ban)
            .register(approval::close::META.name, approval::close::close)
            .register(approval::vc::META.name, approval::vc::vc)
            .register(roles::listroles::META.name, roles::listroles::listroles)
            .register(roles::addrole::META.name, roles::addrole::addrole)
            .register(roles::removerole::META.name, roles::removerole::removerole)
            .register(roles::moderators::ADDMOD_META.name, roles::moderators::addmod)
            .register(roles::moderators::REMOVEMOD_META.name, roles::moderators::removemod)
            .register(jail::JAIL_META.name, jail::jail)
            .register(jail::UNJAIL_META.name, jail::unjail)
            .register(utility::help::META.name, utility::help::help_text_command);
        router
    }

    pub fn register(&mut self, name: &'static str, handler: Handler) -> &mut Self {
        self.handlers.insert(name, handler);
        self
    }

    pub fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Parse `message` and run the matching handler.
    ///
    /// Handler errors never escape: they are logged and a short failure notice
    /// is sent to the invoking channel.
    pub async fn dispatch(
        &self,
        platform: &dyn Platform,
        data: &Data,
        message: &InboundMessage,
    ) -> Dispatch {
        if message.author.bot {
            return Dispatch::Ignored;
        }

        let Some(guild_id) = message.guild_id else {
            return Dispatch::Ignored;
        };

        let Some(command) = parse_command(&message.content) else {
            return Dispatch::Ignored;
        };

        let Some(handler) = self.handler(&command.name) else {
            debug!(command = %command.name, "unknown command invocation");
            return Dispatch::Ignored;
        };

        let ctx = CommandContext {
            platform,
            data,
            guild_id,
            channel_id: message.channel_id,
            message_id: message.message_id,
            author: &message.author,
            mentions: &message.mentions,
            command,
        };

        match handler(&ctx).await {
            Ok(()) => Dispatch::Handled,
            Err(source) => {
                error!(
                    ?source,
                    command = %ctx.command.name,
                    guild_id = %guild_id,
                    channel_id = %ctx.channel_id,
                    "command error"
                );

                if let Err(source) = ctx.say(command_failed_message()).await {
                    debug!(?source, "failed to report command error");
                }

                Dispatch::Failed
            }
        }
    }
}
