pub mod approval;
pub mod authorization;
pub mod jail;
pub mod membership;
pub(crate) mod messages;
pub mod resources;
pub mod roles;
pub mod router;
pub mod throttle;
pub mod utility;

use std::sync::LazyLock;

use gatekeeper_core::{Data, Error};

pub use router::{CommandContext, CommandRouter, Dispatch, Handler, InboundMessage};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    approval::apply::META,
    approval::approve::META,
    approval::ban::META,
    approval::close::META,
    approval::vc::META,
    roles::listroles::META,
    roles::addrole::META,
    roles::removerole::META,
    roles::moderators::ADDMOD_META,
    roles::moderators::REMOVEMOD_META,
    jail::JAIL_META,
    jail::UNJAIL_META,
    utility::help::META,
];

static ROUTER: LazyLock<CommandRouter> = LazyLock::new(CommandRouter::with_default_commands);

/// The process-wide text command table.
pub fn router() -> &'static CommandRouter {
    &ROUTER
}

/// Application commands registered through poise.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![utility::help::help()]
}
