use crate::COMMAND_PREFIX;

/// Name prefix of every approval ticket channel.
pub const TICKET_CHANNEL_PREFIX: &str = "approval-";

/// A prefixed text command split into its name and positional arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Arguments from `start` re-joined with single spaces.
    pub fn rest(&self, start: usize) -> String {
        self.args.get(start..).unwrap_or_default().join(" ")
    }
}

/// Split `content` into a command when it starts with the command prefix.
///
/// The name is lower-cased; arguments keep their case.
pub fn parse_command(content: &str) -> Option<ParsedCommand> {
    let body = content.strip_prefix(COMMAND_PREFIX)?;
    let mut tokens = body.split_whitespace();
    let name = tokens.next()?.to_lowercase();

    Some(ParsedCommand {
        name,
        args: tokens.map(str::to_owned).collect(),
    })
}

/// Channel name of the ticket belonging to `user_id`.
pub fn ticket_channel_name(user_id: u64) -> String {
    format!("{TICKET_CHANNEL_PREFIX}{user_id}")
}

/// Applicant id encoded in a ticket channel name.
pub fn ticket_user_id(channel_name: &str) -> Option<u64> {
    channel_name
        .strip_prefix(TICKET_CHANNEL_PREFIX)?
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
}
