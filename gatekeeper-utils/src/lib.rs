/// Shared formatting helpers (transcripts, mentions, chunking).
pub mod formatting;
/// Message history paging against the Discord API.
pub mod history;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '*';
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Shared time helpers.
pub mod time;
