/// Discord rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2_000;

/// Neutralize mentions in user-provided text.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

/// Format one transcript line:
/// `[timestamp] display (tag): content` plus `(edited)` when edited.
pub fn transcript_line(
    timestamp: &str,
    author_display: &str,
    author_tag: &str,
    content: &str,
    edited: bool,
) -> String {
    format!(
        "[{}] {} ({}): {}{}",
        timestamp,
        author_display,
        author_tag,
        content.replace("```", "`\u{200B}``"),
        if edited { "(edited)" } else { "" }
    )
}

/// Wrap transcript lines into code-block messages that each fit in one
/// Discord message, with `header` prepended to the first.
pub fn transcript_messages(header: &str, lines: &[String]) -> Vec<String> {
    const OPEN: &str = "```Log\n";
    const CLOSE: &str = "\n```";
    const HEADER_MAX: usize = 500;

    let header = truncate_chars(header, HEADER_MAX);
    let budget = MESSAGE_LIMIT - OPEN.len() - CLOSE.len();
    let first_budget = budget - header.len() - 1;

    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in lines {
        let limit = if blocks.is_empty() { first_budget } else { budget };
        let line = truncate_chars(line, limit);
        let needed = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };

        if needed > limit && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }
    blocks.push(current);

    blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| {
            if index == 0 {
                format!("{header}\n{OPEN}{block}{CLOSE}")
            } else {
                format!("{OPEN}{block}{CLOSE}")
            }
        })
        .collect()
}

/// Cut `text` to at most `max_bytes`, respecting char boundaries.
fn truncate_chars(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_owned();
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_owned()
}
