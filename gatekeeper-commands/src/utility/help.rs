use tracing::debug;

use crate::router::CommandContext;
use crate::{COMMANDS, CommandMeta};
use gatekeeper_core::{BoxFuture, Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "*help",
};

/// Slash variant; replies ephemerally with the command list.
#[poise::command(slash_command, category = "Utility")]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(help_text())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Text variant; sends the list privately and removes the invocation.
pub fn help_text_command<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(async move {
        if let Err(source) = ctx
            .platform
            .send_direct_message(ctx.author.id, &help_text())
            .await
        {
            debug!(?source, "help DM failed, replying in channel");
            return ctx.say(help_text()).await;
        }

        if let Err(source) = ctx
            .platform
            .delete_message(ctx.channel_id, ctx.message_id)
            .await
        {
            debug!(?source, "failed to delete *help invocation");
        }

        Ok(())
    })
}

/// Commands grouped by category, each with its usage.
pub fn help_text() -> String {
    let mut commands: Vec<&CommandMeta> = COMMANDS.iter().collect();
    commands.sort_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    let mut out = String::from("**Available Commands**\n");
    let mut current_category: Option<&str> = None;
    for command in commands {
        if current_category != Some(command.category) {
            out.push_str(&format!("\n**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!("`{}`: {}\n", command.usage, command.desc));
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
