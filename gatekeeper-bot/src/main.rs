mod events;
mod platform;
mod settings;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use gatekeeper_core::{Data, Error};
use gatekeeper_database::ConfigStore;

use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    let store = ConfigStore::open(settings.server_data_path()).await?;
    info!(
        path = %settings.server_data_path().display(),
        servers = store.len().await,
        "Server data ready."
    );

    let mut data = Data::new(store.clone());
    data.throttle_enabled = settings.throttle_enabled;
    data.greeting_enabled = settings.greeting_enabled;
    info!(
        throttle_enabled = data.throttle_enabled,
        greeting_enabled = data.greeting_enabled,
        "Features configured."
    );

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: gatekeeper_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Gatekeeper has awoken!");

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                Ok(data)
            })
        })
        .build();

    info!("Gatekeeper is connecting...");

    let mut client = serenity::ClientBuilder::new(settings.token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(source) = tokio::signal::ctrl_c().await {
            error!(?source, "failed to listen for shutdown signal");
            return;
        }

        info!("Shutting down, flushing server data...");
        store.flush().await;
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, "command error");

            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .ephemeral(true)
                        .content("Something went wrong while running this command."),
                )
                .await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            events::messages::handle_message(ctx, data, new_message).await;
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            events::guild::handle_guild_create(ctx, data, guild).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            events::members::handle_member_addition(ctx, data, new_member).await;
        }
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            events::members::handle_member_removal(ctx, data, *guild_id, user).await;
        }
        _ => {}
    }

    Ok(())
}
