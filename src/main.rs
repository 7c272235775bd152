// Guild Warden
// A small Discord bot for server onboarding, tickets, suggestions and announcements

mod commands;
mod features;
mod models;
mod store;
mod utils;
mod wizard;

use poise::serenity_prelude as serenity;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::features::events::PersistentComponents;
use crate::store::{ConfigStore, MessageTypeCatalog};
use crate::utils::config::Settings;
use crate::utils::lock::InstanceLock;

/// User data shared across all commands
pub struct Data {
    pub settings: Settings,
    pub guild_configs: RwLock<ConfigStore>,
    pub message_types: RwLock<MessageTypeCatalog>,
    pub components: PersistentComponents,
}

// Manual Debug impl so the token never lands in logs
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("prefix", &self.settings.prefix)
            .field("data_dir", &self.settings.data_dir)
            .field("components", &self.components.len())
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::roles::role_auto_assign(),
        commands::roles::ticket_mention_role(),
        commands::channels::ticket_channel_setup(),
        commands::channels::suggestion_channel_setup(),
        commands::purge::purge_channel(),
        commands::announcement::announcement_authorize_role(),
        commands::announcement::announcement_revoke_role(),
        commands::announcement::announcement_compose(),
        commands::message_type::message_type_list(),
        commands::message_type::message_type_create(),
        commands::message_type::message_type_delete(),
        commands::config::config_show(),
        commands::ping::ping(),
        commands::help::help(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Framework setup failed: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command {} failed: {:?}", ctx.command().name, error);
            let _ = ctx.say(format!("❌ Error: {}", error)).await;
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            warn!("{} lacks permissions for {}", ctx.author().name, ctx.command().name);
            let _ = ctx
                .say("❌ You need the Administrator permission to use this command.")
                .await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            warn!("Missing bot permissions for {}: {}", ctx.command().name, missing_permissions);
            let _ = ctx
                .say(format!("❌ I need these permissions first: {}", missing_permissions))
                .await;
        }
        poise::FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            if let Some(error) = error {
                error!("Check for {} failed: {:?}", ctx.command().name, error);
            }
            let _ = ctx.say("❌ You are not allowed to use this command.").await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            let _ = ctx.say("❌ This command can only be used in a server.").await;
        }
        err => {
            if let Err(e) = poise::builtins::on_error(err).await {
                error!("Error while handling framework error: {:?}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("guild_warden=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    info!("Starting Guild Warden...");

    // Held until main returns so a second process refuses to start
    let lock = InstanceLock::acquire(&settings.lock_file)?;
    info!("Instance lock held at {}", lock.path().display());

    let guild_configs = ConfigStore::load(settings.guild_config_path()).await?;
    let message_types = MessageTypeCatalog::load(settings.message_types_path()).await?;
    info!("Loaded guild configuration from {}", guild_configs.path().display());
    if message_types.is_empty() {
        warn!("The message type catalog is empty; announcements have no style to use");
    }

    let token = settings.discord_token.clone();
    let prefix = settings.prefix.clone();

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            post_command: |ctx| {
                Box::pin(async move {
                    features::events::persist(&ctx.data().guild_configs).await;
                })
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(features::events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                let components = PersistentComponents::install();
                info!("Routing {} persistent components", components.len());

                Ok(Data {
                    settings,
                    guild_configs: RwLock::new(guild_configs),
                    message_types: RwLock::new(message_types),
                    components,
                })
            })
        })
        .build();

    // MESSAGE_CONTENT and GUILD_MEMBERS are privileged; enable them in the Developer Portal
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {:?}", e),
        }
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    drop(lock);
    info!("Goodbye!");
    Ok(())
}
