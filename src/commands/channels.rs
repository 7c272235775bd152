// Channel settings - where tickets and suggestions are delivered

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use super::channel_choices;
use crate::features::{suggestion, ticket};
use crate::models::guild::Setting;
use crate::wizard::{view, Stage, Wizard};
use crate::{Context, Error};

/// Choose the channel for role requests and post the ticket button
#[poise::command(
    slash_command,
    prefix_command,
    rename = "ticket-channel-setup",
    aliases("ticket"),
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn ticket_channel_setup(ctx: Context<'_>) -> Result<(), Error> {
    configure_channel(
        ctx,
        "📌 Select the channel tickets will be sent to:",
        "Select the ticket channel",
        Setting::TicketChannel,
        ticket::panel,
    )
    .await
}

/// Choose the channel for anonymous suggestions and post the suggestion button
#[poise::command(
    slash_command,
    prefix_command,
    rename = "suggestion-channel-setup",
    aliases("suggestions"),
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn suggestion_channel_setup(ctx: Context<'_>) -> Result<(), Error> {
    configure_channel(
        ctx,
        "🔹 Select the channel that will receive suggestions and complaints:",
        "Select the suggestion channel",
        Setting::SuggestionChannel,
        suggestion::panel,
    )
    .await
}

async fn configure_channel(
    ctx: Context<'_>,
    prompt: &str,
    placeholder: &str,
    setting: fn(serenity::ChannelId) -> Setting,
    panel: fn() -> serenity::CreateMessage,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let wizard = Wizard::start(
        ctx.author().id,
        vec![Stage::select("channel", placeholder, channel_choices(ctx))],
    );
    let Some(done) = view::run(ctx, prompt, wizard).await? else {
        return Ok(());
    };
    let Some(channel_id) = done.selections.pick_id("channel").map(serenity::ChannelId::new) else {
        return Ok(());
    };

    let setting = setting(channel_id);
    let saved = ctx.data().guild_configs.write().await.set(guild_id, setting).await;
    if let Err(e) = saved {
        error!("Failed to save {} for guild {}: {}", setting.label(), guild_id, e);
        done.responder
            .reply(ctx, "❌ The setting was applied but could not be saved.")
            .await?;
        return Ok(());
    }

    info!(
        "{} set {} to {} in guild {}",
        done.responder.user().name,
        setting.label(),
        channel_id,
        guild_id
    );
    done.responder
        .reply(ctx, format!("✅ {} set to <#{}>.", setting.label(), channel_id))
        .await?;
    ctx.channel_id().send_message(ctx, panel()).await?;

    Ok(())
}
