// Role settings - auto role for new members and the ticket mention role

use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{error, info};

use super::role_choices;
use crate::models::guild::Setting;
use crate::wizard::{view, Stage, Wizard};
use crate::{Context, Error};

/// Set the role automatically given to new members
#[poise::command(
    slash_command,
    prefix_command,
    rename = "role-auto-assign",
    aliases("autorole"),
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn role_auto_assign(ctx: Context<'_>) -> Result<(), Error> {
    configure_role(
        ctx,
        "👥 Select the role new members receive:",
        "Select the automatic role",
        Setting::AutoRole,
    )
    .await
}

/// Set the role mentioned when a ticket arrives
#[poise::command(
    slash_command,
    prefix_command,
    rename = "ticket-mention-role",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn ticket_mention_role(ctx: Context<'_>) -> Result<(), Error> {
    configure_role(
        ctx,
        "🔣 Select the role mentioned on new tickets:",
        "Select the role to mention on tickets",
        Setting::MentionRole,
    )
    .await
}

async fn configure_role(
    ctx: Context<'_>,
    prompt: &str,
    placeholder: &str,
    setting: fn(serenity::RoleId) -> Setting,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let wizard = Wizard::start(
        ctx.author().id,
        vec![Stage::select("role", placeholder, role_choices(ctx))],
    );
    let Some(done) = view::run(ctx, prompt, wizard).await? else {
        return Ok(());
    };
    let Some(role_id) = done.selections.pick_id("role").map(serenity::RoleId::new) else {
        return Ok(());
    };

    let setting = setting(role_id);
    let saved = ctx.data().guild_configs.write().await.set(guild_id, setting).await;
    match saved {
        Ok(()) => {
            info!(
                "{} set {} to {} in guild {}",
                done.responder.user().name,
                setting.label(),
                role_id,
                guild_id
            );
            done.responder
                .reply(ctx, format!("✅ {} set to {}", setting.label(), role_id.mention()))
                .await?
        }
        Err(e) => {
            error!("Failed to save {} for guild {}: {}", setting.label(), guild_id, e);
            done.responder
                .reply(ctx, "❌ The setting was applied but could not be saved.")
                .await?
        }
    }

    Ok(())
}
