// Ticket system - role requests submitted through a persistent button

use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{error, info, warn};

use super::reply_ephemeral;
use crate::utils::config::colors;
use crate::wizard::view::{build_modal, form_values};
use crate::wizard::{submit_form, FormField, FormSpec};
use crate::{Data, Error};

pub const BUTTON_ID: &str = "ticket_button";
pub const MODAL_ID: &str = "ticket_modal";

pub fn ticket_form() -> FormSpec {
    FormSpec::new(
        "Request a Role",
        vec![
            FormField::short("name", "Name")
                .placeholder("Type your full name")
                .max_length(32),
            FormField::paragraph("role", "Department / desired role")
                .placeholder("e.g. Finance, HR...")
                .max_length(1000),
        ],
    )
}

/// Message carrying the ticket button
pub fn panel() -> serenity::CreateMessage {
    serenity::CreateMessage::new()
        .content("📉 Request your role below:")
        .components(vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(BUTTON_ID)
                .label("Request role")
                .emoji('📬')
                .style(serenity::ButtonStyle::Secondary),
        ])])
}

pub async fn open_form(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Modal(build_modal(MODAL_ID, &ticket_form())),
        )
        .await?;
    Ok(())
}

fn ticket_embed(user: &serenity::User, requested: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📉 New Role Request")
        .color(colors::PRIMARY)
        .field("User", user.mention().to_string(), false)
        .field("Requested role", requested, false)
        .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", user.id)))
        .timestamp(serenity::Timestamp::now())
}

pub async fn handle_submission(
    ctx: &serenity::Context,
    modal: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = modal.guild_id else {
        reply_ephemeral(ctx, modal, "This can only be used in a server.").await?;
        return Ok(());
    };

    let selections = match submit_form(modal.user.id, ticket_form(), form_values(&modal.data.components)) {
        Ok(selections) => selections,
        Err(rejection) => {
            reply_ephemeral(ctx, modal, format!("❌ {}", rejection)).await?;
            return Ok(());
        }
    };
    let name = selections.field("name").unwrap_or_default();
    let requested = selections.field("role").unwrap_or_default();

    let config = data.guild_configs.read().await.get(guild_id);
    let Some(channel_id) = config.ticket_channel else {
        reply_ephemeral(ctx, modal, "❌ No channel is configured to receive tickets.").await?;
        return Ok(());
    };

    if let Err(e) = guild_id
        .edit_member(&ctx.http, modal.user.id, serenity::EditMember::new().nickname(name))
        .await
    {
        warn!("Could not rename {} in guild {}: {:?}", modal.user.id, guild_id, e);
        reply_ephemeral(
            ctx,
            modal,
            "❌ I couldn't change your nickname (does the bot have permission to manage nicknames?)",
        )
        .await?;
        return Ok(());
    }

    let mut message = serenity::CreateMessage::new().embed(ticket_embed(&modal.user, requested));
    if let Some(role_id) = config.mention_role {
        message = message
            .content(role_id.mention().to_string())
            .allowed_mentions(serenity::CreateAllowedMentions::new().roles(vec![role_id]));
    }

    if let Err(e) = channel_id.send_message(&ctx.http, message).await {
        error!("Failed to deliver ticket to {} in guild {}: {:?}", channel_id, guild_id, e);
        reply_ephemeral(ctx, modal, "❌ The ticket channel could not be reached.").await?;
        return Ok(());
    }

    info!("Ticket from {} delivered to {} in guild {}", modal.user.id, channel_id, guild_id);
    reply_ephemeral(ctx, modal, "✅ Request sent! Your nickname has been updated.").await?;
    Ok(())
}
