// Anonymous suggestions and complaints through a persistent button

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use super::reply_ephemeral;
use crate::utils::config::colors;
use crate::wizard::view::{build_modal, form_values};
use crate::wizard::{submit_form, FormField, FormSpec};
use crate::{Data, Error};

pub const BUTTON_ID: &str = "suggestion_button";
pub const MODAL_ID: &str = "suggestion_modal";

pub fn suggestion_form() -> FormSpec {
    FormSpec::new(
        "Send a suggestion or complaint",
        vec![FormField::paragraph("message", "Write here").max_length(2000)],
    )
}

/// Message carrying the suggestion button
pub fn panel() -> serenity::CreateMessage {
    serenity::CreateMessage::new()
        .content("**📜 Send your suggestion or complaint anonymously. Nobody will know it was you.**")
        .components(vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(BUTTON_ID)
                .label("Send suggestion/complaint")
                .emoji('💡')
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
            serenity::CreateInteractionResponse::Modal(build_modal(MODAL_ID, &suggestion_form())),
        )
        .await?;
    Ok(())
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

    let selections = match submit_form(modal.user.id, suggestion_form(), form_values(&modal.data.components)) {
        Ok(selections) => selections,
        Err(rejection) => {
            reply_ephemeral(ctx, modal, format!("❌ {}", rejection)).await?;
            return Ok(());
        }
    };

    let Some(channel_id) = data.guild_configs.read().await.get(guild_id).suggestion_channel else {
        reply_ephemeral(ctx, modal, "❌ No channel is configured to receive suggestions.").await?;
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .title("📢 Anonymous Suggestion/Complaint")
        .description(selections.field("message").unwrap_or_default())
        .color(colors::WARNING)
        .footer(serenity::CreateEmbedFooter::new("Sent anonymously"));

    if let Err(e) = channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        error!("Failed to deliver suggestion to {} in guild {}: {:?}", channel_id, guild_id, e);
        reply_ephemeral(ctx, modal, "❌ The suggestion channel could not be reached.").await?;
        return Ok(());
    }

    info!("Anonymous suggestion delivered in guild {}", guild_id);
    reply_ephemeral(ctx, modal, "✅ Your message was sent anonymously!").await?;
    Ok(())
}
