// Event-driven features: lifecycle handlers and persistent components
pub mod auto_role;
pub mod events;
pub mod suggestion;
pub mod ticket;

use poise::serenity_prelude as serenity;

/// Ephemeral answer to a modal submission
pub async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    content: impl Into<String>,
) -> Result<(), serenity::Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}
