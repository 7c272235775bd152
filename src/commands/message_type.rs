// Message type catalog management

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::models::message_type::MessageType;
use crate::store::StoreError;
use crate::utils::config::colors;
use crate::{Context, Error};

fn catalog_description<'a>(types: impl Iterator<Item = (&'a str, &'a MessageType)>) -> String {
    let lines: Vec<String> = types
        .map(|(name, ty)| format!("{} **{}** `{}`", ty.icon, name, ty.color_hex))
        .collect();
    if lines.is_empty() {
        "No message types yet. Create one with `message-type-create`.".to_string()
    } else {
        lines.join("\n")
    }
}

/// List the announcement message types
#[poise::command(
    slash_command,
    prefix_command,
    rename = "message-type-list",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn message_type_list(ctx: Context<'_>) -> Result<(), Error> {
    let description = {
        let catalog = ctx.data().message_types.read().await;
        catalog_description(catalog.iter())
    };
    let embed = serenity::CreateEmbed::new()
        .title("🎨 Message Types")
        .description(description)
        .color(colors::INFO);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Create or replace an announcement message type
#[poise::command(
    slash_command,
    prefix_command,
    rename = "message-type-create",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn message_type_create(
    ctx: Context<'_>,
    #[description = "Type name"] name: String,
    #[description = "Icon shown before the title"] icon: String,
    #[description = "Hex color, e.g. #5865F2"] color: String,
) -> Result<(), Error> {
    let result = ctx
        .data()
        .message_types
        .write()
        .await
        .create(&name, &icon, &color)
        .await;

    match result {
        Ok(key) => {
            info!("Message type {} saved by {}", key, ctx.author().name);
            ctx.say(format!("✅ Message type `{}` saved.", key)).await?;
        }
        Err(StoreError::InvalidMessageType(e)) => {
            ctx.say(format!("❌ {}", e)).await?;
        }
        Err(e) => {
            error!("Failed to save message type {}: {}", name, e);
            ctx.say("❌ The message type could not be saved.").await?;
        }
    }
    Ok(())
}

/// Delete an announcement message type
#[poise::command(
    slash_command,
    prefix_command,
    rename = "message-type-delete",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn message_type_delete(
    ctx: Context<'_>,
    #[description = "Type name"] name: String,
) -> Result<(), Error> {
    let result = ctx.data().message_types.write().await.delete(&name).await;

    match result {
        Ok(true) => {
            info!("Message type {} deleted by {}", name, ctx.author().name);
            ctx.say(format!("🗑️ Message type `{}` deleted.", name.trim())).await?;
        }
        Ok(false) => {
            ctx.say(format!("ℹ️ There is no message type named `{}`.", name.trim()))
                .await?;
        }
        Err(StoreError::InvalidMessageType(e)) => {
            ctx.say(format!("❌ {}", e)).await?;
        }
        Err(e) => {
            error!("Failed to delete message type {}: {}", name, e);
            ctx.say("❌ The message type could not be deleted.").await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_description() {
        let update = MessageType::new("🔄", "#3498db").unwrap();
        let warning = MessageType::new("⚠️", "e67e22").unwrap();
        let types = vec![("update", &update), ("warning", &warning)];

        assert_eq!(
            catalog_description(types.into_iter()),
            "🔄 **update** `#3498DB`\n⚠️ **warning** `#E67E22`"
        );
        assert!(catalog_description(std::iter::empty()).starts_with("No message types"));
    }
}
