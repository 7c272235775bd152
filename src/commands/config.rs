use poise::serenity_prelude as serenity;
use serenity::Mentionable;

use crate::models::guild::GuildConfig;
use crate::utils::config::colors;
use crate::{Context, Error};

const NOT_SET: &str = "Not set";

fn role_field(role: Option<serenity::RoleId>) -> String {
    role.map_or_else(|| NOT_SET.to_string(), |id| id.mention().to_string())
}

fn channel_field(channel: Option<serenity::ChannelId>) -> String {
    channel.map_or_else(|| NOT_SET.to_string(), |id| id.mention().to_string())
}

/// Display rows for a server's settings, in a fixed order
fn config_fields(config: &GuildConfig) -> Vec<(&'static str, String)> {
    let authorized = if config.authorized_roles.is_empty() {
        "Administrators only".to_string()
    } else {
        config
            .authorized_roles
            .iter()
            .map(|id| id.mention().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        ("👥 Automatic role", role_field(config.auto_role)),
        ("📌 Ticket channel", channel_field(config.ticket_channel)),
        ("🔣 Ticket mention role", role_field(config.mention_role)),
        ("🔹 Suggestion channel", channel_field(config.suggestion_channel)),
        ("📣 Announcement roles", authorized),
    ]
}

/// Show this server's current settings
#[poise::command(
    slash_command,
    prefix_command,
    rename = "config-show",
    aliases("config"),
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn config_show(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let config = ctx.data().guild_configs.read().await.get(guild_id);
    let embed = config_fields(&config).into_iter().fold(
        serenity::CreateEmbed::new()
            .title("⚙️ Server Configuration")
            .color(colors::INFO),
        |embed, (name, value)| embed.field(name, value, false),
    );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_fields() {
        let fields = config_fields(&GuildConfig::default());
        assert_eq!(fields.len(), 5);
        assert!(fields[..4].iter().all(|(_, value)| value == NOT_SET));
        assert_eq!(fields[4].1, "Administrators only");
    }

    #[test]
    fn test_populated_config_fields() {
        let mut config = GuildConfig {
            auto_role: Some(serenity::RoleId::new(7)),
            suggestion_channel: Some(serenity::ChannelId::new(9)),
            ..Default::default()
        };
        config.authorized_roles.insert(serenity::RoleId::new(3));
        config.authorized_roles.insert(serenity::RoleId::new(2));

        let fields = config_fields(&config);
        assert_eq!(fields[0].1, "<@&7>");
        assert_eq!(fields[1].1, NOT_SET);
        assert_eq!(fields[3].1, "<#9>");
        assert_eq!(fields[4].1, "<@&2>, <@&3>");
    }
}
