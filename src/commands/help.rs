// Help command - list the registered commands

use poise::serenity_prelude as serenity;

use crate::utils::config::colors;
use crate::{Context, Data, Error};

/// One line of the help listing
#[derive(Debug, Clone, PartialEq, Eq)]
struct HelpEntry {
    name: String,
    description: String,
    restricted: bool,
}

fn help_entries(commands: &[poise::Command<Data, Error>]) -> Vec<HelpEntry> {
    commands
        .iter()
        .filter(|command| !command.hide_in_help)
        .map(|command| HelpEntry {
            name: command.name.clone(),
            description: command
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            restricted: !command.required_permissions.is_empty() || !command.checks.is_empty(),
        })
        .collect()
}

/// Embed fields: permission- or check-gated commands first, then public ones
fn help_fields(prefix: &str, entries: &[HelpEntry]) -> Vec<(String, String)> {
    let section = |restricted: bool| {
        entries
            .iter()
            .filter(|entry| entry.restricted == restricted)
            .map(|entry| format!("`{}{}` - {}", prefix, entry.name, entry.description))
            .collect::<Vec<_>>()
    };

    [("🛠️ Staff", section(true)), ("🌐 Everyone", section(false))]
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(title, lines)| (title.to_string(), lines.join("\n")))
        .collect()
}

/// Show the available commands
#[poise::command(slash_command, prefix_command, aliases("commands"))]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = match ctx {
        poise::Context::Prefix(prefix_ctx) => prefix_ctx.prefix.to_string(),
        poise::Context::Application(_) => "/".to_string(),
    };
    let entries = help_entries(&ctx.framework().options().commands);

    let embed = help_fields(&prefix, &entries).into_iter().fold(
        serenity::CreateEmbed::new()
            .title("📚 Available Commands")
            .description("Server setup, tickets, suggestions and announcements")
            .color(colors::PRIMARY),
        |embed, (name, value)| embed.field(name, value, false),
    );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, restricted: bool) -> HelpEntry {
        HelpEntry {
            name: name.to_string(),
            description: format!("does {}", name),
            restricted,
        }
    }

    #[test]
    fn test_help_fields_group_by_permission() {
        let entries = vec![entry("purge-channel", true), entry("ping", false), entry("config-show", true)];
        let fields = help_fields("!", &entries);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "🛠️ Staff");
        assert_eq!(
            fields[0].1,
            "`!purge-channel` - does purge-channel\n`!config-show` - does config-show"
        );
        assert_eq!(fields[1].1, "`!ping` - does ping");
    }

    #[test]
    fn test_help_fields_skip_empty_sections() {
        let fields = help_fields("/", &[entry("help", false)]);
        assert_eq!(fields, vec![("🌐 Everyone".to_string(), "`/help` - does help".to_string())]);
    }

    #[test]
    fn test_help_lists_registered_commands() {
        let entries = help_entries(&crate::get_commands());
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"purge-channel"));
        assert!(names.contains(&"announcement-compose"));
        assert!(entries.iter().any(|e| e.name == "ping" && !e.restricted));
        assert!(entries.iter().any(|e| e.name == "role-auto-assign" && e.restricted));
        assert!(entries.iter().any(|e| e.name == "announcement-compose" && e.restricted));
        assert!(entries.iter().any(|e| e.name == "help" && !e.restricted));
    }
}
