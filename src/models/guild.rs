use std::collections::BTreeSet;

use poise::serenity_prelude as serenity;

/// Guild (Server) specific configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildConfig {
    /// Role granted to members when they join
    pub auto_role: Option<serenity::RoleId>,
    /// Channel where role-request tickets are posted
    pub ticket_channel: Option<serenity::ChannelId>,
    /// Role mentioned whenever a ticket arrives
    pub mention_role: Option<serenity::RoleId>,
    /// Channel receiving anonymous suggestions
    pub suggestion_channel: Option<serenity::ChannelId>,
    /// Persisted but never read by any command
    pub test_channel: Option<serenity::ChannelId>,
    /// Roles allowed to compose announcements
    pub authorized_roles: BTreeSet<serenity::RoleId>,
}

impl GuildConfig {
    /// True when nothing is configured for the guild
    pub fn is_empty(&self) -> bool {
        *self == GuildConfig::default()
    }

    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::AutoRole(id) => self.auto_role = Some(id),
            Setting::TicketChannel(id) => self.ticket_channel = Some(id),
            Setting::MentionRole(id) => self.mention_role = Some(id),
            Setting::SuggestionChannel(id) => self.suggestion_channel = Some(id),
            Setting::TestChannel(id) => self.test_channel = Some(id),
        }
    }
}

/// A single-field update to a guild's configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    AutoRole(serenity::RoleId),
    TicketChannel(serenity::ChannelId),
    MentionRole(serenity::RoleId),
    SuggestionChannel(serenity::ChannelId),
    #[allow(dead_code)]
    TestChannel(serenity::ChannelId),
}

impl Setting {
    pub fn label(&self) -> &'static str {
        match self {
            Setting::AutoRole(_) => "Auto Role",
            Setting::TicketChannel(_) => "Ticket Channel",
            Setting::MentionRole(_) => "Ticket Mention Role",
            Setting::SuggestionChannel(_) => "Suggestion Channel",
            Setting::TestChannel(_) => "Test Channel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(GuildConfig::default().is_empty());
    }

    #[test]
    fn test_apply_sets_one_field() {
        let mut config = GuildConfig::default();
        config.apply(Setting::AutoRole(serenity::RoleId::new(42)));

        assert_eq!(config.auto_role, Some(serenity::RoleId::new(42)));
        assert_eq!(config.ticket_channel, None);
        assert_eq!(config.mention_role, None);
        assert!(config.authorized_roles.is_empty());
        assert!(!config.is_empty());
    }
}
