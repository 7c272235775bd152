// Building select options from guild roles and channels

use poise::serenity_prelude as serenity;

use super::Candidate;

/// Maximum characters in a select option label
pub const LABEL_LIMIT: usize = 100;

/// Role fields that decide whether it can be offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: u64,
    pub name: String,
    pub managed: bool,
    pub position: u16,
}

/// Channel fields that decide whether it can be offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub position: u16,
    pub is_text: bool,
    pub can_send: bool,
}

pub fn truncate_label(label: &str) -> String {
    if label.chars().count() <= LABEL_LIMIT {
        label.to_string()
    } else {
        label.chars().take(LABEL_LIMIT).collect()
    }
}

/// Assignable roles: not integration-managed, not `@everyone`, not blank.
/// Highest role first.
pub fn role_candidates(guild_id: u64, mut roles: Vec<RoleInfo>) -> Vec<Candidate> {
    roles.retain(|r| !r.managed && r.id != guild_id && !r.name.trim().is_empty());
    roles.sort_by(|a, b| b.position.cmp(&a.position).then(a.id.cmp(&b.id)));
    roles
        .into_iter()
        .map(|r| Candidate::new(r.id, &r.name))
        .collect()
}

/// Text channels the bot can post in, in sidebar order
pub fn channel_candidates(mut channels: Vec<ChannelInfo>) -> Vec<Candidate> {
    channels.retain(|c| c.is_text && c.can_send);
    channels.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));
    channels
        .into_iter()
        .map(|c| Candidate::new(c.id, &format!("#{}", c.name)))
        .collect()
}

pub fn guild_roles(guild: &serenity::Guild) -> Vec<RoleInfo> {
    guild
        .roles
        .values()
        .map(|r| RoleInfo {
            id: r.id.get(),
            name: r.name.clone(),
            managed: r.managed,
            position: r.position,
        })
        .collect()
}

/// Guild channels with the bot's send permission resolved
pub fn guild_channels(guild: &serenity::Guild, bot_id: serenity::UserId) -> Vec<ChannelInfo> {
    let Some(me) = guild.members.get(&bot_id) else {
        return Vec::new();
    };

    guild
        .channels
        .values()
        .map(|c| ChannelInfo {
            id: c.id.get(),
            name: c.name.clone(),
            position: c.position,
            is_text: c.kind == serenity::ChannelType::Text,
            can_send: guild.user_permissions_in(c, me).send_messages(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, name: &str, managed: bool, position: u16) -> RoleInfo {
        RoleInfo {
            id,
            name: name.to_string(),
            managed,
            position,
        }
    }

    fn channel(id: u64, name: &str, position: u16, is_text: bool, can_send: bool) -> ChannelInfo {
        ChannelInfo {
            id,
            name: name.to_string(),
            position,
            is_text,
            can_send,
        }
    }

    #[test]
    fn test_role_candidates_filter_and_order() {
        let roles = vec![
            role(1, "@everyone", false, 0),
            role(2, "Member", false, 1),
            role(3, "Some Bot", true, 5),
            role(4, "Moderator", false, 4),
            role(5, "   ", false, 2),
        ];

        let candidates = role_candidates(1, roles);
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Moderator", "Member"]);
        assert_eq!(candidates[0].value, "4");
    }

    #[test]
    fn test_channel_candidates_filter_and_order() {
        let channels = vec![
            channel(10, "rules", 0, true, false),
            channel(11, "general", 2, true, true),
            channel(12, "voice", 1, false, true),
            channel(13, "tickets", 1, true, true),
        ];

        let candidates = channel_candidates(channels);
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["#tickets", "#general"]);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short"), "short");
        let long = "é".repeat(150);
        assert_eq!(truncate_label(&long).chars().count(), LABEL_LIMIT);
    }
}
