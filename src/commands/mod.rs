// Command surface
pub mod announcement;
pub mod channels;
pub mod config;
pub mod help;
pub mod message_type;
pub mod ping;
pub mod purge;
pub mod roles;

use crate::wizard::candidates::{channel_candidates, guild_channels, guild_roles, role_candidates};
use crate::wizard::Candidate;
use crate::Context;

/// Roles that can be offered in a menu, computed fresh from the cache
pub fn role_choices(ctx: Context<'_>) -> Vec<Candidate> {
    match ctx.guild() {
        Some(guild) => role_candidates(guild.id.get(), guild_roles(&guild)),
        None => Vec::new(),
    }
}

/// Text channels the bot can post in, computed fresh from the cache
pub fn channel_choices(ctx: Context<'_>) -> Vec<Candidate> {
    let bot_id = ctx.cache().current_user().id;
    match ctx.guild() {
        Some(guild) => channel_candidates(guild_channels(&guild, bot_id)),
        None => Vec::new(),
    }
}
