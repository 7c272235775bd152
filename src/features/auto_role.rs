// Grant the configured role to members as they join

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::{Data, Error};

pub async fn handle_member_join(
    ctx: &serenity::Context,
    member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    let Some(role_id) = data.guild_configs.read().await.get(member.guild_id).auto_role else {
        return Ok(());
    };

    let cached = ctx
        .cache
        .guild(member.guild_id)
        .map(|guild| guild.roles.get(&role_id).map(|role| role.name.clone()));

    let role_name = match cached {
        Some(name) => name,
        None => member
            .guild_id
            .roles(&ctx.http)
            .await?
            .get(&role_id)
            .map(|role| role.name.clone()),
    };

    let Some(role_name) = role_name else {
        warn!(
            "Auto role {} no longer exists in guild {}, skipping",
            role_id, member.guild_id
        );
        return Ok(());
    };

    match member.add_role(&ctx.http, role_id).await {
        Ok(()) => info!("Role {} granted to {}", role_name, member.user.name),
        Err(e) => warn!(
            "Could not grant role {} to {} in guild {}: {:?}",
            role_name, member.user.name, member.guild_id, e
        ),
    }

    Ok(())
}
