use crate::{Context, Error};

/// Check that the bot is alive and show gateway latency
#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    // Zero until the first heartbeat is acknowledged
    if latency.is_zero() {
        ctx.say("🏓 Pong! Latency is still being measured.").await?;
    } else {
        ctx.say(format!("🏓 Pong! Latency: `{}ms`", latency.as_millis()))
            .await?;
    }
    Ok(())
}
