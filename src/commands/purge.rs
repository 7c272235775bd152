// Purge command - wipe every message in the current channel after a confirmed countdown

use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use crate::utils::config::{NOTICE_TTL, PURGE_COUNTDOWN_SECS};
use crate::wizard::{view, Stage, Wizard};
use crate::{Context, Error};

/// Discord refuses bulk deletion of messages older than two weeks
const BULK_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60 - 60;
/// Largest batch accepted by one bulk delete call
const BATCH_SIZE: u8 = 100;

/// Delete every message in this channel
#[poise::command(
    slash_command,
    prefix_command,
    rename = "purge-channel",
    aliases("purge"),
    guild_only,
    required_permissions = "ADMINISTRATOR",
    required_bot_permissions = "MANAGE_MESSAGES | READ_MESSAGE_HISTORY"
)]
pub async fn purge_channel(ctx: Context<'_>) -> Result<(), Error> {
    let wizard = Wizard::start(
        ctx.author().id,
        vec![Stage::Confirm { label: "Yes, purge".to_string() }],
    );
    let Some(done) = view::run(
        ctx,
        "⚠️ Are you sure you want to delete every message in this channel?",
        wizard,
    )
    .await?
    else {
        return Ok(());
    };
    if !done.selections.confirmed() {
        return Ok(());
    }
    info!("{} confirmed a purge of channel {}", done.responder.user().name, ctx.channel_id());

    let channel_id = ctx.channel_id();
    let mut frames = countdown(PURGE_COUNTDOWN_SECS).into_iter();
    if let Some(first) = frames.next() {
        done.responder.update(ctx, first).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    for frame in frames {
        channel_id
            .edit_message(ctx, done.message.id, serenity::EditMessage::new().content(frame))
            .await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let deleted = match purge(ctx.serenity_context(), channel_id).await {
        Ok(count) => count,
        Err(e) => {
            error!("Purge of channel {} failed: {:?}", channel_id, e);
            channel_id
                .say(ctx, "❌ Some messages could not be deleted.")
                .await?;
            return Ok(());
        }
    };
    info!("Purged {} messages from channel {}", deleted, channel_id);

    let notice = channel_id.say(ctx, "✅ All messages were deleted!").await?;
    tokio::time::sleep(NOTICE_TTL).await;
    if let Err(e) = notice.delete(ctx).await {
        warn!("Failed to remove purge notice: {:?}", e);
    }

    Ok(())
}

/// Countdown lines, one per second
fn countdown(secs: u64) -> Vec<String> {
    (1..=secs)
        .rev()
        .map(|remaining| format!("🗑️ Deleting all messages in {}...", remaining))
        .collect()
}

/// Split a batch into ids that may go through bulk deletion and ids that
/// must be deleted one at a time. A lone recent message is deleted singly
/// because bulk deletion needs at least two ids.
fn partition_for_deletion(
    messages: &[(serenity::MessageId, i64)],
    now: i64,
) -> (Vec<serenity::MessageId>, Vec<serenity::MessageId>) {
    let (recent, old): (Vec<(serenity::MessageId, i64)>, Vec<_>) = messages
        .iter()
        .partition(|(_, created)| now - created < BULK_MAX_AGE_SECS);
    let mut recent: Vec<_> = recent.into_iter().map(|(id, _)| id).collect();
    let mut old: Vec<_> = old.into_iter().map(|(id, _)| id).collect();
    if recent.len() == 1 {
        old.append(&mut recent);
    }
    (recent, old)
}

/// Delete messages in batches until the channel is empty
async fn purge(ctx: &serenity::Context, channel_id: serenity::ChannelId) -> Result<usize, serenity::Error> {
    let mut total = 0;
    loop {
        let batch = channel_id
            .messages(ctx, serenity::GetMessages::new().limit(BATCH_SIZE))
            .await?;
        if batch.is_empty() {
            break;
        }

        let stamped: Vec<_> = batch
            .iter()
            .map(|m| (m.id, m.timestamp.unix_timestamp()))
            .collect();
        let (bulk, single) = partition_for_deletion(&stamped, chrono::Utc::now().timestamp());

        if !bulk.is_empty() {
            channel_id.delete_messages(ctx, &bulk).await?;
        }
        for id in single {
            channel_id.delete_message(ctx, id).await?;
        }
        total += batch.len();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 24 * 60 * 60;

    fn id(n: u64) -> serenity::MessageId {
        serenity::MessageId::new(n)
    }

    #[test]
    fn test_countdown() {
        let frames = countdown(3);
        assert_eq!(frames.len(), 3);
        assert!(frames[0].contains('3'));
        assert!(frames[2].contains('1'));
        assert!(countdown(0).is_empty());
    }

    #[test]
    fn test_partition_by_age() {
        let messages = vec![(id(1), NOW - 60), (id(2), NOW - 13 * DAY), (id(3), NOW - 15 * DAY)];
        let (bulk, single) = partition_for_deletion(&messages, NOW);
        assert_eq!(bulk, vec![id(1), id(2)]);
        assert_eq!(single, vec![id(3)]);
    }

    #[test]
    fn test_partition_boundary_is_not_bulk() {
        let messages = vec![(id(1), NOW - 14 * DAY), (id(2), NOW - 14 * DAY + 30)];
        let (bulk, single) = partition_for_deletion(&messages, NOW);
        assert!(bulk.is_empty());
        assert_eq!(single, vec![id(1), id(2)]);
    }

    #[test]
    fn test_partition_lone_recent_goes_single() {
        let messages = vec![(id(1), NOW - 60), (id(2), NOW - 20 * DAY)];
        let (bulk, single) = partition_for_deletion(&messages, NOW);
        assert!(bulk.is_empty());
        assert_eq!(single, vec![id(2), id(1)]);
    }
}
