// Announcements - who may compose them and the compose workflow itself

use std::collections::BTreeSet;

use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{error, info, warn};

use super::role_choices;
use crate::models::message_type::MessageType;
use crate::wizard::{view, Candidate, FormField, FormSpec, Stage, Wizard};
use crate::{Context, Error};

/// Administrators always pass; everyone else needs one authorized role
pub fn is_authorized(
    is_admin: bool,
    member_roles: &[serenity::RoleId],
    authorized: &BTreeSet<serenity::RoleId>,
) -> bool {
    is_admin || member_roles.iter().any(|role| authorized.contains(role))
}

async fn can_announce(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };
    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };

    let is_admin = match member.permissions {
        Some(permissions) => permissions.administrator(),
        None => ctx
            .guild()
            .map(|guild| guild.member_permissions(&member).administrator())
            .unwrap_or(false),
    };
    let authorized = ctx.data().guild_configs.read().await.get(guild_id).authorized_roles;

    Ok(is_authorized(is_admin, &member.roles, &authorized))
}

/// Allow a role to compose announcements
#[poise::command(
    slash_command,
    prefix_command,
    rename = "announcement-authorize-role",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn announcement_authorize_role(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let authorized = ctx.data().guild_configs.read().await.get(guild_id).authorized_roles;
    let candidates = role_choices(ctx)
        .into_iter()
        .filter(|c| {
            c.value
                .parse::<u64>()
                .map_or(true, |id| !authorized.contains(&serenity::RoleId::new(id)))
        })
        .collect();

    let wizard = Wizard::start(
        ctx.author().id,
        vec![Stage::select("role", "Select the role to authorize", candidates)],
    );
    let Some(done) = view::run(ctx, "🔐 Which role may compose announcements?", wizard).await? else {
        return Ok(());
    };
    let Some(role_id) = done.selections.pick_id("role").map(serenity::RoleId::new) else {
        return Ok(());
    };

    let result = ctx
        .data()
        .guild_configs
        .write()
        .await
        .authorize_role(guild_id, role_id)
        .await;
    let content = match result {
        Ok(true) => {
            info!("Authorized role {} for announcements in guild {}", role_id, guild_id);
            format!("✅ {} may now compose announcements.", role_id.mention())
        }
        Ok(false) => format!("ℹ️ {} was already authorized.", role_id.mention()),
        Err(e) => {
            error!("Failed to save authorized roles for guild {}: {}", guild_id, e);
            "❌ The change could not be saved.".to_string()
        }
    };
    done.responder.reply(ctx, content).await?;

    Ok(())
}

/// Stop a role from composing announcements
#[poise::command(
    slash_command,
    prefix_command,
    rename = "announcement-revoke-role",
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn announcement_revoke_role(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let authorized = ctx.data().guild_configs.read().await.get(guild_id).authorized_roles;
    let candidates = authorized_candidates(ctx, &authorized);

    let wizard = Wizard::start(
        ctx.author().id,
        vec![Stage::select("role", "Select the role to revoke", candidates)],
    );
    let Some(done) = view::run(ctx, "🔓 Which role should lose announcement access?", wizard).await? else {
        return Ok(());
    };
    let Some(role_id) = done.selections.pick_id("role").map(serenity::RoleId::new) else {
        return Ok(());
    };

    let result = ctx
        .data()
        .guild_configs
        .write()
        .await
        .revoke_role(guild_id, role_id)
        .await;
    let content = match result {
        Ok(true) => {
            info!("Revoked role {} from announcements in guild {}", role_id, guild_id);
            format!("✅ {} can no longer compose announcements.", role_id.mention())
        }
        Ok(false) => format!("ℹ️ {} was not authorized.", role_id.mention()),
        Err(e) => {
            error!("Failed to save authorized roles for guild {}: {}", guild_id, e);
            "❌ The change could not be saved.".to_string()
        }
    };
    done.responder.reply(ctx, content).await?;

    Ok(())
}

/// Authorized roles as menu entries; roles deleted from the server stay revocable
fn authorized_candidates(ctx: Context<'_>, authorized: &BTreeSet<serenity::RoleId>) -> Vec<Candidate> {
    let guild = ctx.guild();
    authorized
        .iter()
        .map(|role_id| {
            let name = guild
                .as_ref()
                .and_then(|g| g.roles.get(role_id).map(|role| role.name.clone()))
                .unwrap_or_else(|| format!("deleted role {}", role_id));
            Candidate::new(role_id.get(), &name)
        })
        .collect()
}

/// Who an announcement pings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionTarget {
    Nobody,
    Everyone,
    Here,
    Role(serenity::RoleId),
}

impl MentionTarget {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::Nobody),
            "everyone" => Some(Self::Everyone),
            "here" => Some(Self::Here),
            other => other
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .map(|id| Self::Role(serenity::RoleId::new(id))),
        }
    }

    pub fn content(&self) -> Option<String> {
        match self {
            Self::Nobody => None,
            Self::Everyone => Some("@everyone".to_string()),
            Self::Here => Some("@here".to_string()),
            Self::Role(role_id) => Some(role_id.mention().to_string()),
        }
    }

    fn allowed_mentions(&self) -> serenity::CreateAllowedMentions {
        let allowed = serenity::CreateAllowedMentions::new();
        match self {
            Self::Nobody => allowed,
            Self::Everyone | Self::Here => allowed.everyone(true),
            Self::Role(role_id) => allowed.roles(vec![*role_id]),
        }
    }
}

fn mention_choices(ctx: Context<'_>) -> Vec<Candidate> {
    let mut choices = vec![
        Candidate::new("none", "No mention"),
        Candidate::new("everyone", "@everyone"),
        Candidate::new("here", "@here"),
    ];
    choices.extend(
        role_choices(ctx)
            .into_iter()
            .map(|c| Candidate::new(c.value, &format!("@{}", c.label))),
    );
    choices
}

fn type_choices(types: impl Iterator<Item = (String, MessageType)>) -> Vec<Candidate> {
    types
        .map(|(name, ty)| Candidate::new(&name, &format!("{} {}", ty.icon, name)).description(&ty.color_hex))
        .collect()
}

fn compose_form() -> FormSpec {
    FormSpec::new(
        "Compose announcement",
        vec![
            FormField::short("title", "Title").max_length(EMBED_TITLE_LIMIT as u16),
            FormField::paragraph("body", "Message").max_length(4000),
            FormField::short("image", "Image URL")
                .placeholder("https://...")
                .optional(),
        ],
    )
    .requires(&["mention", "message_type"])
}

fn is_image_url(url: &str) -> bool {
    (url.starts_with("https://") || url.starts_with("http://"))
        && !url.contains(char::is_whitespace)
        && url.len() > "https://".len()
}

/// Discord rejects embed titles longer than this
const EMBED_TITLE_LIMIT: usize = 256;

/// `icon title`, cut to the embed title limit
fn announcement_title(icon: &str, title: &str) -> String {
    format!("{} {}", icon, title)
        .chars()
        .take(EMBED_TITLE_LIMIT)
        .collect()
}

/// The styled embed for an announcement
pub fn announcement_embed(
    style: &MessageType,
    title: &str,
    body: &str,
    image: Option<&str>,
    author: &serenity::User,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .title(announcement_title(&style.icon, title))
        .description(body)
        .color(style.color())
        .footer(serenity::CreateEmbedFooter::new(format!("Posted by {}", author.name)))
        .timestamp(serenity::Timestamp::now());
    match image {
        Some(url) => embed.image(url),
        None => embed,
    }
}

/// Compose and post a styled announcement in this channel
#[poise::command(
    slash_command,
    prefix_command,
    rename = "announcement-compose",
    aliases("announce"),
    guild_only,
    check = "can_announce"
)]
pub async fn announcement_compose(ctx: Context<'_>) -> Result<(), Error> {
    let types: Vec<_> = ctx
        .data()
        .message_types
        .read()
        .await
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.clone()))
        .collect();

    let wizard = Wizard::start(
        ctx.author().id,
        vec![
            Stage::select("mention", "Who should be mentioned?", mention_choices(ctx)),
            Stage::select("message_type", "Choose the message type", type_choices(types.into_iter())),
            Stage::Form(compose_form()),
        ],
    );
    let Some(done) = view::run(ctx, "📣 Compose an announcement:", wizard).await? else {
        return Ok(());
    };

    let selections = &done.selections;
    let mention = selections.pick("mention").and_then(MentionTarget::from_value);
    let type_name = selections.pick("message_type").unwrap_or_default();
    let (Some(mention), Some(title), Some(body)) =
        (mention, selections.field("title"), selections.field("body"))
    else {
        done.responder.reply(ctx, "❌ The announcement is incomplete.").await?;
        return Ok(());
    };

    let image = selections.field("image");
    if image.is_some_and(|url| !is_image_url(url)) {
        done.responder
            .reply(ctx, "❌ The image URL must start with http:// or https://.")
            .await?;
        return Ok(());
    }

    let style = ctx.data().message_types.read().await.get(type_name).cloned();
    let Some(style) = style else {
        done.responder
            .reply(ctx, format!("❌ The message type `{}` no longer exists.", type_name))
            .await?;
        return Ok(());
    };

    let embed = announcement_embed(&style, title, body, image, ctx.author());
    let mut message = serenity::CreateMessage::new()
        .embed(embed)
        .allowed_mentions(mention.allowed_mentions());
    if let Some(content) = mention.content() {
        message = message.content(content);
    }

    match ctx.channel_id().send_message(ctx, message).await {
        Ok(_) => {
            info!("{} posted a {} announcement in {}", ctx.author().name, type_name, ctx.channel_id());
            done.responder.reply(ctx, "✅ Announcement sent.").await?;
        }
        Err(e) => {
            warn!("Failed to post announcement in {}: {:?}", ctx.channel_id(), e);
            done.responder
                .reply(ctx, "❌ I couldn't post in this channel.")
                .await?;
        }
    }

    Ok(())
}
