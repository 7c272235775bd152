// Event router - gateway events to lifecycle handlers and persistent components

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::{auto_role, suggestion, ticket};
use crate::store::ConfigStore;
use crate::{Data, Error};

/// Restart-surviving components, dispatched by custom id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistent {
    TicketButton,
    TicketForm,
    SuggestionButton,
    SuggestionForm,
}

#[derive(Debug, Default)]
pub struct PersistentComponents {
    routes: HashMap<&'static str, Persistent>,
}

impl PersistentComponents {
    /// Register the ticket and suggestion components
    pub fn install() -> Self {
        let routes = HashMap::from([
            (ticket::BUTTON_ID, Persistent::TicketButton),
            (ticket::MODAL_ID, Persistent::TicketForm),
            (suggestion::BUTTON_ID, Persistent::SuggestionButton),
            (suggestion::MODAL_ID, Persistent::SuggestionForm),
        ]);
        Self { routes }
    }

    pub fn resolve(&self, custom_id: &str) -> Option<Persistent> {
        self.routes.get(custom_id).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

/// Save the guild configuration, logging instead of failing
pub async fn persist(store: &RwLock<ConfigStore>) {
    if let Err(e) = store.read().await.save().await {
        error!("Failed to save guild configuration: {}", e);
    }
}

/// Drop every setting of a guild the bot was removed from
pub async fn forget_guild(store: &RwLock<ConfigStore>, guild_id: serenity::GuildId) {
    if let Err(e) = store.write().await.remove(guild_id).await {
        error!("Failed to save after removing guild {}: {}", guild_id, e);
    }
}

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Logged in as {}; {} persistent components active",
                data_about_bot.user.name,
                data.components.len()
            );
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            auto_role::handle_member_join(ctx, new_member, data).await?;
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) {
                info!("Joined guild {} ({})", guild.name, guild.id);
                persist(&data.guild_configs).await;
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            // `unavailable` means an outage, not a removal
            if !incomplete.unavailable {
                info!("Removed from guild {}", incomplete.id);
                forget_guild(&data.guild_configs, incomplete.id).await;
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            route_interaction(ctx, interaction, data).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn route_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &Data,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component) => {
            match data.components.resolve(&component.data.custom_id) {
                Some(Persistent::TicketButton) => ticket::open_form(ctx, component).await?,
                Some(Persistent::SuggestionButton) => suggestion::open_form(ctx, component).await?,
                _ => {}
            }
        }
        serenity::Interaction::Modal(modal) => match data.components.resolve(&modal.data.custom_id) {
            Some(Persistent::TicketForm) => ticket::handle_submission(ctx, modal, data).await?,
            Some(Persistent::SuggestionForm) => suggestion::handle_submission(ctx, modal, data).await?,
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::guild::Setting;

    #[test]
    fn test_persistent_routes() {
        let components = PersistentComponents::install();
        assert_eq!(components.resolve("ticket_button"), Some(Persistent::TicketButton));
        assert_eq!(components.resolve("ticket_modal"), Some(Persistent::TicketForm));
        assert_eq!(components.resolve("suggestion_button"), Some(Persistent::SuggestionButton));
        assert_eq!(components.resolve("suggestion_modal"), Some(Persistent::SuggestionForm));
        assert_eq!(components.resolve("wizard:1:select"), None);
        assert_eq!(components.len(), 4);
    }

    #[tokio::test]
    async fn test_forget_guild_persists_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let store = RwLock::new(ConfigStore::load(&path).await.unwrap());
        let kept = serenity::GuildId::new(2);
        let gone = serenity::GuildId::new(1);

        {
            let mut guard = store.write().await;
            guard.set(gone, Setting::AutoRole(serenity::RoleId::new(10))).await.unwrap();
            guard.set(kept, Setting::AutoRole(serenity::RoleId::new(20))).await.unwrap();
        }

        forget_guild(&store, gone).await;

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert!(reloaded.get(gone).is_empty());
        assert_eq!(reloaded.get(kept).auto_role, Some(serenity::RoleId::new(20)));
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let store = RwLock::new(ConfigStore::load(&path).await.unwrap());

        persist(&store).await;

        assert!(path.exists());
        assert!(ConfigStore::load(&path).await.unwrap().get(serenity::GuildId::new(1)).is_empty());
    }
}
