use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::atomic::{read_optional, write_atomic};
use super::error::StoreError;
use crate::models::guild::{GuildConfig, Setting};

/// On-disk layout: one table per setting, keyed by guild id
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    auto_roles: BTreeMap<String, u64>,
    #[serde(default)]
    ticket_channels: BTreeMap<String, u64>,
    #[serde(default)]
    mention_roles: BTreeMap<String, u64>,
    #[serde(default)]
    suggestion_channels: BTreeMap<String, u64>,
    #[serde(default)]
    test_channels: BTreeMap<String, u64>,
    #[serde(default)]
    authorized_roles: BTreeMap<String, Vec<u64>>,
}

/// Per-guild settings, saved to disk on every mutation
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    guilds: HashMap<serenity::GuildId, GuildConfig>,
    // Held for the whole write; every save shares one temp file
    saving: Mutex<()>,
}

impl ConfigStore {
    /// Empty store backed by `path`; nothing is read or written
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guilds: HashMap::new(),
            saving: Mutex::new(()),
        }
    }

    /// Load the store, treating a missing or blank file as empty state
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(path);

        if let Some(contents) = read_optional(&store.path).await? {
            let document: ConfigDocument =
                serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                    path: store.path.clone(),
                    source,
                })?;
            store.guilds = from_document(&store.path, document)?;
        }

        info!(
            "Loaded configuration for {} guild(s) from {}",
            store.guilds.len(),
            store.path.display()
        );
        Ok(store)
    }

    /// Persist the current state. Concurrent saves through shared references
    /// run one at a time.
    pub async fn save(&self) -> Result<(), StoreError> {
        let _saving = self.saving.lock().await;
        let document = to_document(&self.guilds);
        let json = serde_json::to_string_pretty(&document).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, json.as_bytes()).await?;
        debug!("Saved configuration for {} guild(s)", self.guilds.len());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored config, or one with every field absent
    pub fn get(&self, guild_id: serenity::GuildId) -> GuildConfig {
        self.guilds.get(&guild_id).cloned().unwrap_or_default()
    }

    /// Overwrite one field and persist
    pub async fn set(&mut self, guild_id: serenity::GuildId, setting: Setting) -> Result<(), StoreError> {
        self.guilds.entry(guild_id).or_default().apply(setting);
        info!("Guild {}: {} -> {:?}", guild_id, setting.label(), setting);
        self.save().await
    }

    /// Add a role to the announcement allow-list; false if it was already there
    pub async fn authorize_role(
        &mut self,
        guild_id: serenity::GuildId,
        role_id: serenity::RoleId,
    ) -> Result<bool, StoreError> {
        let added = self
            .guilds
            .entry(guild_id)
            .or_default()
            .authorized_roles
            .insert(role_id);
        self.prune(guild_id);
        if added {
            info!("Guild {}: authorized role {} for announcements", guild_id, role_id);
            self.save().await?;
        }
        Ok(added)
    }

    /// Remove a role from the announcement allow-list; false if it was not there
    pub async fn revoke_role(
        &mut self,
        guild_id: serenity::GuildId,
        role_id: serenity::RoleId,
    ) -> Result<bool, StoreError> {
        let removed = self
            .guilds
            .get_mut(&guild_id)
            .map(|config| config.authorized_roles.remove(&role_id))
            .unwrap_or(false);
        self.prune(guild_id);
        if removed {
            info!("Guild {}: revoked announcement role {}", guild_id, role_id);
            self.save().await?;
        }
        Ok(removed)
    }

    /// Forget everything about a guild and persist
    pub async fn remove(&mut self, guild_id: serenity::GuildId) -> Result<(), StoreError> {
        if self.guilds.remove(&guild_id).is_some() {
            info!("Guild {}: configuration removed", guild_id);
        }
        self.save().await
    }

    fn prune(&mut self, guild_id: serenity::GuildId) {
        if self.guilds.get(&guild_id).is_some_and(GuildConfig::is_empty) {
            self.guilds.remove(&guild_id);
        }
    }

    #[cfg(test)]
    fn guilds(&self) -> &HashMap<serenity::GuildId, GuildConfig> {
        &self.guilds
    }
}

fn to_document(guilds: &HashMap<serenity::GuildId, GuildConfig>) -> ConfigDocument {
    let mut document = ConfigDocument::default();

    for (guild_id, config) in guilds {
        let key = guild_id.to_string();
        if let Some(id) = config.auto_role {
            document.auto_roles.insert(key.clone(), id.get());
        }
        if let Some(id) = config.ticket_channel {
            document.ticket_channels.insert(key.clone(), id.get());
        }
        if let Some(id) = config.mention_role {
            document.mention_roles.insert(key.clone(), id.get());
        }
        if let Some(id) = config.suggestion_channel {
            document.suggestion_channels.insert(key.clone(), id.get());
        }
        if let Some(id) = config.test_channel {
            document.test_channels.insert(key.clone(), id.get());
        }
        if !config.authorized_roles.is_empty() {
            let roles = config.authorized_roles.iter().map(|r| r.get()).collect();
            document.authorized_roles.insert(key, roles);
        }
    }

    document
}

fn from_document(
    path: &Path,
    document: ConfigDocument,
) -> Result<HashMap<serenity::GuildId, GuildConfig>, StoreError> {
    let mut guilds: HashMap<serenity::GuildId, GuildConfig> = HashMap::new();

    let malformed = |reason: String| StoreError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let guild_key = |key: &str| -> Result<serenity::GuildId, StoreError> {
        parse_snowflake(key)
            .map(serenity::GuildId::new)
            .ok_or_else(|| malformed(format!("`{}` is not a guild id", key)))
    };
    let id_value = |table: &str, key: &str, value: u64| -> Result<u64, StoreError> {
        if value == 0 {
            Err(malformed(format!("{}[{}] must be a non-zero id", table, key)))
        } else {
            Ok(value)
        }
    };

    for (key, value) in &document.auto_roles {
        let id = id_value("auto_roles", key, *value)?;
        guilds.entry(guild_key(key)?).or_default().auto_role = Some(serenity::RoleId::new(id));
    }
    for (key, value) in &document.ticket_channels {
        let id = id_value("ticket_channels", key, *value)?;
        guilds.entry(guild_key(key)?).or_default().ticket_channel = Some(serenity::ChannelId::new(id));
    }
    for (key, value) in &document.mention_roles {
        let id = id_value("mention_roles", key, *value)?;
        guilds.entry(guild_key(key)?).or_default().mention_role = Some(serenity::RoleId::new(id));
    }
    for (key, value) in &document.suggestion_channels {
        let id = id_value("suggestion_channels", key, *value)?;
        guilds.entry(guild_key(key)?).or_default().suggestion_channel =
            Some(serenity::ChannelId::new(id));
    }
    for (key, value) in &document.test_channels {
        let id = id_value("test_channels", key, *value)?;
        guilds.entry(guild_key(key)?).or_default().test_channel = Some(serenity::ChannelId::new(id));
    }
    for (key, values) in &document.authorized_roles {
        let mut roles = Vec::with_capacity(values.len());
        for value in values {
            roles.push(serenity::RoleId::new(id_value("authorized_roles", key, *value)?));
        }
        guilds
            .entry(guild_key(key)?)
            .or_default()
            .authorized_roles
            .extend(roles);
    }

    guilds.retain(|_, config| !config.is_empty());
    Ok(guilds)
}

fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild(id: u64) -> serenity::GuildId {
        serenity::GuildId::new(id)
    }

    fn role(id: u64) -> serenity::RoleId {
        serenity::RoleId::new(id)
    }

    fn channel(id: u64) -> serenity::ChannelId {
        serenity::ChannelId::new(id)
    }

    #[test]
    fn test_get_unknown_guild_is_empty() {
        let store = ConfigStore::new("unused.json");
        assert!(store.get(guild(1)).is_empty());
    }

    #[tokio::test]
    async fn test_set_updates_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let mut store = ConfigStore::load(&path).await.unwrap();

        store.set(guild(10), Setting::AutoRole(role(77))).await.unwrap();

        let config = store.get(guild(10));
        assert_eq!(config.auto_role, Some(role(77)));
        assert_eq!(config.ticket_channel, None);
        assert_eq!(config.mention_role, None);
        assert_eq!(config.suggestion_channel, None);
        assert!(config.authorized_roles.is_empty());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["auto_roles"]["10"], serde_json::json!(77));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let mut store = ConfigStore::load(&path).await.unwrap();

        store.set(guild(1), Setting::AutoRole(role(11))).await.unwrap();
        store.set(guild(1), Setting::TicketChannel(channel(12))).await.unwrap();
        store.set(guild(1), Setting::MentionRole(role(13))).await.unwrap();
        store.set(guild(1), Setting::SuggestionChannel(channel(14))).await.unwrap();
        store.set(guild(1), Setting::TestChannel(channel(15))).await.unwrap();
        store.authorize_role(guild(1), role(16)).await.unwrap();
        store.authorize_role(guild(1), role(17)).await.unwrap();
        store.set(guild(2), Setting::SuggestionChannel(channel(21))).await.unwrap();
        store.authorize_role(guild(3), role(31)).await.unwrap();

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert_eq!(reloaded.guilds(), store.guilds());
        assert_eq!(reloaded.get(guild(2)).auto_role, None);
        assert_eq!(reloaded.get(guild(3)).authorized_roles.len(), 1);
    }

    #[tokio::test]
    async fn test_revoking_last_role_prunes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let mut store = ConfigStore::load(&path).await.unwrap();

        assert!(store.authorize_role(guild(5), role(50)).await.unwrap());
        assert!(!store.authorize_role(guild(5), role(50)).await.unwrap());
        assert!(store.revoke_role(guild(5), role(50)).await.unwrap());
        assert!(!store.revoke_role(guild(5), role(50)).await.unwrap());

        assert!(store.guilds().is_empty());
        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert!(reloaded.guilds().is_empty());
    }

    #[tokio::test]
    async fn test_remove_only_touches_one_guild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let mut store = ConfigStore::load(&path).await.unwrap();

        for id in [1, 2] {
            store.set(guild(id), Setting::AutoRole(role(id * 10))).await.unwrap();
            store.set(guild(id), Setting::TicketChannel(channel(id * 10 + 1))).await.unwrap();
            store.set(guild(id), Setting::MentionRole(role(id * 10 + 2))).await.unwrap();
            store.set(guild(id), Setting::SuggestionChannel(channel(id * 10 + 3))).await.unwrap();
            store.authorize_role(guild(id), role(id * 10 + 4)).await.unwrap();
        }
        let untouched = store.get(guild(2));

        store.remove(guild(1)).await.unwrap();

        assert!(store.get(guild(1)).is_empty());
        assert_eq!(store.get(guild(2)), untouched);

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for table in ["auto_roles", "ticket_channels", "mention_roles", "suggestion_channels", "authorized_roles"] {
            assert!(on_disk[table].get("1").is_none(), "{} still has guild 1", table);
            assert!(on_disk[table].get("2").is_some(), "{} lost guild 2", table);
        }
    }

    #[tokio::test]
    async fn test_load_missing_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");

        let store = ConfigStore::load(&path).await.unwrap();
        assert!(store.guilds().is_empty());
        assert!(!path.exists());

        std::fs::write(&path, "\n").unwrap();
        let store = ConfigStore::load(&path).await.unwrap();
        assert!(store.guilds().is_empty());
    }

    #[tokio::test]
    async fn test_load_accepts_partial_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        std::fs::write(&path, r#"{ "mention_roles": { "9": 99 } }"#).unwrap();

        let store = ConfigStore::load(&path).await.unwrap();
        assert_eq!(store.get(guild(9)).mention_role, Some(role(99)));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ConfigStore::load(&path).await,
            Err(StoreError::Parse { .. })
        ));

        std::fs::write(&path, r#"{ "auto_roles": { "abc": 1 } }"#).unwrap();
        assert!(matches!(
            ConfigStore::load(&path).await,
            Err(StoreError::Malformed { .. })
        ));

        std::fs::write(&path, r#"{ "auto_roles": { "1": 0 } }"#).unwrap();
        assert!(matches!(
            ConfigStore::load(&path).await,
            Err(StoreError::Malformed { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_never_tear_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");

        let mut store = ConfigStore::load(&path).await.unwrap();
        for id in 1..=2000 {
            store.guilds.entry(guild(id)).or_default().auto_role = Some(role(id + 10_000));
        }
        store.save().await.unwrap();
        let store = std::sync::Arc::new(tokio::sync::RwLock::new(store));

        let mut saves = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            saves.push(tokio::spawn(async move {
                for _ in 0..15 {
                    store.read().await.save().await?;
                }
                Ok::<(), StoreError>(())
            }));
        }

        let reader_path = path.clone();
        let reader = tokio::spawn(async move {
            let mut torn = 0;
            for _ in 0..200 {
                let contents = tokio::fs::read_to_string(&reader_path).await.unwrap();
                if serde_json::from_str::<serde_json::Value>(&contents).is_err() {
                    torn += 1;
                }
                tokio::task::yield_now().await;
            }
            torn
        });

        for save in saves {
            save.await.unwrap().unwrap();
        }
        assert_eq!(reader.await.unwrap(), 0);

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert_eq!(reloaded.guilds().len(), 2000);
        assert!(!super::super::atomic::temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_leftover_temp_file_does_not_affect_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild_config.json");
        let mut store = ConfigStore::load(&path).await.unwrap();
        store.set(guild(4), Setting::AutoRole(role(40))).await.unwrap();

        // a crash mid-write leaves only a truncated temp file behind
        std::fs::write(super::super::atomic::temp_path(&path), "{\"auto_ro").unwrap();

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert_eq!(reloaded.get(guild(4)).auto_role, Some(role(40)));
    }
}
