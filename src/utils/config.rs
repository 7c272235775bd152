// Centralized configuration for the bot

use std::path::PathBuf;
use std::time::Duration;

/// How long select menus and confirmation buttons stay live
pub const MENU_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a user has to submit a form
pub const FORM_TIMEOUT: Duration = Duration::from_secs(300);

/// Seconds counted down before a channel purge
pub const PURGE_COUNTDOWN_SECS: u64 = 5;

/// How long the purge completion notice stays up
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

pub const GUILD_CONFIG_FILE: &str = "guild_config.json";
pub const MESSAGE_TYPES_FILE: &str = "message_types.json";

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x5865f2;
    pub const WARNING: u32 = 0xffa500;
    pub const INFO: u32 = 0x3498db;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Runtime settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub prefix: String,
    pub data_dir: PathBuf,
    pub lock_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let discord_token = lookup("DISCORD_TOKEN").ok_or(SettingsError::Missing("DISCORD_TOKEN"))?;
        let discord_token = discord_token.trim().to_string();
        if discord_token.is_empty() {
            return Err(SettingsError::Empty("DISCORD_TOKEN"));
        }

        let prefix = lookup("BOT_PREFIX")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "!".to_string());

        let data_dir = lookup("DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let lock_file = lookup("LOCK_FILE")
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("guild-warden.lock"));

        Ok(Self {
            discord_token,
            prefix,
            data_dir,
            lock_file,
        })
    }

    pub fn guild_config_path(&self) -> PathBuf {
        self.data_dir.join(GUILD_CONFIG_FILE)
    }

    pub fn message_types_path(&self) -> PathBuf {
        self.data_dir.join(MESSAGE_TYPES_FILE)
    }
}
