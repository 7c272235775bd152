use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::atomic::{read_optional, write_atomic};
use super::error::StoreError;
use crate::models::message_type::{default_message_types, normalize_name, parse_color, MessageType};

/// Process-wide catalog of announcement styles
#[derive(Debug)]
pub struct MessageTypeCatalog {
    path: PathBuf,
    types: BTreeMap<String, MessageType>,
    saving: Mutex<()>,
}

impl MessageTypeCatalog {
    /// Load the catalog; a missing or blank file installs and saves the defaults
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let Some(contents) = read_optional(&path).await? else {
            let catalog = Self {
                path,
                types: default_message_types()
                    .into_iter()
                    .map(|(name, ty)| (name.to_string(), ty))
                    .collect(),
                saving: Mutex::new(()),
            };
            catalog.save().await?;
            warn!(
                "No message type catalog found, installed {} defaults at {}",
                catalog.types.len(),
                catalog.path.display()
            );
            return Ok(catalog);
        };

        let stored: BTreeMap<String, MessageType> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;

        let (types, renamed) = normalize_keys(stored).map_err(|reason| StoreError::Malformed {
            path: path.clone(),
            reason,
        })?;

        let catalog = Self {
            path,
            types,
            saving: Mutex::new(()),
        };
        if renamed {
            warn!("Normalized message type names in {}", catalog.path.display());
            catalog.save().await?;
        }

        info!(
            "Loaded {} message type(s) from {}",
            catalog.types.len(),
            catalog.path.display()
        );
        Ok(catalog)
    }

    /// Concurrent saves run one at a time
    pub async fn save(&self) -> Result<(), StoreError> {
        let _saving = self.saving.lock().await;
        let json = serde_json::to_string_pretty(&self.types).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, json.as_bytes()).await
    }

    pub fn get(&self, name: &str) -> Option<&MessageType> {
        let key = normalize_name(name).ok()?;
        self.types.get(&key)
    }

    /// Types in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MessageType)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Insert or overwrite a type; returns the normalized name
    pub async fn create(&mut self, name: &str, icon: &str, color: &str) -> Result<String, StoreError> {
        let key = normalize_name(name)?;
        let ty = MessageType::new(icon, color)?;

        info!("Message type `{}` set to {} {}", key, ty.icon, ty.color_hex);
        self.types.insert(key.clone(), ty);
        self.save().await?;
        Ok(key)
    }

    /// Remove a type; absent names are a no-op returning false
    pub async fn delete(&mut self, name: &str) -> Result<bool, StoreError> {
        let Ok(key) = normalize_name(name) else {
            return Ok(false);
        };

        if self.types.remove(&key).is_none() {
            return Ok(false);
        }

        info!("Message type `{}` deleted", key);
        self.save().await?;
        Ok(true)
    }
}

/// Re-key stored types by normalized name and validate their colors.
/// Returns whether any key changed.
fn normalize_keys(
    stored: BTreeMap<String, MessageType>,
) -> Result<(BTreeMap<String, MessageType>, bool), String> {
    let mut types = BTreeMap::new();
    let mut renamed = false;

    for (name, ty) in stored {
        if parse_color(&ty.color_hex).is_err() {
            return Err(format!("message type `{}` has invalid color `{}`", name, ty.color_hex));
        }
        let key = normalize_name(&name).map_err(|_| "message type with an empty name".to_string())?;
        if key != name {
            renamed = true;
        }
        if types.insert(key.clone(), ty).is_some() {
            return Err(format!("more than one message type is named `{}`", key));
        }
    }

    Ok((types, renamed))
}
