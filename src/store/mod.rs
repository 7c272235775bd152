// File-backed state: guild settings and the message type catalog

pub mod atomic;
pub mod error;
pub mod guild_store;
pub mod message_types;

pub use error::StoreError;
pub use guild_store::ConfigStore;
pub use message_types::MessageTypeCatalog;
