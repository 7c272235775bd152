use std::path::PathBuf;

use crate::models::message_type::MessageTypeError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("malformed entry in `{path}`: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error(transparent)]
    InvalidMessageType(#[from] MessageTypeError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
