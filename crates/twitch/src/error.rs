use thiserror::Error;

use flowchat_channels::{ErrorKind, ErrorReport};

use crate::dispatch::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing/invalid node configuration or an unresolved auth reference.
    #[error("{message}")]
    Config { message: String },

    #[error("failed to register chat credential: {source}")]
    AuthRegistration {
        #[source]
        source: flowchat_channels::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to send message: {source}")]
    Send {
        #[source]
        source: flowchat_channels::Error,
    },
}

impl Error {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::AuthRegistration { .. } => ErrorKind::AuthRegistration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Send { .. } => ErrorKind::Send,
        }
    }

    /// The form in which this error is handed to the host.
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
