use std::error::Error as StdError;

/// Crate-wide result type for capability calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by session, credential and host capabilities.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session isn't in a state where it can do this (not joined, quit).
    #[error("chat session unavailable: {message}")]
    Unavailable { message: String },

    /// The chat or credential service refused the request.
    #[error("rejected by chat service: {reason}")]
    Rejected { reason: String },

    /// Transport-level failure, with what was being attempted.
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
