use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
};

use crate::Result;

/// Scope required to read and send chat messages.
pub const CHAT_SCOPE: &str = "chat";

/// Token set handed to the credential-refresh capability.
///
/// The refresh capability owns it after registration and is responsible for
/// filling in (and renewing) the access token before first use.
#[derive(Clone, Serialize)]
pub struct Credential {
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,
    #[serde(serialize_with = "serialize_secret")]
    pub refresh_token: Secret<String>,
    #[serde(with = "duration_secs")]
    pub expires_in: Option<Duration>,
    /// Unix timestamp (milliseconds) at which the token set was obtained.
    pub obtained_at: u64,
}

impl Credential {
    /// A credential that only carries a refresh token; the access token is
    /// left empty and the expiry unknown so the first use forces a refresh.
    pub fn from_refresh_token(refresh_token: Secret<String>, obtained_at: u64) -> Self {
        Self {
            access_token: Secret::new(String::new()),
            refresh_token,
            expires_in: None,
            obtained_at,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

mod duration_secs {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }
}

/// Credential-refresh capability (the "auth provider" a chat session uses).
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// Register a credential and the scopes it must be valid for.
    async fn register(&self, credential: Credential, scopes: &[&str]) -> Result<()>;
}

/// An authentication node configured in the host.
pub trait AuthNode: Send + Sync {
    /// The refresh token stored in the node's configuration.
    fn refresh_token(&self) -> Secret<String>;

    /// The refresh capability owned by this node.
    fn refresher(&self) -> Arc<dyn CredentialRefresher>;
}
