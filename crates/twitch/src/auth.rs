use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, info},
};

use {
    flowchat_channels::{AuthNode, CHAT_SCOPE, Credential, CredentialRefresher},
    flowchat_common::time::unix_millis,
};

use crate::{
    config::TwitchAuthConfig,
    error::{Error, Result},
};

/// Authentication node backed by a fixed config and a refresh capability.
pub struct StaticAuthNode {
    config: TwitchAuthConfig,
    refresher: Arc<dyn CredentialRefresher>,
}

impl StaticAuthNode {
    pub fn new(config: TwitchAuthConfig, refresher: Arc<dyn CredentialRefresher>) -> Self {
        Self { config, refresher }
    }
}

impl AuthNode for StaticAuthNode {
    fn refresh_token(&self) -> Secret<String> {
        self.config.twitch_refresh_token.clone()
    }

    fn refresher(&self) -> Arc<dyn CredentialRefresher> {
        Arc::clone(&self.refresher)
    }
}

/// Register the auth node's refresh token for the `chat` scope.
///
/// Returns the refresh capability so the session can use it as its auth
/// provider.
pub async fn bootstrap(auth: &dyn AuthNode) -> Result<Arc<dyn CredentialRefresher>> {
    let refresh_token = auth.refresh_token();
    if refresh_token.expose_secret().trim().is_empty() {
        return Err(Error::config(
            "invalid Twitch configuration: authentication node has no refresh token",
        ));
    }

    let credential = Credential::from_refresh_token(refresh_token, unix_millis());
    debug!(obtained_at = credential.obtained_at, "registering chat credential");

    let refresher = auth.refresher();
    refresher
        .register(credential, &[CHAT_SCOPE])
        .await
        .map_err(|source| Error::AuthRegistration { source })?;

    info!("chat credential registered");
    Ok(refresher)
}
