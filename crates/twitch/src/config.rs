use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use flowchat_channels::{AuthNode, NodeRegistry};

use crate::error::{Error, Result};

/// Configuration of a Twitch chat node, as stored by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TwitchChatConfig {
    /// Identifier of the Twitch authentication node.
    pub twitch: Option<String>,

    /// Channel to join and send to.
    pub channels: Option<String>,
}

impl TwitchChatConfig {
    /// Parse the host's raw config object.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::config(format!("invalid Twitch chat configuration: {e}")))
    }
}

/// Configuration held by a Twitch authentication node.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchAuthConfig {
    /// Long-lived OAuth refresh token for the bot account.
    #[serde(serialize_with = "serialize_secret")]
    pub twitch_refresh_token: Secret<String>,
}

impl std::fmt::Debug for TwitchAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchAuthConfig")
            .field("twitch_refresh_token", &"[REDACTED]")
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for TwitchAuthConfig {
    fn default() -> Self {
        Self {
            twitch_refresh_token: Secret::new(String::new()),
        }
    }
}

/// A chat node configuration whose auth reference has been looked up.
pub struct ResolvedConfig {
    pub channel: String,
    pub auth: Arc<dyn AuthNode>,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check that both the auth reference and the channel are set, then look the
/// auth node up in the host.
pub fn resolve(config: &TwitchChatConfig, registry: &dyn NodeRegistry) -> Result<ResolvedConfig> {
    let Some(auth_id) = non_empty(config.twitch.as_deref()) else {
        return Err(Error::config(
            "missing Twitch configuration: no authentication node selected",
        ));
    };
    let Some(channel) = non_empty(config.channels.as_deref()) else {
        return Err(Error::config("missing Twitch configuration: no channel set"));
    };

    let auth = registry.auth_node(auth_id).ok_or_else(|| {
        Error::config(format!(
            "invalid Twitch configuration: authentication node '{auth_id}' not found"
        ))
    })?;

    Ok(ResolvedConfig {
        channel: channel.to_string(),
        auth,
    })
}
