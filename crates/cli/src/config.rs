use std::{collections::HashMap, path::Path, sync::Arc};

use serde::Deserialize;

use {
    flowchat_channels::{AuthNodeRegistry, CredentialRefresher},
    flowchat_common::{Error, Result},
    flowchat_twitch::{StaticAuthNode, TwitchAuthConfig, TwitchChatConfig},
};

flowchat_common::impl_context!();

const DEFAULT_NODE_ID: &str = "twitch-chat";

/// Harness file: the auth nodes the host knows about plus one chat node.
///
/// ```toml
/// [auth.bot]
/// twitch_refresh_token = "..."
///
/// [node]
/// twitch = "bot"
/// channels = "somechannel"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Node identifier used in logs.
    pub id: Option<String>,
    pub auth: HashMap<String, TwitchAuthConfig>,
    pub node: TwitchChatConfig,
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::wrap(format!("failed to read {}", path.display()), e))?;
        Self::parse(&raw).with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid harness config")
    }

    pub fn node_id(&self) -> &str {
        self.id.as_deref().unwrap_or(DEFAULT_NODE_ID)
    }

    /// The chat node config as the host would hand it over.
    pub fn node_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.node).context("failed to encode node config")
    }

    /// Register every configured auth node, all sharing `refresher`.
    pub fn registry(&self, refresher: Arc<dyn CredentialRefresher>) -> AuthNodeRegistry {
        let registry = AuthNodeRegistry::new();
        for (id, auth) in &self.auth {
            registry.register(
                id.as_str(),
                Arc::new(StaticAuthNode::new(auth.clone(), Arc::clone(&refresher))),
            );
        }
        registry
    }
}
