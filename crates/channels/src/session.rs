use std::sync::Arc;

use {async_trait::async_trait, tokio::sync::broadcast};

use crate::{Result, auth::CredentialRefresher};

/// Connection-level events emitted by a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport is connected and the channel set joined.
    Connected,
    /// The transport dropped, including while a reconnect is in progress.
    Disconnected,
}

/// Receiver end of a session's event subscription.
pub type SessionEvents = broadcast::Receiver<SessionEvent>;

/// How a chat session should be set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Channels joined on connect.
    pub channels: Vec<String>,
    /// Rejoin `channels` automatically after a transport-level reconnect.
    pub rejoin_channels_on_reconnect: bool,
}

impl SessionOptions {
    pub fn for_channel(channel: impl Into<String>) -> Self {
        Self {
            channels: vec![channel.into()],
            rejoin_channels_on_reconnect: true,
        }
    }
}

/// A live chat connection.
///
/// Reconnection is the session's own business: a dropped transport shows up
/// as [`SessionEvent::Disconnected`] followed, eventually, by
/// [`SessionEvent::Connected`].
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Open the transport and join the configured channels.
    async fn connect(&self) -> Result<()>;

    /// Leave gracefully and close the transport.
    async fn quit(&self) -> Result<()>;

    /// Send a chat message to `channel`.
    async fn say(&self, channel: &str, message: &str) -> Result<()>;

    /// Subscribe to connection events.
    fn subscribe(&self) -> SessionEvents;
}

/// Builds chat sessions authenticated through a credential-refresh capability.
pub trait SessionFactory: Send + Sync {
    fn create(
        &self,
        options: SessionOptions,
        auth: Arc<dyn CredentialRefresher>,
    ) -> Arc<dyn ChatSession>;
}
