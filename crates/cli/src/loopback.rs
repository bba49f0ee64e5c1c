//! In-process stand-ins for the chat transport, the credential service and
//! the automation host. Everything they see goes to the log.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use {
    async_trait::async_trait,
    tokio::sync::broadcast,
    tracing::{error, info},
};

use flowchat_channels::{
    ChatSession, Credential, CredentialRefresher, Error, ErrorReport, NodeHost, Result,
    SessionEvent, SessionEvents, SessionFactory, SessionOptions, StatusEvent,
};

/// Chat session that connects instantly and logs every message instead of
/// sending it.
pub struct LoggingSession {
    channels: Vec<String>,
    connected: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

impl LoggingSession {
    pub fn new(options: SessionOptions) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            channels: options.channels,
            connected: AtomicBool::new(false),
            events,
        }
    }
}

#[async_trait]
impl ChatSession for LoggingSession {
    async fn connect(&self) -> Result<()> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            info!(channels = ?self.channels, "loopback session joined");
            let _ = self.events.send(SessionEvent::Connected);
        }
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!("loopback session parted");
            let _ = self.events.send(SessionEvent::Disconnected);
        }
        Ok(())
    }

    async fn say(&self, channel: &str, message: &str) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::unavailable("not connected"));
        }
        info!(channel, message, "PRIVMSG");
        Ok(())
    }

    fn subscribe(&self) -> SessionEvents {
        self.events.subscribe()
    }
}

pub struct LoggingSessionFactory;

impl SessionFactory for LoggingSessionFactory {
    fn create(
        &self,
        options: SessionOptions,
        _auth: Arc<dyn CredentialRefresher>,
    ) -> Arc<dyn ChatSession> {
        Arc::new(LoggingSession::new(options))
    }
}

/// Accepts any credential.
pub struct LoggingRefresher;

#[async_trait]
impl CredentialRefresher for LoggingRefresher {
    async fn register(&self, credential: Credential, scopes: &[&str]) -> Result<()> {
        info!(?scopes, obtained_at = credential.obtained_at, "credential registered");
        Ok(())
    }
}

/// Host that renders node status and errors as log lines.
pub struct TracingHost {
    node_id: String,
}

impl TracingHost {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
        }
    }
}

impl NodeHost for TracingHost {
    fn status(&self, status: StatusEvent) {
        info!(
            node_id = %self.node_id,
            indicator = ?status.indicator,
            shape = ?status.shape,
            "status: {}",
            status.text
        );
    }

    fn error(&self, report: ErrorReport) {
        error!(node_id = %self.node_id, kind = ?report.kind, "{}", report.message);
    }
}
