use std::sync::{Arc, RwLock};

use {
    tokio::{sync::broadcast::error::RecvError, task::JoinHandle},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use flowchat_channels::{ChatSession, SessionEvent, StatusEvent};

use crate::status::StatusReporter;

/// Connection state of the chat session. There is deliberately no
/// "connecting" or "error" state: failures show up as disconnects and the
/// session's own reconnect policy is the only retry mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn on_event(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::Connected => Self::Connected,
            SessionEvent::Disconnected => Self::Disconnected,
        }
    }

    pub fn status(self) -> StatusEvent {
        match self {
            Self::Connected => StatusEvent::connected(),
            Self::Disconnected => StatusEvent::disconnected(),
        }
    }
}

/// Drives the connection state machine and mirrors it to the host.
#[derive(Clone)]
pub struct ConnectionManager {
    node_id: String,
    state: Arc<RwLock<ConnectionState>>,
    reporter: StatusReporter,
    cancel: CancellationToken,
}

impl ConnectionManager {
    /// Starts out disconnected and says so.
    pub fn new(node_id: impl Into<String>, reporter: StatusReporter, cancel: CancellationToken) -> Self {
        let state = ConnectionState::default();
        reporter.status(state.status());
        Self {
            node_id: node_id.into(),
            state: Arc::new(RwLock::new(state)),
            reporter,
            cancel,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one session event and publish the resulting status. Ignored
    /// once the node is closing.
    pub fn handle_event(&self, event: SessionEvent) {
        if self.cancel.is_cancelled() {
            debug!(node_id = %self.node_id, ?event, "ignoring chat session event after close");
            return;
        }
        let next = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            *state = state.on_event(event);
            *state
        };
        debug!(node_id = %self.node_id, ?event, state = ?next, "chat session event");
        self.reporter.status(next.status());
    }

    /// Subscribe to the session's events and ask it to connect.
    ///
    /// Returns immediately; the connection outcome arrives as events. The
    /// returned handle is the event listener, which runs until the node's
    /// cancellation token fires or the session drops its event stream.
    pub fn start(&self, session: Arc<dyn ChatSession>) -> JoinHandle<()> {
        let mut events = session.subscribe();

        let node_id = self.node_id.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if cancel.is_cancelled() {
                return;
            }
            info!(node_id = %node_id, "connecting chat session");
            if let Err(e) = session.connect().await {
                warn!(node_id = %node_id, error = %e, "chat session connect failed");
            }
        });

        let manager = self.clone();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = manager.cancel.cancelled() => break,
                    event = events.recv() => event,
                };
                match event {
                    Ok(event) => manager.handle_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(node_id = %manager.node_id, skipped, "chat session events lagged");
                    },
                    Err(RecvError::Closed) => {
                        debug!(node_id = %manager.node_id, "chat session event stream closed");
                        break;
                    },
                }
            }
        })
    }
}
