use std::sync::Arc;

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use flowchat_channels::{ChatSession, StatusEvent};

use crate::{error::Error, status::StatusReporter};

/// Message delivered to the node by the automation host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub payload: Value,
}

impl InboundMessage {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

/// Why an inbound message was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payload must be an object")]
    PayloadNotObject,

    #[error("missing required fields: channel and message")]
    MissingFields,
}

/// A validated chat message, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub message: String,
}

impl OutboundMessage {
    /// Both fields must be non-empty strings.
    pub fn parse(payload: &Value) -> Result<Self, ValidationError> {
        let obj = payload
            .as_object()
            .ok_or(ValidationError::PayloadNotObject)?;
        let field = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        match (field("channel"), field("message")) {
            (Some(channel), Some(message)) => Ok(Self { channel, message }),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

/// Validates inbound messages and sends the good ones through the session.
#[derive(Clone)]
pub struct MessageDispatcher {
    node_id: String,
    session: Arc<dyn ChatSession>,
    reporter: StatusReporter,
    cancel: CancellationToken,
}

impl MessageDispatcher {
    pub fn new(
        node_id: impl Into<String>,
        session: Arc<dyn ChatSession>,
        reporter: StatusReporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            session,
            reporter,
            cancel,
        }
    }

    /// Validate `msg` and, if well-formed, start sending it.
    ///
    /// Sends are fire-and-forget and may overlap; the returned handle only
    /// exists so callers can wait for settlement. Invalid messages are
    /// reported to the host and yield `None`.
    pub fn dispatch(&self, msg: &InboundMessage) -> Option<JoinHandle<()>> {
        let outbound = match OutboundMessage::parse(&msg.payload) {
            Ok(outbound) => outbound,
            Err(e) => {
                debug!(node_id = %self.node_id, error = %e, "rejecting inbound message");
                self.reporter.error(&Error::from(e));
                return None;
            },
        };

        let dispatcher = self.clone();
        Some(tokio::spawn(async move { dispatcher.send(outbound).await }))
    }

    async fn send(&self, outbound: OutboundMessage) {
        let result = self
            .session
            .say(&outbound.channel, &outbound.message)
            .await;

        if self.cancel.is_cancelled() {
            debug!(
                node_id = %self.node_id,
                channel = %outbound.channel,
                ok = result.is_ok(),
                "discarding send outcome after close"
            );
            return;
        }

        match result {
            Ok(()) => {
                debug!(node_id = %self.node_id, channel = %outbound.channel, "chat message sent");
                self.reporter.status(StatusEvent::message_sent());
            },
            Err(source) => {
                let err = Error::Send { source };
                warn!(node_id = %self.node_id, channel = %outbound.channel, error = %err, "chat message failed");
                self.reporter.error(&err);
                self.reporter.status(StatusEvent::message_failed());
            },
        }
    }
}
