use serde::{Deserialize, Serialize};

/// Colour of the status badge shown by the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusIndicator {
    Neutral,
    Ok,
    Error,
}

/// Shape of the status badge: a hollow ring for idle, a filled dot for activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Ring,
    Dot,
}

/// One-way status signal displayed next to a node. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEvent {
    pub indicator: StatusIndicator,
    pub shape: StatusShape,
    pub text: String,
}

impl StatusEvent {
    pub fn new(indicator: StatusIndicator, shape: StatusShape, text: impl Into<String>) -> Self {
        Self {
            indicator,
            shape,
            text: text.into(),
        }
    }

    pub fn disconnected() -> Self {
        Self::new(StatusIndicator::Neutral, StatusShape::Ring, "Disconnected")
    }

    pub fn connected() -> Self {
        Self::new(StatusIndicator::Ok, StatusShape::Dot, "Connected")
    }

    pub fn message_sent() -> Self {
        Self::new(StatusIndicator::Ok, StatusShape::Dot, "Message Sent")
    }

    pub fn message_failed() -> Self {
        Self::new(StatusIndicator::Error, StatusShape::Dot, "Message Failed")
    }
}

impl Default for StatusEvent {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Point-in-time health of a node, for host-side probes.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub connected: bool,
    pub channel: Option<String>,
    pub details: Option<String>,
}
