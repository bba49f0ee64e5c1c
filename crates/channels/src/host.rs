use std::sync::Arc;

use {serde::Serialize, tokio::sync::oneshot};

use crate::{auth::AuthNode, status::StatusEvent};

/// Failure category of a node-level error report.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid node configuration, or an unresolved reference.
    Config,
    /// The credential-refresh capability refused the credential.
    AuthRegistration,
    /// A malformed inbound automation message.
    Validation,
    /// The chat service failed to deliver a message.
    Send,
}

/// An error surfaced to the host's error channel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

/// Host surface for a single node instance.
///
/// Both calls are fire-and-forget: the host must not block, and the node
/// never waits for acknowledgement.
pub trait NodeHost: Send + Sync {
    /// Replace the status badge shown for this node.
    fn status(&self, status: StatusEvent);

    /// Report an error through the host's error channel.
    fn error(&self, report: ErrorReport);
}

/// Lookup of configuration nodes by identifier.
pub trait NodeRegistry: Send + Sync {
    /// Resolve an authentication node, or `None` when the host doesn't know it.
    fn auth_node(&self, id: &str) -> Option<Arc<dyn AuthNode>>;
}

/// Completion handle passed to a node's close hook.
///
/// Dropping it without calling [`CloseSignal::done`] also completes the
/// receiver (with an error), so a host never waits forever.
#[derive(Debug)]
pub struct CloseSignal {
    tx: oneshot::Sender<()>,
}

impl CloseSignal {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Tell the host that cleanup has been issued.
    pub fn done(self) {
        // The host may have stopped listening; nothing to do then.
        let _ = self.tx.send(());
    }
}
