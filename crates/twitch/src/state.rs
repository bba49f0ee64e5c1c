use std::sync::{Arc, RwLock};

use flowchat_channels::ChatSession;

use crate::dispatch::MessageDispatcher;

/// Shared node state. Guarded by a `std::sync::RwLock` because every access
/// is a short field swap; it is never held across `.await` points.
pub type SharedNodeState = Arc<RwLock<NodeState>>;

/// Lifecycle phase of a chat node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    /// Config resolution / credential registration still running.
    Initializing,
    /// Session created and dispatcher attached.
    Ready,
    /// Initialization aborted; no session will ever exist.
    Failed,
    /// Torn down by the host.
    Closed,
}

impl NodePhase {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Ready => "session ready",
            Self::Failed => "initialization failed",
            Self::Closed => "closed",
        }
    }
}

/// Per-node runtime state.
pub struct NodeState {
    pub phase: NodePhase,
    pub channel: Option<String>,
    pub session: Option<Arc<dyn ChatSession>>,
    pub dispatcher: Option<MessageDispatcher>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            phase: NodePhase::Initializing,
            channel: None,
            session: None,
            dispatcher: None,
        }
    }
}

impl NodeState {
    pub fn shared() -> SharedNodeState {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Attach a freshly created session. Returns `false` (and leaves the state
    /// untouched) when the node was closed in the meantime; the caller then
    /// owns the session and must quit it.
    pub fn install(
        &mut self,
        channel: String,
        session: Arc<dyn ChatSession>,
        dispatcher: MessageDispatcher,
    ) -> bool {
        if self.phase == NodePhase::Closed {
            return false;
        }
        self.phase = NodePhase::Ready;
        self.channel = Some(channel);
        self.session = Some(session);
        self.dispatcher = Some(dispatcher);
        true
    }

    pub fn fail(&mut self) {
        if self.phase == NodePhase::Initializing {
            self.phase = NodePhase::Failed;
        }
    }

    /// Mark the node closed and hand back the session, if any. Only the first
    /// call ever returns a session.
    pub fn begin_close(&mut self) -> Option<Arc<dyn ChatSession>> {
        self.phase = NodePhase::Closed;
        self.dispatcher = None;
        self.session.take()
    }
}
