use std::sync::Arc;

use {
    tokio::{sync::watch, task::JoinHandle},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use flowchat_channels::{
    ChatSession, CloseSignal, HealthSnapshot, NodeHost, NodeRegistry, SessionFactory,
    SessionOptions, StatusEvent,
};

use crate::{
    auth,
    config::{self, TwitchChatConfig},
    connection::{ConnectionManager, ConnectionState},
    dispatch::{InboundMessage, MessageDispatcher},
    error::Result,
    shutdown::ShutdownController,
    state::{NodePhase, NodeState, SharedNodeState},
    status::StatusReporter,
};

/// Collaborators a chat node is built with.
#[derive(Clone)]
pub struct NodeCapabilities {
    pub host: Arc<dyn NodeHost>,
    pub registry: Arc<dyn NodeRegistry>,
    pub sessions: Arc<dyn SessionFactory>,
}

/// A Twitch chat node instance.
///
/// Construction is the acquire phase: it reports "Disconnected" and spawns
/// initialization (config resolution, credential registration, session
/// creation) without waiting for it. [`TwitchChatNode::close`] is the release
/// phase. Must be constructed inside a tokio runtime.
pub struct TwitchChatNode {
    id: String,
    state: SharedNodeState,
    reporter: StatusReporter,
    connection: ConnectionManager,
    shutdown: ShutdownController,
    init_finished: watch::Receiver<bool>,
}

struct Init {
    node_id: String,
    config: serde_json::Value,
    caps: NodeCapabilities,
    state: SharedNodeState,
    reporter: StatusReporter,
    connection: ConnectionManager,
    cancel: CancellationToken,
    finished: watch::Sender<bool>,
}

impl TwitchChatNode {
    pub fn new(id: impl Into<String>, config: serde_json::Value, caps: NodeCapabilities) -> Self {
        let id = id.into();
        let cancel = CancellationToken::new();
        let state = NodeState::shared();
        let reporter = StatusReporter::new(Arc::clone(&caps.host));
        let connection = ConnectionManager::new(id.clone(), reporter.clone(), cancel.clone());
        let (finished, init_finished) = watch::channel(false);
        let shutdown = ShutdownController::new(
            id.clone(),
            Arc::clone(&state),
            cancel.clone(),
            init_finished.clone(),
        );

        let init = Init {
            node_id: id.clone(),
            config,
            caps,
            state: Arc::clone(&state),
            reporter: reporter.clone(),
            connection: connection.clone(),
            cancel,
            finished,
        };
        tokio::spawn(init.run());

        Self {
            id,
            state,
            reporter,
            connection,
            shutdown,
            init_finished,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle one inbound automation message.
    ///
    /// Messages that arrive before the session exists, or after close, are
    /// dropped. Returns the send task for well-formed messages.
    pub fn input(&self, msg: InboundMessage) -> Option<JoinHandle<()>> {
        let (phase, dispatcher) = {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            (state.phase, state.dispatcher.clone())
        };
        let Some(dispatcher) = dispatcher else {
            debug!(node_id = %self.id, phase = phase.describe(), "dropping inbound message: no chat session");
            return None;
        };
        dispatcher.dispatch(&msg)
    }

    /// Host close hook. Waits for initialization to stop before quitting,
    /// so `done` never fires while a session may still appear.
    pub async fn close(&self, done: CloseSignal) {
        self.shutdown.close(done).await;
    }

    /// Wait for the initialization task to finish (successfully or not).
    pub async fn initialized(&self) {
        let mut finished = self.init_finished.clone();
        if finished.wait_for(|finished| *finished).await.is_err() {
            warn!(node_id = %self.id, "initialization task aborted");
        }
    }

    pub fn phase(&self) -> NodePhase {
        self.state.read().unwrap_or_else(|e| e.into_inner()).phase
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Latest status shown to the host.
    pub fn status(&self) -> StatusEvent {
        self.reporter.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusEvent> {
        self.reporter.subscribe()
    }

    pub fn probe(&self) -> HealthSnapshot {
        let (phase, channel) = {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            (state.phase, state.channel.clone())
        };
        HealthSnapshot {
            connected: phase == NodePhase::Ready
                && self.connection.state() == ConnectionState::Connected,
            channel,
            details: Some(phase.describe().to_string()),
        }
    }
}

impl Init {
    async fn run(self) {
        self.start().await;
        self.finished.send_replace(true);
    }

    async fn start(&self) {
        let acquired = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(node_id = %self.node_id, "initialization cancelled by close");
                return;
            },
            acquired = self.acquire() => acquired,
        };

        match acquired {
            Ok((channel, session)) => self.install(channel, session).await,
            Err(e) => {
                warn!(node_id = %self.node_id, error = %e, "twitch chat initialization failed");
                self.state
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .fail();
                self.reporter.error(&e);
            },
        }
    }

    /// Resolve config, register the credential and build the session.
    async fn acquire(&self) -> Result<(String, Arc<dyn ChatSession>)> {
        let config = TwitchChatConfig::from_value(self.config.clone())?;
        let resolved = config::resolve(&config, self.caps.registry.as_ref())?;
        let refresher = auth::bootstrap(resolved.auth.as_ref()).await?;

        let options = SessionOptions::for_channel(resolved.channel.clone());
        let session = self.caps.sessions.create(options, refresher);
        Ok((resolved.channel, session))
    }

    async fn install(&self, channel: String, session: Arc<dyn ChatSession>) {
        let dispatcher = MessageDispatcher::new(
            self.node_id.clone(),
            Arc::clone(&session),
            self.reporter.clone(),
            self.cancel.clone(),
        );

        let installed = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.install(channel.clone(), Arc::clone(&session), dispatcher)
        };

        if !installed {
            info!(node_id = %self.node_id, "node closed during initialization, quitting new session");
            if let Err(e) = session.quit().await {
                warn!(node_id = %self.node_id, error = %e, "chat session quit failed");
            }
            return;
        }

        info!(node_id = %self.node_id, channel = %channel, "twitch chat session created");
        self.connection.start(session);
    }
}
