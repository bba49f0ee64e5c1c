use {
    tokio::sync::watch,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use flowchat_channels::CloseSignal;

use crate::state::SharedNodeState;

/// Runs the host's close hook for a node.
#[derive(Clone)]
pub struct ShutdownController {
    node_id: String,
    state: SharedNodeState,
    cancel: CancellationToken,
    init_finished: watch::Receiver<bool>,
}

impl ShutdownController {
    /// `init_finished` flips to `true` (or closes) once initialization has
    /// either installed a session or given up.
    pub fn new(
        node_id: impl Into<String>,
        state: SharedNodeState,
        cancel: CancellationToken,
        init_finished: watch::Receiver<bool>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            state,
            cancel,
            init_finished,
        }
    }

    /// Stop accepting input, quit the session and signal completion.
    ///
    /// Safe to call more than once and before the session exists: the quit
    /// is issued at most once, and `done` is only signalled after any session
    /// that initialization is still producing has been quit.
    pub async fn close(&self, done: CloseSignal) {
        // Stops init, the event listener, and the reporting of in-flight sends.
        self.cancel.cancel();

        let mut init_finished = self.init_finished.clone();
        if init_finished.wait_for(|finished| *finished).await.is_err() {
            debug!(node_id = %self.node_id, "initialization ended without reporting");
        }

        let session = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.begin_close()
        };

        match session {
            Some(session) => {
                info!(node_id = %self.node_id, "quitting chat session");
                if let Err(e) = session.quit().await {
                    warn!(node_id = %self.node_id, error = %e, "chat session quit failed");
                }
            },
            None => debug!(node_id = %self.node_id, "no chat session to quit"),
        }

        done.done();
    }
}
