use std::sync::Arc;

use tokio::sync::watch;

use flowchat_channels::{NodeHost, StatusEvent};

use crate::error::Error;

/// Single mailbox for everything a node shows the host.
///
/// Every stage (connection events, send outcomes, init failures) writes
/// through here; the host sees each write in order and the latest value is
/// kept for [`StatusReporter::current`]. Concurrent sends race: whichever
/// settles last wins.
#[derive(Clone)]
pub struct StatusReporter {
    host: Arc<dyn NodeHost>,
    latest: Arc<watch::Sender<StatusEvent>>,
}

impl StatusReporter {
    pub fn new(host: Arc<dyn NodeHost>) -> Self {
        let (latest, _) = watch::channel(StatusEvent::default());
        Self {
            host,
            latest: Arc::new(latest),
        }
    }

    /// Publish `status`. The mailbox update and the host call happen under
    /// the mailbox's write lock, so concurrent writers reach the host in the
    /// same order they land in [`StatusReporter::current`]. The host must not
    /// read the node's status back from inside [`NodeHost::status`].
    pub fn status(&self, status: StatusEvent) {
        self.latest.send_modify(|latest| {
            *latest = status.clone();
            self.host.status(status);
        });
    }

    pub fn error(&self, error: &Error) {
        self.host.error(error.report());
    }

    pub fn current(&self) -> StatusEvent {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusEvent> {
        self.latest.subscribe()
    }
}
