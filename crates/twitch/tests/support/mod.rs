//! Recording host and scripted chat transport shared by the integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    async_trait::async_trait,
    secrecy::Secret,
    serde_json::Value,
    tokio::sync::broadcast,
};

use {
    flowchat_channels::{
        AuthNodeRegistry, ChatSession, Credential, CredentialRefresher, Error, ErrorKind,
        ErrorReport, NodeHost, Result, SessionEvent, SessionEvents, SessionFactory,
        SessionOptions, StatusEvent,
    },
    flowchat_twitch::{StaticAuthNode, TwitchAuthConfig, TwitchChatNode, node::NodeCapabilities},
};

#[derive(Default)]
pub struct Host {
    statuses: Mutex<Vec<StatusEvent>>,
    errors: Mutex<Vec<ErrorReport>>,
}

impl Host {
    pub fn statuses(&self) -> Vec<StatusEvent> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> StatusEvent {
        self.statuses.lock().unwrap().last().cloned().unwrap()
    }

    pub fn errors(&self) -> Vec<ErrorReport> {
        self.errors.lock().unwrap().clone()
    }

    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.errors().into_iter().map(|e| e.kind).collect()
    }
}

impl NodeHost for Host {
    fn status(&self, status: StatusEvent) {
        self.statuses.lock().unwrap().push(status);
    }

    fn error(&self, report: ErrorReport) {
        self.errors.lock().unwrap().push(report);
    }
}

#[derive(Default)]
pub struct Refresher {
    pub registrations: Mutex<Vec<(Credential, Vec<String>)>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl CredentialRefresher for Refresher {
    async fn register(&self, credential: Credential, scopes: &[&str]) -> Result<()> {
        self.registrations
            .lock()
            .unwrap()
            .push((credential, scopes.iter().map(|s| s.to_string()).collect()));
        match &self.fail_with {
            Some(reason) => Err(Error::rejected(reason)),
            None => Ok(()),
        }
    }
}

pub struct Session {
    events: broadcast::Sender<SessionEvent>,
    outcomes: Mutex<VecDeque<(Duration, Option<String>)>>,
    pub said: Mutex<Vec<(String, String)>>,
    pub connects: AtomicUsize,
    pub quits: AtomicUsize,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            events: broadcast::channel(16).0,
            outcomes: Mutex::new(VecDeque::new()),
            said: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            quits: AtomicUsize::new(0),
        }
    }
}

impl Session {
    pub fn next_say(&self, delay: Duration, failure: Option<&str>) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back((delay, failure.map(String::from)));
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn said(&self) -> Vec<(String, String)> {
        self.said.lock().unwrap().clone()
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSession for Session {
    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn say(&self, channel: &str, message: &str) -> Result<()> {
        self.said
            .lock()
            .unwrap()
            .push((channel.to_string(), message.to_string()));
        let outcome = self.outcomes.lock().unwrap().pop_front();
        let Some((delay, failure)) = outcome else {
            return Ok(());
        };
        tokio::time::sleep(delay).await;
        match failure {
            Some(reason) => Err(Error::rejected(reason)),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> SessionEvents {
        self.events.subscribe()
    }
}

#[derive(Default)]
pub struct Sessions {
    pub session: Arc<Session>,
    pub created: Mutex<Vec<SessionOptions>>,
}

impl Sessions {
    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl SessionFactory for Sessions {
    fn create(
        &self,
        options: SessionOptions,
        _auth: Arc<dyn CredentialRefresher>,
    ) -> Arc<dyn ChatSession> {
        self.created.lock().unwrap().push(options);
        self.session.clone()
    }
}

/// Factory whose `create` parks its thread until the test releases it.
pub struct GatedSessions {
    pub session: Arc<Session>,
    entered: Mutex<std::sync::mpsc::Sender<()>>,
    release: Mutex<std::sync::mpsc::Receiver<()>>,
}

impl GatedSessions {
    /// Returns the factory, a receiver that fires when `create` is entered,
    /// and the sender that lets `create` return.
    pub fn new() -> (
        Self,
        std::sync::mpsc::Receiver<()>,
        std::sync::mpsc::Sender<()>,
    ) {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let factory = Self {
            session: Arc::new(Session::default()),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (factory, entered_rx, release_tx)
    }
}

impl SessionFactory for GatedSessions {
    fn create(
        &self,
        _options: SessionOptions,
        _auth: Arc<dyn CredentialRefresher>,
    ) -> Arc<dyn ChatSession> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        self.session.clone()
    }
}

/// One host with a single auth node (`"auth-1"`) and a scripted transport.
pub struct Harness {
    pub host: Arc<Host>,
    pub refresher: Arc<Refresher>,
    pub registry: Arc<AuthNodeRegistry>,
    pub sessions: Arc<Sessions>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_refresher(Refresher::default())
    }

    pub fn with_refresher(refresher: Refresher) -> Self {
        let refresher = Arc::new(refresher);
        let registry = Arc::new(AuthNodeRegistry::new());
        registry.register(
            "auth-1",
            Arc::new(StaticAuthNode::new(
                TwitchAuthConfig {
                    twitch_refresh_token: Secret::new("refresh-token".into()),
                },
                refresher.clone(),
            )),
        );
        Self {
            host: Arc::new(Host::default()),
            refresher,
            registry,
            sessions: Arc::new(Sessions::default()),
        }
    }

    pub fn node(&self, config: Value) -> TwitchChatNode {
        TwitchChatNode::new("twitch-chat-1", config, NodeCapabilities {
            host: self.host.clone(),
            registry: self.registry.clone(),
            sessions: self.sessions.clone(),
        })
    }

    /// A node that has finished initialization against `"somechannel"`.
    pub async fn ready_node(&self) -> TwitchChatNode {
        let node = self.node(serde_json::json!({"twitch": "auth-1", "channels": "somechannel"}));
        node.initialized().await;
        settle().await;
        node
    }
}

/// Let spawned tasks run on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
