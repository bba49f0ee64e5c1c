//! Scripted capabilities for unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {async_trait::async_trait, tokio::sync::broadcast};

use flowchat_channels::{
    ChatSession, Credential, CredentialRefresher, Error, ErrorKind, ErrorReport, NodeHost,
    Result, SessionEvent, SessionEvents, SessionFactory, SessionOptions, StatusEvent,
};

#[derive(Default)]
pub struct RecordingRefresher {
    calls: Mutex<Vec<(Credential, Vec<String>)>>,
    failure: Option<String>,
}

impl RecordingRefresher {
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(Credential, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialRefresher for RecordingRefresher {
    async fn register(&self, credential: Credential, scopes: &[&str]) -> Result<()> {
        self.calls.lock().unwrap().push((
            credential,
            scopes.iter().map(|s| s.to_string()).collect(),
        ));
        match &self.failure {
            Some(reason) => Err(Error::rejected(reason)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingHost {
    statuses: Mutex<Vec<StatusEvent>>,
    errors: Mutex<Vec<ErrorReport>>,
}

impl RecordingHost {
    pub fn statuses(&self) -> Vec<StatusEvent> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<StatusEvent> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn errors(&self) -> Vec<ErrorReport> {
        self.errors.lock().unwrap().clone()
    }

    pub fn errors_of(&self, kind: ErrorKind) -> Vec<ErrorReport> {
        self.errors().into_iter().filter(|e| e.kind == kind).collect()
    }
}

impl NodeHost for RecordingHost {
    fn status(&self, status: StatusEvent) {
        self.statuses.lock().unwrap().push(status);
    }

    fn error(&self, report: ErrorReport) {
        self.errors.lock().unwrap().push(report);
    }
}

/// Outcome of one scripted `say` call.
#[derive(Clone)]
pub struct SayScript {
    pub delay: Duration,
    pub failure: Option<String>,
}

pub struct MockSession {
    events: broadcast::Sender<SessionEvent>,
    script: Mutex<VecDeque<SayScript>>,
    said: Mutex<Vec<(String, String)>>,
    connects: AtomicUsize,
    quits: AtomicUsize,
}

impl Default for MockSession {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            script: Mutex::new(VecDeque::new()),
            said: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            quits: AtomicUsize::new(0),
        }
    }
}

impl MockSession {
    pub fn script_say(&self, delay: Duration, failure: Option<&str>) {
        self.script.lock().unwrap().push_back(SayScript {
            delay,
            failure: failure.map(String::from),
        });
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn said(&self) -> Vec<(String, String)> {
        self.said.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSession for MockSession {
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
        let script = self.script.lock().unwrap().pop_front();
        let Some(script) = script else {
            return Ok(());
        };
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        match script.failure {
            Some(reason) => Err(Error::rejected(reason)),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> SessionEvents {
        self.events.subscribe()
    }
}

/// Hands out one shared [`MockSession`] and records the options it was built with.
#[derive(Default)]
pub struct MockSessionFactory {
    pub session: Arc<MockSession>,
    created: Mutex<Vec<SessionOptions>>,
}

impl MockSessionFactory {
    pub fn created(&self) -> Vec<SessionOptions> {
        self.created.lock().unwrap().clone()
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(
        &self,
        options: SessionOptions,
        _auth: Arc<dyn CredentialRefresher>,
    ) -> Arc<dyn ChatSession> {
        self.created.lock().unwrap().push(options);
        Arc::clone(&self.session) as Arc<dyn ChatSession>
    }
}
