//! Capability surfaces shared by flowchat chat nodes.
//!
//! A chat node never talks to the automation host, the chat transport or the
//! credential-refresh service directly. Each collaborator is reached through
//! one of the traits defined here so hosts and transports can be swapped (and
//! mocked) independently of the node's lifecycle logic.

pub mod auth;
pub mod error;
pub mod host;
pub mod registry;
pub mod session;
pub mod status;

pub use {
    auth::{AuthNode, CHAT_SCOPE, Credential, CredentialRefresher},
    error::{Error, Result},
    host::{CloseSignal, ErrorKind, ErrorReport, NodeHost, NodeRegistry},
    registry::AuthNodeRegistry,
    session::{ChatSession, SessionEvent, SessionEvents, SessionFactory, SessionOptions},
    status::{HealthSnapshot, StatusEvent, StatusIndicator, StatusShape},
};
