//! Twitch chat node for flowchat.
//!
//! Bridges one Twitch chat channel into an automation host node: registers
//! the chat credential, tracks the connection, forwards inbound automation
//! messages to the channel and quits the session when the host removes the
//! node.

pub mod auth;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod shutdown;
pub mod state;
pub mod status;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod testing;

pub use {
    auth::StaticAuthNode,
    config::{TwitchAuthConfig, TwitchChatConfig},
    dispatch::{InboundMessage, OutboundMessage, ValidationError},
    error::{Error, Result},
    node::TwitchChatNode,
};
