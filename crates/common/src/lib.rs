//! Shared error definitions and small utilities used across all flowchat crates.

pub mod error;
pub mod time;

pub use error::{Error, FromMessage, Result};
