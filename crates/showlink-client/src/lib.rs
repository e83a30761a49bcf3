//! Editor-side client for the show-control relay.
//!
//! [`ConnectionManager`] keeps one WebSocket open to the relay, announces
//! the editor, and applies inbound traffic to a [`showlink_core::StateSink`].

mod config;
mod manager;

pub use config::{local_host_name, ConfigError, EditorConfig, DEFAULT_RELAY_URL, DEFAULT_RETRY_DELAY};
pub use manager::{ClientError, ConnectionManager};
pub use showlink_core::{Command, ConnectionState, DancerStatus, Frame, StateSink};
