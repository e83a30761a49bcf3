//! Core types for the show-control relay protocol.
//!
//! This crate holds the wire vocabulary shared by every peer on the relay:
//! frame codec, identity announcement, and the dispatcher that turns inbound
//! frames into [`StateSink`] calls. It performs no I/O.

pub mod codec;
mod dispatch;
mod identity;
mod message;
mod sink;
mod status;

pub use codec::CodecError;
pub use dispatch::{DancerClient, DispatchError, Dispatcher, InboundMessage};
pub use identity::{Identity, Role, RoleParseError};
pub use message::{Command, Frame, Task};
pub use sink::StateSink;
pub use status::{DancerStatus, PeerReport, Response};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Never started.
    #[default]
    Idle,
    /// Opening the socket, or waiting to retry.
    Connecting,
    /// Identity sent; frames flow both ways.
    Open,
    /// Stopped, or lost and about to retry.
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}
