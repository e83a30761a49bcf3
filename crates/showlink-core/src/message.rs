//! Protocol messages.
//!
//! Every frame on the wire is a JSON pair `[task, payload]`. The task name
//! selects how the payload is interpreted; [`Task`] gives the names this
//! editor understands and keeps everything else as a generic status report.

use crate::Identity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One `(task, payload)` pair as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame(pub String, pub Value);

impl Frame {
    pub fn new(task: impl Into<String>, payload: Value) -> Self {
        Self(task.into(), payload)
    }

    /// Identity announcement sent first on every connection.
    pub fn board_info(identity: &Identity) -> Self {
        Self::new(
            Task::BOARD_INFO,
            serde_json::json!({
                "type": identity.role.as_str(),
                "name": identity.name,
            }),
        )
    }

    pub fn task(&self) -> &str {
        &self.0
    }

    pub fn payload(&self) -> &Value {
        &self.1
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.0, self.1)
    }
}

/// Classified task name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Relay reports the addresses of connected dancers.
    GetIp,
    /// A dancer dropped off the relay.
    Disconnect,
    Play,
    Pause,
    Stop,
    /// Any other task: a status report from a named peer.
    Status(String),
}

impl Task {
    pub const BOARD_INFO: &'static str = "boardInfo";
    pub const GET_IP: &'static str = "getIp";
    pub const DISCONNECT: &'static str = "disconnect";
    pub const PLAY: &'static str = "play";
    pub const PAUSE: &'static str = "pause";
    pub const STOP: &'static str = "stop";

    pub fn classify(name: &str) -> Self {
        match name {
            Self::GET_IP => Task::GetIp,
            Self::DISCONNECT => Task::Disconnect,
            Self::PLAY => Task::Play,
            Self::PAUSE => Task::Pause,
            Self::STOP => Task::Stop,
            other => Task::Status(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Task::GetIp => Self::GET_IP,
            Task::Disconnect => Self::DISCONNECT,
            Task::Play => Self::PLAY,
            Task::Pause => Self::PAUSE,
            Task::Stop => Self::STOP,
            Task::Status(name) => name,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback commands the editor sends to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start playback; the payload is forwarded untouched.
    Play(Value),
    Pause,
    Stop,
}

impl From<Command> for Frame {
    fn from(command: Command) -> Self {
        match command {
            Command::Play(payload) => Frame::new(Task::PLAY, payload),
            Command::Pause => Frame::new(Task::PAUSE, Value::Object(Default::default())),
            Command::Stop => Frame::new(Task::STOP, Value::Object(Default::default())),
        }
    }
}
