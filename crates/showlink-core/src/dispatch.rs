//! Inbound message classification and routing.
//!
//! [`InboundMessage::parse`] turns a decoded [`Frame`] into a typed message,
//! validating the payload shape its task requires. [`Dispatcher`] then maps
//! the message onto [`StateSink`] calls. Neither does any I/O.

use crate::{DancerStatus, Frame, PeerReport, StateSink, Task};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A payload did not have the shape its task requires.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("malformed '{task}' message: {source}")]
    MalformedMessage {
        task: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Entry of the `getIp` dancer table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DancerClient {
    #[serde(default)]
    pub client_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetIpPayload {
    dancer_clients: BTreeMap<String, DancerClient>,
}

/// Typed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Connected dancers keyed by name, in name order.
    GetIp(BTreeMap<String, DancerClient>),
    Disconnect(PeerReport),
    Play(Value),
    Pause,
    Stop,
    /// Generic report under a task name this editor has no special handling for.
    Status { task: String, report: PeerReport },
}

impl InboundMessage {
    pub fn parse(frame: Frame) -> Result<Self, DispatchError> {
        let (name, payload) = frame.into_parts();
        let task = Task::classify(&name);
        let malformed = |source| DispatchError::MalformedMessage {
            task: name.clone(),
            source,
        };

        let message = match task {
            Task::GetIp => {
                let payload: GetIpPayload = serde_json::from_value(payload).map_err(malformed)?;
                InboundMessage::GetIp(payload.dancer_clients)
            }
            Task::Disconnect => {
                InboundMessage::Disconnect(serde_json::from_value(payload).map_err(malformed)?)
            }
            Task::Play => InboundMessage::Play(payload),
            Task::Pause => InboundMessage::Pause,
            Task::Stop => InboundMessage::Stop,
            Task::Status(task) => {
                let report = serde_json::from_value(payload).map_err(malformed)?;
                InboundMessage::Status { task, report }
            }
        };
        Ok(message)
    }
}

/// Routes inbound messages to a [`StateSink`].
#[derive(Debug, Clone)]
pub struct Dispatcher<S> {
    sink: S,
}

impl<S: StateSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Validate `frame` and apply it to the sink.
    ///
    /// On error no sink method has been called.
    pub fn dispatch(&self, frame: Frame) -> Result<(), DispatchError> {
        let message = InboundMessage::parse(frame)?;
        self.apply(message);
        Ok(())
    }

    pub fn apply(&self, message: InboundMessage) {
        match message {
            InboundMessage::GetIp(dancers) => {
                tracing::debug!("relay reports {} connected dancer(s)", dancers.len());
                for (name, client) in dancers {
                    self.sink
                        .update_dancer_status(&name, DancerStatus::connected(client.client_ip));
                }
            }
            InboundMessage::Disconnect(PeerReport { from, response }) => {
                tracing::info!("dancer {} disconnected: {}", from, response.msg);
                self.sink
                    .update_dancer_status(&from, DancerStatus::disconnected(response));
            }
            InboundMessage::Play(payload) => self.sink.start_play(payload),
            InboundMessage::Pause => self.sink.set_playing(false),
            InboundMessage::Stop => self.sink.set_stopped(true),
            InboundMessage::Status { task, report } => {
                tracing::debug!("status '{}' from {}", task, report.from);
                self.sink
                    .update_dancer_status(&report.from, DancerStatus::report(report.response));
            }
        }
    }
}
