//! Dancer status model.

use serde::{Deserialize, Serialize};

/// Status update for one dancer.
///
/// Fields left as `None` mean "unchanged" to the receiving sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DancerStatus {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl DancerStatus {
    pub const CONNECT_SUCCESS: &'static str = "Connect Success";

    /// Dancer reported as reachable through the relay.
    pub fn connected(ip: Option<String>) -> Self {
        Self {
            ok: true,
            is_connected: Some(true),
            msg: Self::CONNECT_SUCCESS.to_string(),
            ip,
        }
    }

    /// Dancer dropped off the relay with the given response.
    pub fn disconnected(response: Response) -> Self {
        Self {
            ok: response.ok,
            is_connected: Some(false),
            msg: response.msg,
            ip: None,
        }
    }

    /// Plain status report; connectivity is left untouched.
    pub fn report(response: Response) -> Self {
        Self {
            ok: response.ok,
            is_connected: None,
            msg: response.msg,
            ip: None,
        }
    }
}

/// `response` object attached to peer reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    // Older relays spell the flag `OK`.
    #[serde(alias = "OK")]
    pub ok: bool,
    pub msg: String,
}

/// Report from a named peer: `{from, response: {ok, msg}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerReport {
    pub from: String,
    pub response: Response,
}
