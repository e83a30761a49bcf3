//! In-memory state store for the console editor.

use serde_json::Value;
use showlink_core::{DancerStatus, StateSink};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Playback as seen by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Merged view of one dancer.
#[derive(Debug, Clone, Default)]
pub struct DancerRecord {
    pub ok: bool,
    pub connected: bool,
    pub msg: String,
    pub ip: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    board: Option<Value>,
    dancers: BTreeMap<String, DancerRecord>,
    playback: Playback,
}

/// Dancer and playback state, updated by the relay connection.
#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    pub fn set_board(&self, board: Value) {
        self.lock().board = Some(board);
    }

    /// Human-readable summary for the `status` command.
    pub fn summary(&self) -> String {
        let inner = self.lock();
        let mut out = format!("playback: {:?}\n", inner.playback);
        if let Some(board) = &inner.board {
            let name = board.get("name").and_then(Value::as_str).unwrap_or("(unnamed)");
            out.push_str(&format!("board: {}\n", name));
        }
        if inner.dancers.is_empty() {
            out.push_str("no dancers seen yet\n");
        }
        for (name, d) in &inner.dancers {
            out.push_str(&format!(
                "{:<16} {:<12} ok={:<5} {} {}\n",
                name,
                if d.connected { "connected" } else { "offline" },
                d.ok,
                d.ip.as_deref().unwrap_or("-"),
                d.msg,
            ));
        }
        out
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateSink for Store {
    fn update_dancer_status(&self, name: &str, status: DancerStatus) {
        let mut inner = self.lock();
        let record = inner.dancers.entry(name.to_string()).or_default();
        record.ok = status.ok;
        record.msg = status.msg;
        if let Some(connected) = status.is_connected {
            record.connected = connected;
        }
        if status.ip.is_some() {
            record.ip = status.ip;
        }
        tracing::info!(
            "{}: {} ({})",
            name,
            record.msg,
            if record.connected { "connected" } else { "offline" }
        );
    }

    fn start_play(&self, payload: Value) {
        tracing::info!("play {}", payload);
        self.lock().playback = Playback::Playing;
    }

    fn set_playing(&self, playing: bool) {
        let mut inner = self.lock();
        inner.playback = if playing { Playback::Playing } else { Playback::Paused };
        tracing::info!("playback {:?}", inner.playback);
    }

    fn set_stopped(&self, stopped: bool) {
        if stopped {
            self.lock().playback = Playback::Stopped;
            tracing::info!("playback stopped");
        }
    }
}
