#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use showlink_client::{ConnectionManager, ConnectionState, DancerStatus, EditorConfig, StateSink};
use showlink_core::{codec, Frame};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

pub const TIMEOUT: Duration = Duration::from_secs(3);
pub const RETRY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Status(String, DancerStatus),
    StartPlay(Value),
    SetPlaying(bool),
    SetStopped(bool),
}

/// Sink that records every call in order.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl StateSink for Recorder {
    fn update_dancer_status(&self, name: &str, status: DancerStatus) {
        self.push(Call::Status(name.to_string(), status));
    }

    fn start_play(&self, payload: Value) {
        self.push(Call::StartPlay(payload));
    }

    fn set_playing(&self, playing: bool) {
        self.push(Call::SetPlaying(playing));
    }

    fn set_stopped(&self, stopped: bool) {
        self.push(Call::SetStopped(stopped));
    }
}

pub fn manager(url: &str) -> ConnectionManager<Recorder> {
    let config = EditorConfig::new(url)
        .with_name("booth")
        .with_retry_delay(RETRY);
    ConnectionManager::new(config, Recorder::default())
}

/// Loopback relay accepting editor connections.
pub struct TestRelay {
    listener: TcpListener,
    pub addr: SocketAddr,
}

impl TestRelay {
    pub async fn bind() -> Self {
        Self::bind_at("127.0.0.1:0".parse().unwrap()).await
    }

    pub async fn bind_at(addr: SocketAddr) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub async fn accept(&self) -> RelayPeer {
        self.try_accept(TIMEOUT).await.expect("no editor connected")
    }

    pub async fn try_accept(&self, wait: Duration) -> Option<RelayPeer> {
        let (stream, _) = timeout(wait, self.listener.accept()).await.ok()?.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        Some(RelayPeer { ws })
    }
}

/// Relay side of one editor connection.
pub struct RelayPeer {
    ws: WebSocketStream<TcpStream>,
}

impl RelayPeer {
    pub async fn recv_frame(&mut self) -> Frame {
        loop {
            let msg = timeout(TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("editor closed the connection")
                .unwrap();
            if let Message::Text(text) = msg {
                return codec::decode(text.as_str()).unwrap();
            }
        }
    }

    pub async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
        // Drain until the editor acknowledges.
        while let Ok(Some(Ok(_))) = timeout(TIMEOUT, self.ws.next()).await {}
    }
}

pub async fn wait_for_state(manager: &ConnectionManager<Recorder>, state: ConnectionState) {
    let mut rx = manager.subscribe();
    timeout(TIMEOUT, rx.wait_for(|s| *s == state))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {:?}", state))
        .unwrap();
}

pub async fn wait_for_calls(manager: &ConnectionManager<Recorder>, count: usize) -> Vec<Call> {
    timeout(TIMEOUT, async {
        loop {
            let calls = manager.sink().calls();
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for sink calls")
}

/// Address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
