//! Relay connection manager.
//!
//! One background task owns the socket. It connects, announces the editor
//! identity, then feeds inbound text frames one at a time to the
//! [`Dispatcher`]. When the socket fails or closes it waits a fixed delay and
//! tries again until [`ConnectionManager::stop`] is called.

use crate::EditorConfig;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use showlink_core::{codec, CodecError, ConnectionState, Dispatcher, Frame, Identity, StateSink};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Error returned to producers calling [`ConnectionManager::send`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("relay connection is not open (state: {0:?})")]
    NotOpen(ConnectionState),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// State visible to both the manager handle and the connection task.
struct Shared {
    state: watch::Sender<ConnectionState>,
    /// Writer queue of the live session; `Some` only while open.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!("connection state {:?} -> {:?}", previous, state);
        }
    }

    fn close_outbound(&self) {
        self.outbound.lock().take();
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the single relay connection.
pub struct ConnectionManager<S> {
    config: EditorConfig,
    identity: Identity,
    dispatcher: Arc<Dispatcher<S>>,
    shared: Arc<Shared>,
    running: Option<Running>,
}

impl<S: StateSink + 'static> ConnectionManager<S> {
    /// Create an idle manager. Inbound messages will be applied to `sink`.
    pub fn new(config: EditorConfig, sink: S) -> Self {
        let identity = Identity::editor(config.name.clone());
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            config,
            identity,
            dispatcher: Arc::new(Dispatcher::new(sink)),
            shared: Arc::new(Shared {
                state,
                outbound: Mutex::new(None),
            }),
            running: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Begin connecting. Does nothing if the connection task is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if let Some(running) = &self.running {
            if !running.handle.is_finished() {
                tracing::debug!("relay connection already running");
                return;
            }
        }

        let cancel = CancellationToken::new();
        self.shared.set_state(ConnectionState::Connecting);
        let handle = tokio::spawn(run(
            self.config.clone(),
            self.identity.clone(),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.shared),
            cancel.clone(),
        ));
        self.running = Some(Running { cancel, handle });
    }

    /// Close the connection and cancel any pending retry.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                tracing::warn!("relay connection task failed: {}", e);
            }
        }
        self.shared.close_outbound();
        self.shared.set_state(ConnectionState::Closed);
    }

    /// Queue a frame for the relay.
    ///
    /// Fire-and-forget: returns once the frame is queued on the live session.
    pub fn send(&self, frame: impl Into<Frame>) -> Result<(), ClientError> {
        let state = self.state();
        if !state.is_open() {
            return Err(ClientError::NotOpen(state));
        }
        let text = codec::encode(&frame.into())?;

        let outbound = self.shared.outbound.lock();
        let tx = outbound.as_ref().ok_or(ClientError::NotOpen(state))?;
        tx.send(text)
            .map_err(|_| ClientError::NotOpen(ConnectionState::Closed))
    }
}

impl<S> Drop for ConnectionManager<S> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

enum SessionEnd {
    Stopped,
    Lost,
}

async fn run<S: StateSink>(
    config: EditorConfig,
    identity: Identity,
    dispatcher: Arc<Dispatcher<S>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    loop {
        shared.set_state(ConnectionState::Connecting);
        tracing::info!("Connecting to relay at {}", config.relay_url);

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = tokio_tungstenite::connect_async(config.relay_url.as_str()) => result,
        };

        match connected {
            Ok((ws, _)) => {
                let end = session(ws, &identity, &dispatcher, &shared, &cancel).await;
                shared.close_outbound();
                match end {
                    SessionEnd::Stopped => break,
                    SessionEnd::Lost => {
                        shared.set_state(ConnectionState::Closed);
                        tracing::warn!("Relay connection closed");
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to connect to {}: {}", config.relay_url, e);
            }
        }

        tracing::info!("Retrying in {}ms", config.retry_delay.as_millis());
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.retry_delay) => {}
        }
    }

    shared.close_outbound();
    shared.set_state(ConnectionState::Closed);
    tracing::info!("Relay connection stopped");
}

async fn session<S: StateSink>(
    ws: RelaySocket,
    identity: &Identity,
    dispatcher: &Dispatcher<S>,
    shared: &Shared,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut sink, mut stream) = ws.split();

    // Identity goes out before the writer queue exists, so it is always first.
    let hello = match codec::encode(&Frame::board_info(identity)) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Failed to encode identity: {}", e);
            return SessionEnd::Lost;
        }
    };
    if let Err(e) = sink.send(Message::Text(hello.into())).await {
        tracing::warn!("Failed to announce identity: {}", e);
        return SessionEnd::Lost;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    *shared.outbound.lock() = Some(tx);
    shared.set_state(ConnectionState::Open);
    tracing::info!("Connected to relay as {}", identity);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                if let Err(e) = sink.close().await {
                    tracing::debug!("Error closing relay socket: {}", e);
                }
                return SessionEnd::Stopped;
            }

            incoming = stream.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) if is_connection_lost(&e) => {
                        tracing::warn!("Relay transport error: {}", e);
                        return SessionEnd::Lost;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Relay transport error: {}", e);
                        continue;
                    }
                    None => return SessionEnd::Lost,
                };

                match msg {
                    Message::Text(text) => handle_text(dispatcher, text.as_str()),
                    Message::Binary(data) => {
                        tracing::warn!("Ignoring {} byte binary frame", data.len());
                    }
                    Message::Close(frame) => {
                        tracing::debug!("Relay sent close: {:?}", frame);
                    }
                    _ => {}
                }
            }

            Some(text) = rx.recv() => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    if is_connection_lost(&e) {
                        return SessionEnd::Lost;
                    }
                }
            }
        }
    }
}

/// Decode and dispatch one text frame. Bad frames are logged and dropped.
fn handle_text<S: StateSink>(dispatcher: &Dispatcher<S>, text: &str) {
    tracing::debug!("Data from relay: {}", text);

    let frame = match codec::decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Dropping frame: {}", e);
            return;
        }
    };

    if let Err(e) = dispatcher.dispatch(frame) {
        tracing::warn!("Dropping message: {}", e);
    }
}

fn is_connection_lost(err: &tungstenite::Error) -> bool {
    matches!(
        err,
        tungstenite::Error::ConnectionClosed
            | tungstenite::Error::AlreadyClosed
            | tungstenite::Error::Io(_)
            | tungstenite::Error::Protocol(_)
    )
}
