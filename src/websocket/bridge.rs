//! Local websocket relay standing in for a page's real websocket target.
//!
//! # Responsibilities
//! - Serve websocket upgrades on an OS-assigned local port
//! - Deliver a handshake sentinel, then every client frame, to the handler
//! - Record delivered messages in the payload log for `wait`
//! - Let the handler and the test push frames back to the client
//!
//! # Design Decisions
//! - The most recent client connection owns `send`
//! - Outbound frames go through an unbounded channel drained by a writer
//!   task, so `send` never blocks the caller
//! - Binary frames are decoded lossily and treated like text
//! - The server stops on the session's shutdown signal or its own `close`

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use crate::config::WebsocketConfig;
use crate::error::{HostError, InterceptError};
use crate::intercept::Method;
use crate::lifecycle::Shutdown;
use crate::net::Listener;
use crate::observation::{wait_for_observation, CaptureLog, WaitOptions};

/// Callback invoked for the handshake and every client message.
pub type BridgeHandlerFn = Arc<dyn Fn(BridgeMessage) + Send + Sync>;

/// One message delivered to the bridge handler.
#[derive(Debug, Clone)]
pub struct BridgeMessage {
    pub message: String,
    /// Replies to the connection the message came from.
    pub send: BridgeSender,
}

/// Pushes text frames to one connected client.
#[derive(Clone)]
pub struct BridgeSender {
    tx: mpsc::UnboundedSender<String>,
    target_url: Arc<str>,
}

impl BridgeSender {
    /// Queue a text frame for the client.
    pub fn send(&self, message: impl Into<String>) -> Result<(), InterceptError> {
        self.tx
            .send(message.into())
            .map_err(|_| InterceptError::BridgeNotConnected {
                url: self.target_url.to_string(),
            })
    }

    /// False once the client has disconnected.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl fmt::Debug for BridgeSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSender")
            .field("target_url", &self.target_url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

struct BridgeState {
    target_url: Arc<str>,
    handshake: String,
    payloads: CaptureLog<String>,
    sender: Mutex<Option<BridgeSender>>,
    handler: BridgeHandlerFn,
}

impl BridgeState {
    fn deliver(&self, message: String, sender: &BridgeSender) {
        self.payloads.push(message.clone());
        (self.handler)(BridgeMessage {
            message,
            send: sender.clone(),
        });
    }
}

/// Caller-facing side of an open bridge.
#[derive(Clone)]
pub struct BridgeHandle {
    state: Arc<BridgeState>,
    port: u16,
    relay_url: String,
    wait_defaults: WaitOptions,
    stop: Arc<Shutdown>,
}

impl BridgeHandle {
    /// Bind a relay and start serving it until `shutdown` fires.
    pub(crate) async fn open(
        target_url: &str,
        handler: BridgeHandlerFn,
        config: &WebsocketConfig,
        wait_defaults: WaitOptions,
        shutdown: &Shutdown,
    ) -> Result<Self, InterceptError> {
        if shutdown.is_triggered() {
            return Err(HostError::Closed.into());
        }

        let listener = Listener::bind_ephemeral(&config.bind_host).await?;
        let port = listener.port();
        let relay_url = format!("ws://{}:{}", config.relay_host, port);

        let state = Arc::new(BridgeState {
            target_url: Arc::from(target_url),
            handshake: config.handshake_message.clone(),
            payloads: CaptureLog::new(),
            sender: Mutex::new(None),
            handler,
        });

        let app = Router::new()
            .fallback(relay_upgrade)
            .with_state(state.clone())
            .layer(TraceLayer::new_for_http());

        let stop = Arc::new(Shutdown::new());
        let mut session_stop = shutdown.subscribe();
        let mut bridge_stop = stop.subscribe();
        let target = target_url.to_string();
        tokio::spawn(async move {
            let result = axum::serve(listener.into_inner(), app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        _ = session_stop.recv() => {}
                        _ = bridge_stop.recv() => {}
                    }
                })
                .await;
            match result {
                Ok(()) => tracing::info!(target_url = %target, port = port, "Websocket bridge stopped"),
                Err(e) => tracing::warn!(target_url = %target, error = %e, "Websocket bridge failed"),
            }
        });

        tracing::info!(target_url = %target_url, relay = %relay_url, "Websocket bridge listening");

        Ok(Self {
            state,
            port,
            relay_url,
            wait_defaults,
            stop,
        })
    }

    /// Stop this relay without closing the session.
    pub fn close(&self) {
        if self.stop.trigger() {
            tracing::debug!(target_url = %self.state.target_url, "Websocket bridge closing");
        }
    }

    /// Local port the relay listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `ws://<relay host>:<port>`, substituted for the target in page content.
    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// The websocket URL the relay stands in for.
    pub fn target_url(&self) -> &str {
        &self.state.target_url
    }

    /// Every message delivered to the handler, handshake first.
    pub fn payloads(&self) -> Vec<String> {
        self.state.payloads.snapshot()
    }

    /// Push a frame to the most recently connected client.
    pub fn send(&self, message: impl Into<String>) -> Result<(), InterceptError> {
        let sender = self
            .state
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match sender {
            Some(sender) => sender.send(message),
            None => Err(InterceptError::BridgeNotConnected {
                url: self.state.target_url.to_string(),
            }),
        }
    }

    /// Wait for a payload not yet consumed by a previous wait.
    pub async fn wait(&self) -> Result<(), InterceptError> {
        self.wait_with(self.wait_defaults).await
    }

    /// Like [`wait`](Self::wait) with explicit timing.
    pub async fn wait_with(&self, options: WaitOptions) -> Result<(), InterceptError> {
        wait_for_observation(
            &self.state.payloads,
            Method::WebSocket.as_str(),
            &self.state.target_url,
            options,
        )
        .await
    }
}

impl fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("target_url", &self.state.target_url)
            .field("relay_url", &self.relay_url)
            .field("payloads", &self.state.payloads.len())
            .finish()
    }
}

async fn relay_upgrade(State(state): State<Arc<BridgeState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| relay_connection(socket, state))
}

async fn relay_connection(socket: WebSocket, state: Arc<BridgeState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let sender = BridgeSender {
        tx,
        target_url: state.target_url.clone(),
    };
    *state.sender.lock().unwrap_or_else(PoisonError::into_inner) = Some(sender.clone());

    tracing::info!(target_url = %state.target_url, "Websocket bridge client connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(Message::Text(message.into())).await.is_err() {
                break;
            }
        }
    });

    state.deliver(state.handshake.clone(), &sender);

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Websocket bridge read failed");
                break;
            }
        };
        tracing::debug!(target_url = %state.target_url, message = %message, "Bridge frame received");
        state.deliver(message, &sender);
    }

    writer.abort();
    tracing::info!(target_url = %state.target_url, "Websocket bridge client disconnected");
}
