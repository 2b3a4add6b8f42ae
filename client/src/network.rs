//! Connection lifecycle, join handshake, and message routing.
//!
//! The websocket lives on its own thread inside a small tokio runtime; the
//! game loop talks to it only through channels and never blocks. All state
//! mutation stays on the game-loop thread, inside [`Session::pump`].

use crate::assets::TextureCache;
use crate::dispatch::{self, Outcome};
use crate::input::Intent;
use crate::state::StateStore;
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{ClientMessage, ServerMessage};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What the transport thread reports back to the session.
#[derive(Debug)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed(Option<String>),
}

pub struct Session {
    connection: ConnectionState,
    username: String,
    outbound: UnboundedSender<ClientMessage>,
    inbound: UnboundedReceiver<TransportEvent>,
    store: StateStore,
    status: Option<String>,
}

impl Session {
    /// Spawns the transport for `url` and returns a session in the
    /// `Connecting` state.
    pub fn connect(url: &str, username: &str) -> Self {
        let (outbound, inbound) = spawn_transport(url.to_string());
        let mut session = Self::with_channels(username, outbound, inbound);
        session.connection = ConnectionState::Connecting;
        session
    }

    /// Builds a session over caller-provided channels. This is how tests
    /// drive the session without a socket.
    pub fn with_channels(
        username: &str,
        outbound: UnboundedSender<ClientMessage>,
        inbound: UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Session {
            connection: ConnectionState::Disconnected,
            username: username.to_string(),
            outbound,
            inbound,
            store: StateStore::new(),
            status: None,
        }
    }

    /// Drains pending transport events, applying each one to completion in
    /// arrival order. Never blocks.
    pub fn pump(&mut self, cache: &mut TextureCache) {
        loop {
            match self.inbound.try_recv() {
                Ok(event) => self.handle_transport_event(event, cache),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connection != ConnectionState::Disconnected {
                        self.handle_transport_event(
                            TransportEvent::Closed(Some("transport task ended".to_string())),
                            cache,
                        );
                    }
                    break;
                }
            }
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent, cache: &mut TextureCache) {
        match event {
            TransportEvent::Opened => {
                info!("channel open, joining as {}", self.username);
                self.connection = ConnectionState::Connected;
                self.send(ClientMessage::JoinGame {
                    username: self.username.clone(),
                });
            }
            TransportEvent::Frame(text) => self.handle_frame(&text, cache),
            TransportEvent::Closed(reason) => {
                match &reason {
                    Some(reason) => warn!("channel closed: {}", reason),
                    None => info!("channel closed"),
                }
                self.connection = ConnectionState::Disconnected;
                // Identity dies with the connection; the last known world
                // stays in the store so the last good frame keeps rendering.
                self.store.clear_local_id();
                self.status = Some(match reason {
                    Some(reason) => format!("disconnected: {}", reason),
                    None => "disconnected".to_string(),
                });
            }
        }
    }

    fn handle_frame(&mut self, text: &str, cache: &mut TextureCache) {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(err) => {
                info!("ignoring unrecognized message: {}", err);
                return;
            }
        };

        match dispatch::apply(&mut self.store, message) {
            Outcome::JoinAccepted => {
                self.status = None;
                self.warm_avatar_textures(cache);
            }
            Outcome::StateChanged => self.warm_avatar_textures(cache),
            Outcome::JoinRejected(reason) => {
                warn!("join rejected: {}", reason);
                self.status = Some(format!("join failed: {}", reason));
            }
            Outcome::LocalPlayerRemoved => {
                warn!("server removed this player from the world");
                self.status = Some("removed from world".to_string());
            }
            Outcome::Ignored => {}
        }
    }

    fn warm_avatar_textures(&self, cache: &mut TextureCache) {
        for definition in self.store.all_avatars() {
            cache.register(definition);
        }
    }

    /// Forwards a movement intent, or silently drops it while the session is
    /// not connected and joined. Intents are never queued.
    pub fn send_intent(&mut self, intent: Intent) {
        if self.connection != ConnectionState::Connected || self.store.local_id().is_none() {
            return;
        }
        let message = match intent {
            Intent::Move(direction) => ClientMessage::Move { direction },
            Intent::Stop => ClientMessage::Stop,
        };
        self.send(message);
    }

    fn send(&mut self, message: ClientMessage) {
        if self.outbound.send(message).is_err() {
            // The transport thread is gone; its Closed event settles the rest.
            self.connection = ConnectionState::Disconnected;
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Runs the websocket on a dedicated thread and bridges it to the game loop.
///
/// Dropping the returned sender closes the socket and ends the thread.
pub fn spawn_transport(
    url: String,
) -> (UnboundedSender<ClientMessage>, UnboundedReceiver<TransportEvent>) {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<TransportEvent>();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to start transport runtime: {}", err);
                let _ = in_tx.send(TransportEvent::Closed(Some(err.to_string())));
                return;
            }
        };

        runtime.block_on(async move {
            let stream = match connect_async(url.as_str()).await {
                Ok((stream, _)) => stream,
                Err(err) => {
                    let _ = in_tx.send(TransportEvent::Closed(Some(err.to_string())));
                    return;
                }
            };
            if in_tx.send(TransportEvent::Opened).is_err() {
                return;
            }
            let (mut sink, mut source) = stream.split();

            loop {
                tokio::select! {
                    inbound = source.next() => match inbound {
                        Some(Ok(Message::Text(text))) => {
                            if in_tx.send(TransportEvent::Frame(text)).is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = in_tx.send(TransportEvent::Closed(None));
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            let _ = in_tx.send(TransportEvent::Closed(Some(err.to_string())));
                            break;
                        }
                    },
                    outbound = out_rx.recv() => match outbound {
                        Some(message) => {
                            let text = match serde_json::to_string(&message) {
                                Ok(text) => text,
                                Err(err) => {
                                    error!("failed to encode outbound message: {}", err);
                                    continue;
                                }
                            };
                            if let Err(err) = sink.send(Message::Text(text)).await {
                                let _ = in_tx.send(TransportEvent::Closed(Some(err.to_string())));
                                break;
                            }
                        }
                        // Session dropped its sender; shut the socket down.
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                }
            }
        });
    });

    (out_tx, in_rx)
}
