//! # World Viewer Client
//!
//! Client-side implementation of the shared-world viewer: it keeps a local
//! copy of server-authoritative player state, follows the local player with a
//! clamped camera, and turns keyboard input into movement intents.
//!
//! ## Architecture Overview
//!
//! The client is a passive renderer of authoritative state. It never
//! predicts: every player position on screen is the last one the server
//! pushed. That keeps the core a small event loop with no reconciliation
//! machinery, at the cost of showing remote latency directly.
//!
//! Events flow one way. Inbound frames and key edges are applied to the
//! state store on the game-loop thread, one handler at a time, and the
//! renderer reads that store once per frame. The websocket itself lives on a
//! separate transport thread and is reached only through channels, so the
//! loop never blocks on the network.
//!
//! ## Module Organization
//!
//! - [`state`]: the store of known players and avatar definitions
//! - [`dispatch`]: applies decoded server messages to the store
//! - [`rendering`]: camera clamping, culling, and the draw passes
//! - [`input`]: held-key tracking and move/stop intent emission
//! - [`network`]: connection lifecycle, join handshake, transport bridge
//! - [`assets`]: one-time resolution of avatar frames into textures
//!
//! ## Failure Philosophy
//!
//! Nothing a server can send kills this client: malformed messages are
//! logged and dropped, unknown player references are healed by insertion,
//! and a transport fault freezes the last good frame instead of blanking
//! the screen.

pub mod assets;
pub mod dispatch;
pub mod input;
pub mod network;
pub mod rendering;
pub mod state;
