use crate::state::StateStore;
use log::{debug, info, warn};
use shared::ServerMessage;

/// What applying one inbound message did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Players or avatars changed; the view needs a redraw.
    StateChanged,
    /// Join handshake succeeded and the world was bulk-loaded.
    JoinAccepted,
    /// The server refused the join; carries the reported reason.
    JoinRejected(String),
    /// The server removed this client's own player. Non-fatal desync: the
    /// session keeps its identity and the last known world stays rendered.
    LocalPlayerRemoved,
    /// Nothing usable in the message.
    Ignored,
}

/// Applies exactly one state transition per message.
///
/// The match is exhaustive over the protocol enum, so a new message kind is a
/// compile-time decision here rather than a silently-dropped default case.
pub fn apply(store: &mut StateStore, message: ServerMessage) -> Outcome {
    match message {
        ServerMessage::JoinGame {
            success: true,
            player_id: Some(id),
            players,
            avatars,
            ..
        } => {
            store.reset_world(players.unwrap_or_default(), avatars.unwrap_or_default());
            store.set_local_id(id);
            info!(
                "joined as {} with {} players in view",
                store.local_id().unwrap_or("?"),
                store.player_count()
            );
            Outcome::JoinAccepted
        }
        ServerMessage::JoinGame {
            success: true,
            player_id: None,
            ..
        } => {
            warn!("join result claims success but carries no player id");
            Outcome::Ignored
        }
        ServerMessage::JoinGame { success: false, error, .. } => {
            Outcome::JoinRejected(error.unwrap_or_else(|| "join rejected".to_string()))
        }
        ServerMessage::PlayersMoved { players } => {
            for record in players.into_values() {
                // A move for an id we have never seen means the join
                // broadcast was lost somewhere; insert rather than fail.
                if store.get_player(&record.id).is_none() {
                    debug!("move update introduced unknown player {}", record.id);
                }
                store.upsert_player(record);
            }
            Outcome::StateChanged
        }
        ServerMessage::PlayerJoined { player, avatar } => {
            store.upsert_avatar(avatar);
            store.upsert_player(player);
            Outcome::StateChanged
        }
        ServerMessage::PlayerLeft { player_id } => {
            let was_local = store.local_id() == Some(player_id.as_str());
            store.remove_player(&player_id);
            if was_local {
                Outcome::LocalPlayerRemoved
            } else {
                Outcome::StateChanged
            }
        }
    }
}
