use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WORLD_WIDTH: f32 = 2048.0;
pub const WORLD_HEIGHT: f32 = 2048.0;
pub const AVATAR_SIZE: f32 = 64.0;

pub type PlayerId = String;

/// Movement direction carried by outbound `move` intents.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which way a player is looking; selects the avatar frame sequence.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::South
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub username: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub facing: Facing,
    #[serde(rename = "animationFrame", default)]
    pub animation_frame: u32,
    pub avatar: String,
}

impl PlayerRecord {
    pub fn new(id: &str, username: &str, x: f32, y: f32, avatar: &str) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            x,
            y,
            facing: Facing::default(),
            animation_frame: 0,
            avatar: avatar.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AvatarDefinition {
    pub name: String,
    pub frames: HashMap<Facing, Vec<String>>,
}

impl AvatarDefinition {
    /// Frame sequence for a facing, or `None` when the definition has no
    /// usable frames for it. An empty sequence counts as unusable so callers
    /// never index into it.
    pub fn frames_for(&self, facing: Facing) -> Option<&[String]> {
        match self.frames.get(&facing) {
            Some(frames) if !frames.is_empty() => Some(frames.as_slice()),
            _ => None,
        }
    }
}

/// Messages this client sends, tagged by the `action` field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame { username: String },
    Move { direction: Direction },
    Stop,
}

/// Messages the server pushes, tagged by the `action` field.
///
/// `JoinGame` doubles as the join result: the server answers the outbound
/// `join_game` request under the same tag.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    JoinGame {
        success: bool,
        #[serde(rename = "playerId")]
        player_id: Option<PlayerId>,
        players: Option<HashMap<PlayerId, PlayerRecord>>,
        avatars: Option<HashMap<String, AvatarDefinition>>,
        error: Option<String>,
    },
    PlayersMoved {
        players: HashMap<PlayerId, PlayerRecord>,
    },
    PlayerJoined {
        player: PlayerRecord,
        avatar: AvatarDefinition,
    },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
}
