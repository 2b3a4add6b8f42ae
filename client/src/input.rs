//! Movement-key tracking and intent emission.

use macroquad::prelude::KeyCode;
use shared::Direction;

/// A local movement decision bound for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Stop,
}

/// Every key the controller recognizes; the game loop samples edge events
/// for exactly this set.
pub const MOVEMENT_KEYS: [KeyCode; 8] = [
    KeyCode::W,
    KeyCode::A,
    KeyCode::S,
    KeyCode::D,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
];

pub fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::W | KeyCode::Up => Some(Direction::Up),
        KeyCode::S | KeyCode::Down => Some(Direction::Down),
        KeyCode::A | KeyCode::Left => Some(Direction::Left),
        KeyCode::D | KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Tracks the set of held movement keys and emits intents only on
/// idle-to-moving, moving-to-idle, and direction-change transitions, which
/// bounds outbound message volume to state changes.
///
/// Tie-break when several keys are held: the most recently pressed key's
/// direction wins. Releasing a key that is not the last one held emits
/// nothing and leaves the current direction untouched; the server keeps the
/// player moving until the final release produces a stop.
#[derive(Debug, Default)]
pub struct InputController {
    held: Vec<KeyCode>,
    active: Option<Direction>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a key-down edge. Unrecognized keys and repeats of an
    /// already-held key are ignored.
    pub fn key_down(&mut self, key: KeyCode) -> Option<Intent> {
        let direction = direction_for(key)?;
        if self.held.contains(&key) {
            return None;
        }
        self.held.push(key);

        if self.active != Some(direction) {
            self.active = Some(direction);
            Some(Intent::Move(direction))
        } else {
            None
        }
    }

    /// Handles a key-up edge. A stop is emitted only when the held set
    /// becomes empty.
    pub fn key_up(&mut self, key: KeyCode) -> Option<Intent> {
        direction_for(key)?;
        let before = self.held.len();
        self.held.retain(|held| *held != key);
        if self.held.len() == before {
            return None;
        }

        if self.held.is_empty() {
            self.active = None;
            Some(Intent::Stop)
        } else {
            None
        }
    }

    pub fn is_moving(&self) -> bool {
        !self.held.is_empty()
    }
}
