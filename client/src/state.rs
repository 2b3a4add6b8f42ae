use shared::{AvatarDefinition, PlayerId, PlayerRecord};
use std::collections::HashMap;

/// Locally-known authoritative state: every player the server has told us
/// about and every avatar definition needed to draw them.
///
/// All mutation happens on the game-loop thread through these entry points;
/// readers never hold copies that could drift.
#[derive(Debug, Default)]
pub struct StateStore {
    players: HashMap<PlayerId, PlayerRecord>,
    avatars: HashMap<String, AvatarDefinition>,
    local_id: Option<PlayerId>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or fully replaces the player with the record's id.
    pub fn upsert_player(&mut self, record: PlayerRecord) {
        self.players.insert(record.id.clone(), record);
    }

    /// Deletes a player. Absent ids are a no-op: a departure can race with a
    /// just-processed move for the same player.
    pub fn remove_player(&mut self, id: &str) {
        self.players.remove(id);
    }

    pub fn upsert_avatar(&mut self, definition: AvatarDefinition) {
        self.avatars.insert(definition.name.clone(), definition);
    }

    pub fn get_player(&self, id: &str) -> Option<&PlayerRecord> {
        self.players.get(id)
    }

    /// Unordered snapshot of all known players. Iteration order is not a
    /// correctness property.
    pub fn all_players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get_avatar(&self, name: &str) -> Option<&AvatarDefinition> {
        self.avatars.get(name)
    }

    pub fn all_avatars(&self) -> impl Iterator<Item = &AvatarDefinition> {
        self.avatars.values()
    }

    pub fn set_local_id(&mut self, id: PlayerId) {
        self.local_id = Some(id);
    }

    pub fn clear_local_id(&mut self) {
        self.local_id = None;
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    /// The player this client controls, if joined and still present.
    pub fn local_player(&self) -> Option<&PlayerRecord> {
        self.players.get(self.local_id.as_ref()?)
    }

    /// Bulk-load at join time, replacing whatever was known before. Records
    /// are re-keyed by their own identity so a malformed map key cannot split
    /// a player across two entries.
    pub fn reset_world(
        &mut self,
        players: HashMap<PlayerId, PlayerRecord>,
        avatars: HashMap<String, AvatarDefinition>,
    ) {
        self.players = players
            .into_values()
            .map(|record| (record.id.clone(), record))
            .collect();
        self.avatars = avatars
            .into_values()
            .map(|definition| (definition.name.clone(), definition))
            .collect();
    }
}
