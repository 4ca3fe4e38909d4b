//! Game session - one player's isolated slice of world state.

use crate::ids::{NpcId, RaceId, SessionId};
use crate::npc::NpcAgent;
use crate::reputation::PlayerReputation;

/// Insertion-ordered collection of NPC agents with unique, stable ids.
///
/// Roster order matters: dispatcher fan-outs and simulation rounds visit
/// agents in the order they were added at session init.
#[derive(Debug, Clone, Default)]
pub struct NpcRoster {
    agents: Vec<NpcAgent>,
}

impl NpcRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent. Returns `false` (and leaves the roster untouched) when
    /// the id is already taken.
    pub fn insert(&mut self, agent: NpcAgent) -> bool {
        if self.contains(&agent.id) {
            return false;
        }
        self.agents.push(agent);
        true
    }

    pub fn contains(&self, id: &NpcId) -> bool {
        self.agents.iter().any(|a| &a.id == id)
    }

    pub fn get(&self, id: &NpcId) -> Option<&NpcAgent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn get_mut(&mut self, id: &NpcId) -> Option<&mut NpcAgent> {
        self.agents.iter_mut().find(|a| &a.id == id)
    }

    /// Agent ids in roster order.
    pub fn ids(&self) -> Vec<NpcId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NpcAgent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Per-session world state: the player's reputation plus the NPC roster.
///
/// Lives in the session store for the process lifetime. The WebSocket
/// dispatcher and the simulation loop are the only writers, and both go
/// through the store's per-session lock.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub player_id: String,
    pub reputation: PlayerReputation,
    pub npcs: NpcRoster,
    pub current_race_id: Option<RaceId>,
}

impl GameSession {
    pub fn new(id: SessionId, player_id: impl Into<String>) -> Self {
        Self {
            id,
            player_id: player_id.into(),
            reputation: PlayerReputation::default(),
            npcs: NpcRoster::new(),
            current_race_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::PersonalityTrait;

    fn agent(id: &str) -> NpcAgent {
        NpcAgent::new(id, id.to_uppercase(), vec![PersonalityTrait::Aggressive])
    }

    #[test]
    fn roster_preserves_insertion_order() {
        let mut roster = NpcRoster::new();
        assert!(roster.insert(agent("rider_2")));
        assert!(roster.insert(agent("rider_1")));
        assert!(roster.insert(agent("rider_3")));

        let ids: Vec<String> = roster.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["rider_2", "rider_1", "rider_3"]);
    }

    #[test]
    fn roster_rejects_duplicate_ids() {
        let mut roster = NpcRoster::new();
        assert!(roster.insert(agent("rider_1")));
        assert!(!roster.insert(agent("rider_1")));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn roster_lookup_by_id() {
        let mut roster = NpcRoster::new();
        roster.insert(agent("rider_1"));
        roster.insert(agent("rider_2"));

        assert_eq!(roster.get(&"rider_2".into()).map(|a| a.name.as_str()), Some("RIDER_2"));
        assert!(roster.get(&"rider_9".into()).is_none());

        let rider = roster.get_mut(&"rider_1".into()).expect("rider_1 present");
        rider.aggression_level = 0.8;
        assert_eq!(
            roster.get(&"rider_1".into()).map(|a| a.aggression_level),
            Some(0.8)
        );
    }

    #[test]
    fn new_session_has_empty_state() {
        let session = GameSession::new(SessionId::new(), "player_one");
        assert_eq!(session.player_id, "player_one");
        assert_eq!(session.reputation, PlayerReputation::default());
        assert!(session.npcs.is_empty());
        assert!(session.current_race_id.is_none());
    }
}
