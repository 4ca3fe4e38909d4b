//! Session storage - the process-scoped map of live game sessions.
//!
//! Insert and lookup only; sessions live until the process ends. Each
//! session sits behind its own `RwLock` so the event dispatcher and the
//! simulation loop serialize their writes without blocking other sessions.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use redline_domain::{GameSession, NpcAgent, PersonalityTrait, SessionId};

/// Shared handle to one session's state.
pub type SessionHandle = Arc<RwLock<GameSession>>;

/// Single-player sessions carry a fixed player identity for now.
const PLAYER_ID: &str = "player_one";

/// Process-wide session store.
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a session with the fixed starting roster and zero reputation.
    pub fn create(&self) -> SessionId {
        let id = SessionId::new();
        let mut session = GameSession::new(id, PLAYER_ID);
        for agent in starting_roster() {
            let inserted = session.npcs.insert(agent);
            debug_assert!(inserted, "starting roster ids must be unique");
        }

        self.sessions.insert(id, Arc::new(RwLock::new(session)));
        tracing::info!(session_id = %id, "Session created");
        id
    }

    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.get(&id).map(|entry| entry.clone())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The three rival riders every session starts with.
fn starting_roster() -> Vec<NpcAgent> {
    vec![
        NpcAgent::new("rider_1", "Axel", vec![PersonalityTrait::Aggressive]).with_pose(-2.0, -20.0),
        NpcAgent::new("rider_2", "Tasha", vec![PersonalityTrait::Strategic]).with_pose(2.0, -40.0),
        NpcAgent::new("rider_3", "Officer Miller", vec![PersonalityTrait::Lawful])
            .with_pose(0.0, -60.0),
    ]
}
