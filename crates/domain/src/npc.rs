//! NPC agents - rival riders with behavioral state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decisions::{MovementDecision, NpcReaction, SpeechResponse};
use crate::ids::NpcId;
use crate::memory::MemoryEntry;
use crate::reputation::{PlayerReputation, ReputationField};

/// Reputation gained by the player for any combat exchange.
pub const COMBAT_BRUTALITY_DELTA: f32 = 0.1;

/// Extra police heat for attacking an agent whose leading trait is lawful.
pub const LAWFUL_HEAT_DELTA: f32 = 0.2;

/// Retention cap on an agent's memory log; the oldest entry is evicted once
/// the cap is reached.
pub const MAX_MEMORIES: usize = 100;

/// Personality tags that steer an agent's reasoning prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Aggressive,
    Coward,
    Strategic,
    Lawful,
}

impl fmt::Display for PersonalityTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Aggressive => "aggressive",
            Self::Coward => "coward",
            Self::Strategic => "strategic",
            Self::Lawful => "lawful",
        };
        f.write_str(tag)
    }
}

/// A rival rider in one player's session.
///
/// Created with the session's fixed roster and destroyed with the session.
/// The simulation loop drives lane/speed/target, the event dispatcher drives
/// aggression, memories, and combat bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcAgent {
    pub id: NpcId,
    pub name: String,
    /// Non-empty, ordered: the FIRST trait is the agent's primary trait and
    /// gates trait-specific rules such as lawful heat.
    pub personality: Vec<PersonalityTrait>,
    pub memories: Vec<MemoryEntry>,
    pub health: f32,
    /// Nominally in [0, 1] but not hard-clamped; speech responses can drift
    /// it outside the range.
    pub aggression_level: f32,
    pub lane: f32,
    pub z_pos: f32,
    pub target_lane: f32,
    pub speed: f32,
}

impl NpcAgent {
    pub fn new(id: impl Into<NpcId>, name: impl Into<String>, personality: Vec<PersonalityTrait>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            personality,
            memories: Vec::new(),
            health: 100.0,
            aggression_level: 0.5,
            lane: 0.0,
            z_pos: -20.0,
            target_lane: 0.0,
            speed: 0.2,
        }
    }

    /// Set the starting pose on the road.
    pub fn with_pose(mut self, lane: f32, z_pos: f32) -> Self {
        self.lane = lane;
        self.z_pos = z_pos;
        self
    }

    /// The trait that leads the personality list, if any.
    pub fn primary_trait(&self) -> Option<PersonalityTrait> {
        self.personality.first().copied()
    }

    /// Append a memory, evicting the oldest entry past the retention cap.
    pub fn remember(&mut self, entry: MemoryEntry) {
        if self.memories.len() == MAX_MEMORIES {
            self.memories.remove(0);
        }
        self.memories.push(entry);
    }

    /// The most recent `count` memories, oldest first.
    pub fn recent_memories(&self, count: usize) -> &[MemoryEntry] {
        let start = self.memories.len().saturating_sub(count);
        &self.memories[start..]
    }

    /// Commit to a movement decision: steer toward the lane, adopt the speed.
    pub fn apply_movement(&mut self, decision: &MovementDecision) {
        self.target_lane = decision.target_lane;
        self.speed = decision.target_speed;
    }

    /// Take on a reaction, overwriting the current aggression level.
    pub fn apply_reaction(&mut self, reaction: &NpcReaction) {
        self.aggression_level = reaction.aggression_level;
    }

    /// Take on a speech response, shifting aggression by its signed delta.
    pub fn apply_speech_response(&mut self, response: &SpeechResponse) {
        self.aggression_level += response.aggression_change;
    }

    /// Record a combat exchange initiated by the player.
    ///
    /// Appends a memory of the attack and raises the player's brutality.
    /// Only an agent whose primary trait is lawful raises police heat.
    pub fn record_combat(
        &mut self,
        action: &str,
        success: bool,
        reputation: &mut PlayerReputation,
        now: DateTime<Utc>,
    ) {
        let emotion = if success { "angry" } else { "mocking" };
        let outcome = if success { "succeeded" } else { "failed" };
        self.remember(MemoryEntry::new(
            format!("player_{action}"),
            "highway",
            emotion,
            format!("Player attempted to {action} me and {outcome}."),
            now,
        ));

        reputation.adjust(ReputationField::Brutality, COMBAT_BRUTALITY_DELTA);
        if self.primary_trait() == Some(PersonalityTrait::Lawful) {
            reputation.adjust(ReputationField::PoliceHeat, LAWFUL_HEAT_DELTA);
        }
    }
}
