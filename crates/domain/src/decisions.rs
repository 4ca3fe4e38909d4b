//! Structured decisions produced by the reasoning provider.
//!
//! Each decision type pairs with a fixed fallback value. The reasoning
//! adapter substitutes the fallback whenever the provider fails or returns
//! something unparseable, so callers always receive a well-formed decision.

use serde::{Deserialize, Serialize};

/// Racing move an NPC can commit to for the next stretch of road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    Ram,
    Weave,
    Race,
}

/// Movement intent for one NPC: where to steer and how hard to push.
///
/// `target_lane` is nominally in [-4.0, 4.0] and `target_speed` in
/// [0.1, 0.5], but values outside those ranges are applied as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDecision {
    pub action: MoveAction,
    pub target_lane: f32,
    pub target_speed: f32,
}

impl MovementDecision {
    /// Hold the current lane at cruising speed.
    pub fn fallback(current_lane: f32) -> Self {
        Self {
            action: MoveAction::Race,
            target_lane: current_lane,
            target_speed: 0.2,
        }
    }
}

/// An NPC's in-the-moment reaction to something the player did.
///
/// Applying a reaction overwrites the agent's aggression level outright,
/// unlike [`SpeechResponse`] which nudges it by a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcReaction {
    pub emotion: String,
    pub aggression_level: f32,
    pub dialogue: String,
}

impl NpcReaction {
    pub fn fallback() -> Self {
        Self {
            emotion: "annoyed".to_string(),
            aggression_level: 0.5,
            dialogue: "Watch your back, rookie!".to_string(),
        }
    }
}

/// An NPC's reply to something the player said out loud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub response: String,
    pub emotion: String,
    /// Signed nudge to the agent's aggression, nominally in [-0.2, 0.4].
    /// Providers may omit it; a missing value means no change.
    #[serde(default)]
    pub aggression_change: f32,
}

impl SpeechResponse {
    pub fn fallback() -> Self {
        Self {
            response: "Shut up and ride!".to_string(),
            emotion: "angry".to_string(),
            aggression_change: 0.1,
        }
    }
}

/// Category of dynamic world event injected by the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldEventKind {
    RivalAmbush,
    PoliceCheckpoint,
    GangInvite,
}

/// Gameplay impact attached to a world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEventImpact {
    pub heat_increase: f32,
    pub dialogue: String,
}

/// A dynamic world event shaped by the player's reputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub event_type: WorldEventKind,
    pub title: String,
    pub description: String,
    pub impact: WorldEventImpact,
}

impl WorldEvent {
    pub fn fallback() -> Self {
        Self {
            event_type: WorldEventKind::PoliceCheckpoint,
            title: "Routine Inspection".to_string(),
            description: "The cops are looking for someone matching your description.".to_string(),
            impact: WorldEventImpact {
                heat_increase: 0.1,
                dialogue: "Pull over!".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_fallback_holds_current_lane() {
        let decision = MovementDecision::fallback(-2.0);
        assert_eq!(decision.action, MoveAction::Race);
        assert_eq!(decision.target_lane, -2.0);
        assert_eq!(decision.target_speed, 0.2);
    }

    #[test]
    fn move_action_uses_snake_case_tags() {
        assert_eq!(
            serde_json::to_string(&MoveAction::Ram).expect("serialize"),
            "\"ram\""
        );
        let parsed: MoveAction = serde_json::from_str("\"weave\"").expect("parse");
        assert_eq!(parsed, MoveAction::Weave);
    }

    #[test]
    fn speech_response_defaults_missing_aggression_change_to_zero() {
        let parsed: SpeechResponse =
            serde_json::from_str(r#"{"response": "Later.", "emotion": "bored"}"#).expect("parse");
        assert_eq!(parsed.aggression_change, 0.0);
    }

    #[test]
    fn world_event_fallback_is_a_checkpoint() {
        let event = WorldEvent::fallback();
        assert_eq!(event.event_type, WorldEventKind::PoliceCheckpoint);
        assert_eq!(event.impact.heat_increase, 0.1);
    }
}
