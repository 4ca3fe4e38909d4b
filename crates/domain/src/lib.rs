//! Redline Domain - core types for the session server.
//!
//! Pure data and invariants: no I/O, no async, no transport concerns.
//! The engine crate drives these types from the WebSocket dispatcher and
//! the per-session simulation loop.

pub mod decisions;
pub mod ids;
pub mod memory;
pub mod npc;
pub mod reputation;
pub mod session;

pub use decisions::{
    MoveAction, MovementDecision, NpcReaction, SpeechResponse, WorldEvent, WorldEventImpact,
    WorldEventKind,
};
pub use ids::{NpcId, RaceId, SessionId};
pub use memory::MemoryEntry;
pub use npc::{NpcAgent, PersonalityTrait};
pub use reputation::{PlayerReputation, ReputationField};
pub use session::{GameSession, NpcRoster};
