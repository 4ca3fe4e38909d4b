//! WebSocket message types for the game session connection.
//!
//! Inbound messages come from the client one JSON object at a time; outbound
//! messages are produced by the event dispatcher and the NPC simulation loop.
//! Unknown inbound variants deserialize to `Unknown` so newer clients do not
//! break older engines.

use serde::{Deserialize, Serialize};

use redline_domain::{NpcId, WorldEvent};

// =============================================================================
// Client Messages (client -> engine)
// =============================================================================

/// Messages from the game client to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The player said something over voice chat.
    VoiceInput { text: String },
    /// The player is riding close to an NPC.
    ProximityAlert { npc_id: NpcId },
    /// The player attacked an NPC.
    CombatEvent {
        npc_id: NpcId,
        action: String,
        #[serde(default)]
        success: bool,
    },
    /// Forward compatibility: any unrecognized `type` tag.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (engine -> client)
// =============================================================================

/// Messages from the engine to the game client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// An NPC committed to a new movement target.
    NpcMove {
        npc_id: NpcId,
        target_lane: f32,
        speed: f32,
    },
    /// A dynamic world event fired.
    WorldEvent { event: WorldEvent },
    /// An NPC spoke to the player.
    NpcDialogue {
        npc_id: NpcId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        npc_name: Option<String>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emotion: Option<String>,
    },
    /// The engine rejected or could not interpret an inbound message.
    Error { code: String, message: String },
}
