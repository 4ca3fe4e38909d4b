//! Prompt builders for the four reasoning queries.

use redline_domain::{NpcAgent, PlayerReputation};

/// Shared system prompt: every query expects a bare JSON object back.
pub(crate) const JSON_SYSTEM_PROMPT: &str =
    "You are the NPC brain for the motorcycle combat racing game \"Redline\". \
     Always respond with a single JSON object and nothing else.";

fn personality_tags(npc: &NpcAgent) -> String {
    npc.personality
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn memories_json(npc: &NpcAgent, count: usize) -> String {
    serde_json::to_string(npc.recent_memories(count)).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn reaction(npc: &NpcAgent, reputation: &PlayerReputation, context: &str) -> String {
    format!(
        "You are an NPC rider in a high-stakes motorcycle combat race.\n\
         \n\
         NPC Profile:\n\
         - Name: {name}\n\
         - Personality: {personality}\n\
         - Past Memories: {memories}\n\
         \n\
         Player Reputation:\n\
         - Brutality: {brutality}\n\
         - Honor: {honor}\n\
         - Notoriety: {notoriety}\n\
         \n\
         Current Context: {context}\n\
         \n\
         Tasks:\n\
         1. Decide your internal state (emotion, aggression level).\n\
         2. Generate a short, punchy dialogue line (max 15 words) to say to the player.\n\
         \n\
         Output in JSON format:\n\
         {{\"emotion\": \"string\", \"aggression_level\": 0.0 to 1.0, \"dialogue\": \"string\"}}",
        name = npc.name,
        personality = personality_tags(npc),
        memories = memories_json(npc, 5),
        brutality = reputation.brutality,
        honor = reputation.honor,
        notoriety = reputation.notoriety,
    )
}

pub(crate) fn speech_response(
    npc: &NpcAgent,
    reputation: &PlayerReputation,
    speech: &str,
) -> String {
    format!(
        "You are {name}, a rival rider in a motorcycle combat race.\n\
         The player just said: \"{speech}\"\n\
         \n\
         Personality: {personality}\n\
         Memories: {memories}\n\
         Reputation: Brutality={brutality}, Honor={honor}\n\
         \n\
         Respond to the player's speech. Be in character.\n\
         Output in JSON:\n\
         {{\"response\": \"string\", \"emotion\": \"string\", \"aggression_change\": -0.2 to 0.4}}",
        name = npc.name,
        personality = personality_tags(npc),
        memories = memories_json(npc, 3),
        brutality = reputation.brutality,
        honor = reputation.honor,
    )
}

pub(crate) fn movement(npc: &NpcAgent, player_lane: f32) -> String {
    format!(
        "Decide the next racing move for {name}.\n\
         Current Lane: {lane}\n\
         Player Lane: {player_lane}\n\
         Aggression: {aggression}\n\
         \n\
         Options:\n\
         - \"ram\": Try to hit the player if close.\n\
         - \"weave\": Avoid the player.\n\
         - \"race\": Focus on speed.\n\
         \n\
         Output in JSON:\n\
         {{\"action\": \"ram | weave | race\", \"target_lane\": -4.0 to 4.0, \"target_speed\": 0.1 to 0.5}}",
        name = npc.name,
        lane = npc.lane,
        aggression = npc.aggression_level,
    )
}

pub(crate) fn world_event(reputation: &PlayerReputation, recent_events: &[&str]) -> String {
    format!(
        "Generate a dynamic world event for a motorcycle combat race based on the player's history.\n\
         \n\
         Player Reputation:\n\
         - Brutality: {brutality}\n\
         - Notoriety: {notoriety}\n\
         - Police Heat: {police_heat}\n\
         \n\
         Recent History: {history}\n\
         \n\
         Output in JSON format:\n\
         {{\"event_type\": \"rival_ambush | police_checkpoint | gang_invite\", \"title\": \"string\", \
         \"description\": \"string\", \"impact\": {{\"heat_increase\": 0.0 to 1.0, \"dialogue\": \"string\"}}}}",
        brutality = reputation.brutality,
        notoriety = reputation.notoriety,
        police_heat = reputation.police_heat,
        history = recent_events.join(", "),
    )
}
