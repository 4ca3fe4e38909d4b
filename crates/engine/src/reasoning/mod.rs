//! The reasoning provider adapter: situational queries in, structured
//! decisions out.
//!
//! Failure policy: any provider failure (transport error, timeout, fenced or
//! malformed JSON, wrong shape) is absorbed here and replaced by the query's
//! fixed fallback value. Callers never see an error and never branch on one.

mod prompts;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use redline_domain::{
    MovementDecision, NpcAgent, NpcReaction, PlayerReputation, SpeechResponse, WorldEvent,
};

use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};

/// Sampling temperature for dialogue-flavored queries.
const DIALOGUE_TEMPERATURE: f32 = 0.7;

/// Converts situational queries into structured behavioral decisions.
pub struct ReasoningService {
    llm: Arc<dyn LlmPort>,
}

impl ReasoningService {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// How the NPC reacts to something the player just did.
    pub async fn react(
        &self,
        npc: &NpcAgent,
        reputation: &PlayerReputation,
        context: &str,
    ) -> NpcReaction {
        let request = LlmRequest::new(vec![ChatMessage::user(prompts::reaction(
            npc, reputation, context,
        ))])
        .with_system_prompt(prompts::JSON_SYSTEM_PROMPT)
        .with_temperature(DIALOGUE_TEMPERATURE);

        self.query("reaction", request)
            .await
            .unwrap_or_else(NpcReaction::fallback)
    }

    /// How the NPC answers something the player said out loud.
    pub async fn respond_to_speech(
        &self,
        npc: &NpcAgent,
        reputation: &PlayerReputation,
        speech: &str,
    ) -> SpeechResponse {
        let request = LlmRequest::new(vec![ChatMessage::user(prompts::speech_response(
            npc, reputation, speech,
        ))])
        .with_system_prompt(prompts::JSON_SYSTEM_PROMPT)
        .with_temperature(DIALOGUE_TEMPERATURE);

        self.query("speech_response", request)
            .await
            .unwrap_or_else(SpeechResponse::fallback)
    }

    /// The NPC's next racing move.
    pub async fn plan_movement(&self, npc: &NpcAgent, player_lane: f32) -> MovementDecision {
        let request = LlmRequest::new(vec![ChatMessage::user(prompts::movement(npc, player_lane))])
            .with_system_prompt(prompts::JSON_SYSTEM_PROMPT);

        self.query("movement", request)
            .await
            .unwrap_or_else(|| MovementDecision::fallback(npc.lane))
    }

    /// A dynamic world event shaped by the player's reputation.
    pub async fn world_event(
        &self,
        reputation: &PlayerReputation,
        recent_events: &[&str],
    ) -> WorldEvent {
        let request = LlmRequest::new(vec![ChatMessage::user(prompts::world_event(
            reputation,
            recent_events,
        ))])
        .with_system_prompt(prompts::JSON_SYSTEM_PROMPT)
        .with_temperature(DIALOGUE_TEMPERATURE);

        self.query("world_event", request)
            .await
            .unwrap_or_else(WorldEvent::fallback)
    }

    /// Run one query; `None` means the caller should use its fallback.
    async fn query<T: DeserializeOwned>(&self, kind: &'static str, request: LlmRequest) -> Option<T> {
        let response = match self.llm.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(query = kind, error = %e, "Reasoning provider failed, using fallback");
                return None;
            }
        };

        match parse_decision(&response.content) {
            Ok(decision) => Some(decision),
            Err(e) => {
                tracing::warn!(
                    query = kind,
                    error = %e,
                    content = %response.content,
                    "Unparseable reasoning payload, using fallback"
                );
                None
            }
        }
    }
}

/// Parse a provider payload into a decision, tolerating Markdown code fences
/// and prose around the JSON object.
fn parse_decision<T: DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(extract_json_object(strip_code_fences(content)))
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Narrow to the outermost `{...}` span, if any.
fn extract_json_object(content: &str) -> &str {
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => content,
    }
}
