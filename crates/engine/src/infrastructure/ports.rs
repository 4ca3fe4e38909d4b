// Port types define the full contract - some constructors are for future use
#![allow(dead_code)]

//! Port trait for the reasoning provider (LLM).

use async_trait::async_trait;

/// LLM request: conversation plus generation knobs.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether a retry has any chance of changing the outcome.
    ///
    /// Auth failures and rejected requests stay broken; network hiccups and
    /// garbled payloads may clear up.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(msg) => {
                !msg.contains("400") && !msg.contains("401") && !msg.contains("403")
            }
            Self::InvalidResponse(_) => true,
        }
    }
}

#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Hand-rolled LLM doubles shared by the reasoning, dispatcher, and
    //! simulation tests.

    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Always returns the same canned payload.
    pub struct StaticLlm {
        content: String,
    }

    impl StaticLlm {
        pub fn new(content: impl Into<String>) -> Self {
            Self {
                content: content.into(),
            }
        }
    }

    #[async_trait]
    impl LlmPort for StaticLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                content: self.content.clone(),
            })
        }
    }

    /// Pops scripted payloads in order, erroring once the script runs dry.
    pub struct ScriptedLlm {
        script: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        pub fn new(script: Vec<&str>) -> Self {
            let mut script: Vec<String> = script.into_iter().map(String::from).collect();
            script.reverse();
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            let next = self.script.lock().expect("script lock").pop();
            match next {
                Some(content) => Ok(LlmResponse { content }),
                None => Err(LlmError::RequestFailed("script exhausted".to_string())),
            }
        }
    }

    /// Fails every call, for driving the fallback paths.
    pub struct FailingLlm;

    #[async_trait]
    impl LlmPort for FailingLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Err(LlmError::RequestFailed("provider unavailable".to_string()))
        }
    }

    /// Takes `delay` before answering, for cancellation-in-flight tests.
    pub struct SlowLlm {
        delay: Duration,
        content: String,
    }

    impl SlowLlm {
        pub fn new(delay: Duration, content: impl Into<String>) -> Self {
            Self {
                delay,
                content: content.into(),
            }
        }
    }

    #[async_trait]
    impl LlmPort for SlowLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            tokio::time::sleep(self.delay).await;
            Ok(LlmResponse {
                content: self.content.clone(),
            })
        }
    }
}
