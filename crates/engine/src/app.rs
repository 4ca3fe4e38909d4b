//! Application state shared across handlers.

use std::sync::Arc;

use crate::infrastructure::ports::LlmPort;
use crate::reasoning::ReasoningService;
use crate::stores::SessionStore;

/// Process-wide application state: the session store plus the reasoning
/// service every connection shares.
pub struct App {
    pub sessions: SessionStore,
    pub reasoning: Arc<ReasoningService>,
}

impl App {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            sessions: SessionStore::new(),
            reasoning: Arc::new(ReasoningService::new(llm)),
        }
    }
}
