//! Infrastructure: external service clients and their port traits.

pub mod ollama;
pub mod ports;
pub mod resilient_llm;
