//! Redline Protocol - shared types for engine/client communication.
//!
//! Pure data types and serialization, no business logic. Both message enums
//! are internally tagged on `type` with snake_case tags, matching the JSON
//! the game client speaks.

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
