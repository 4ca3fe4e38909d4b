//! HTTP and WebSocket API surface.

pub mod http;
pub mod websocket;
