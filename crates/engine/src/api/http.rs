//! HTTP routes: session bootstrap.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::app::App;

pub fn routes() -> Router<Arc<App>> {
    Router::new().route("/session/new", get(create_session))
}

/// Allocate a fresh session and hand its id to the client. The client then
/// opens the WebSocket scoped to that id.
async fn create_session(State(app): State<Arc<App>>) -> Json<serde_json::Value> {
    let session_id = app.sessions.create();
    Json(serde_json::json!({ "session_id": session_id }))
}
