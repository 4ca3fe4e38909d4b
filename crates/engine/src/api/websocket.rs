//! WebSocket handling for game session connections.
//!
//! One connection binds to one session: a dispatcher loop consumes inbound
//! messages in receipt order while a background simulation loop advances NPC
//! behavior. Both feed the same outbound channel, drained by a dedicated
//! send task so each producer's ordering is preserved on the wire.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use redline_domain::{GameSession, NpcAgent, NpcId, PlayerReputation, SessionId};
use redline_protocol::{ClientMessage, ServerMessage};

use crate::app::App;
use crate::reasoning::ReasoningService;
use crate::simulation::{run_npc_simulation, SimulationConfig};
use crate::stores::SessionHandle;

/// Buffer size for the per-connection outbound channel.
const OUTBOUND_CHANNEL_BUFFER: usize = 256;

/// Context handed to an NPC reacting to the player closing in.
const PROXIMITY_CONTEXT: &str = "Player is riding close to you.";

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(app): State<Arc<App>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, app))
}

/// Handle an individual WebSocket connection bound to one session.
async fn handle_socket(mut socket: WebSocket, raw_session_id: String, app: Arc<App>) {
    let session = raw_session_id
        .parse::<Uuid>()
        .ok()
        .map(SessionId::from_uuid)
        .and_then(|id| app.sessions.get(id));
    let Some(session) = session else {
        tracing::warn!(session_id = %raw_session_id, "Rejecting connection for unknown session");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "unknown session".into(),
            })))
            .await;
        return;
    };

    tracing::info!(session_id = %raw_session_id, "WebSocket connection established");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CHANNEL_BUFFER);

    // Forward outbound messages from the channel to the WebSocket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to serialize outbound message"),
            }
        }
    });

    // Exactly one simulation loop per open connection, torn down with it.
    let cancel = CancellationToken::new();
    let sim_task = tokio::spawn(run_npc_simulation(
        session.clone(),
        app.reasoning.clone(),
        tx.clone(),
        cancel.clone(),
        SimulationConfig::default(),
    ));

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => dispatch_client_message(&session, &app.reasoning, &tx, msg).await,
                Err(e) => {
                    tracing::warn!(session_id = %raw_session_id, error = %e, "Failed to parse client message");
                    send(
                        &tx,
                        error_message("PARSE_ERROR", format!("Invalid message format: {e}")),
                    )
                    .await;
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(session_id = %raw_session_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(session_id = %raw_session_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Deterministic teardown: stop the simulation loop and drain the sender
    // before the connection handler completes.
    cancel.cancel();
    let _ = sim_task.await;
    drop(tx);
    let _ = send_task.await;

    tracing::info!(session_id = %raw_session_id, "WebSocket connection terminated");
}

/// Interpret one inbound message and apply its effects.
///
/// Messages are handled strictly in receipt order: effects from message N
/// are visible to message N+1 and to the next simulation tick.
pub(crate) async fn dispatch_client_message(
    session: &SessionHandle,
    reasoning: &ReasoningService,
    outbound: &mpsc::Sender<ServerMessage>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::VoiceInput { text } => {
            handle_voice_input(session, reasoning, outbound, &text).await;
        }
        ClientMessage::ProximityAlert { npc_id } => {
            handle_proximity_alert(session, reasoning, outbound, npc_id).await;
        }
        ClientMessage::CombatEvent {
            npc_id,
            action,
            success,
        } => {
            handle_combat_event(session, reasoning, outbound, npc_id, &action, success).await;
        }
        ClientMessage::Unknown => {
            tracing::warn!("Received unsupported client message type");
            send(
                outbound,
                error_message("UNSUPPORTED_MESSAGE", "This message type is not supported"),
            )
            .await;
        }
    }
}

/// The player spoke: every rider in roster order gets to answer.
async fn handle_voice_input(
    session: &SessionHandle,
    reasoning: &ReasoningService,
    outbound: &mpsc::Sender<ServerMessage>,
    text: &str,
) {
    let npc_ids = { session.read().await.npcs.ids() };
    for npc_id in npc_ids {
        let Some((npc, reputation)) = snapshot_npc(session, &npc_id).await else {
            continue;
        };
        let response = reasoning.respond_to_speech(&npc, &reputation, text).await;
        {
            let mut state = session.write().await;
            if let Some(agent) = state.npcs.get_mut(&npc_id) {
                agent.apply_speech_response(&response);
            }
        }
        send(
            outbound,
            ServerMessage::NpcDialogue {
                npc_id,
                npc_name: Some(npc.name),
                text: response.response,
                emotion: Some(response.emotion),
            },
        )
        .await;
    }
}

/// The player is riding close to one rider: overwrite its mood with a fresh
/// reaction and answer with its dialogue line.
async fn handle_proximity_alert(
    session: &SessionHandle,
    reasoning: &ReasoningService,
    outbound: &mpsc::Sender<ServerMessage>,
    npc_id: NpcId,
) {
    let Some((npc, reputation)) = snapshot_npc(session, &npc_id).await else {
        unknown_npc(outbound, &npc_id).await;
        return;
    };
    let reaction = reasoning.react(&npc, &reputation, PROXIMITY_CONTEXT).await;
    {
        let mut state = session.write().await;
        if let Some(agent) = state.npcs.get_mut(&npc_id) {
            agent.apply_reaction(&reaction);
        }
    }
    send(
        outbound,
        ServerMessage::NpcDialogue {
            npc_id,
            npc_name: Some(npc.name),
            text: reaction.dialogue,
            emotion: Some(reaction.emotion),
        },
    )
    .await;
}

/// The player attacked a rider: record the exchange, then let the rider
/// talk back. The reaction only feeds the dialogue line here; it does not
/// overwrite the agent's state.
async fn handle_combat_event(
    session: &SessionHandle,
    reasoning: &ReasoningService,
    outbound: &mpsc::Sender<ServerMessage>,
    npc_id: NpcId,
    action: &str,
    success: bool,
) {
    let recorded = {
        let mut guard = session.write().await;
        let GameSession {
            npcs, reputation, ..
        } = &mut *guard;
        match npcs.get_mut(&npc_id) {
            Some(agent) => {
                agent.record_combat(action, success, reputation, Utc::now());
                true
            }
            None => false,
        }
    };
    if !recorded {
        unknown_npc(outbound, &npc_id).await;
        return;
    }

    // The reaction prompt sees the fresh memory and the updated reputation.
    let Some((npc, reputation)) = snapshot_npc(session, &npc_id).await else {
        return;
    };
    let reaction = reasoning
        .react(&npc, &reputation, &format!("Player just {action}ed you!"))
        .await;
    send(
        outbound,
        ServerMessage::NpcDialogue {
            npc_id,
            npc_name: None,
            text: reaction.dialogue,
            emotion: None,
        },
    )
    .await;
}

/// Clone an agent and the reputation under a read guard, so provider calls
/// never hold the session lock.
async fn snapshot_npc(
    session: &SessionHandle,
    npc_id: &NpcId,
) -> Option<(NpcAgent, PlayerReputation)> {
    let state = session.read().await;
    let npc = state.npcs.get(npc_id)?.clone();
    Some((npc, state.reputation.clone()))
}

async fn send(outbound: &mpsc::Sender<ServerMessage>, msg: ServerMessage) {
    if outbound.send(msg).await.is_err() {
        tracing::debug!("Outbound channel closed, dropping message");
    }
}

fn error_message(code: &str, message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error {
        code: code.to_string(),
        message: message.into(),
    }
}

async fn unknown_npc(outbound: &mpsc::Sender<ServerMessage>, npc_id: &NpcId) {
    tracing::warn!(npc_id = %npc_id, "Message references unknown NPC");
    send(
        outbound,
        error_message("UNKNOWN_NPC", format!("No NPC with id {npc_id} in this session")),
    )
    .await;
}
