//! Per-connection NPC simulation loop.
//!
//! One loop runs per open WebSocket connection. Each round it asks the
//! reasoning service for a movement decision per roster agent and emits
//! `npc_move`, then rolls for a dynamic world event. Fallback decisions
//! satisfy the round contract, so the loop never stalls on provider trouble,
//! and one agent's degraded decision never skips the rest of the roster.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use redline_protocol::ServerMessage;

use crate::reasoning::ReasoningService;
use crate::stores::SessionHandle;

/// Player lane fed to movement queries. The client does not stream the
/// player's pose yet, so the loop assumes the center lane.
const PLAYER_LANE: f32 = 0.0;

/// Event tags handed to the world-event query.
const RECENT_EVENTS: &[&str] = &["race_ongoing"];

/// Tunables for the simulation loop.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Time between decision rounds.
    pub tick: Duration,
    /// Probability of injecting a world event after each round.
    pub world_event_chance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(2),
            world_event_chance: 0.1,
        }
    }
}

/// Drive NPC behavior for one connection until cancelled.
///
/// The session lock is never held across a provider await, and the token is
/// re-checked after every await so an in-flight result is discarded rather
/// than sent once cancellation begins.
pub async fn run_npc_simulation(
    session: SessionHandle,
    reasoning: Arc<ReasoningService>,
    outbound: mpsc::Sender<ServerMessage>,
    cancel: CancellationToken,
    config: SimulationConfig,
) {
    let mut ticker = tokio::time::interval(config.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The interval fires immediately; the first round should wait a full tick.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let npc_ids = { session.read().await.npcs.ids() };
        for npc_id in npc_ids {
            let npc = { session.read().await.npcs.get(&npc_id).cloned() };
            let Some(npc) = npc else {
                continue;
            };

            let decision = reasoning.plan_movement(&npc, PLAYER_LANE).await;
            if cancel.is_cancelled() {
                return;
            }

            {
                let mut state = session.write().await;
                if let Some(agent) = state.npcs.get_mut(&npc_id) {
                    agent.apply_movement(&decision);
                }
            }

            let msg = ServerMessage::NpcMove {
                npc_id,
                target_lane: decision.target_lane,
                speed: decision.target_speed,
            };
            if outbound.send(msg).await.is_err() {
                return;
            }
        }

        if rand::thread_rng().gen_bool(config.world_event_chance) {
            let reputation = { session.read().await.reputation.clone() };
            let event = reasoning.world_event(&reputation, RECENT_EVENTS).await;
            if cancel.is_cancelled() {
                return;
            }
            if outbound
                .send(ServerMessage::WorldEvent { event })
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::testing::{FailingLlm, ScriptedLlm, SlowLlm};
    use crate::infrastructure::ports::LlmPort;
    use crate::stores::SessionStore;

    fn setup(llm: impl LlmPort + 'static) -> (SessionHandle, Arc<ReasoningService>) {
        let store = SessionStore::new();
        let id = store.create();
        let session = store.get(id).expect("session present");
        (session, Arc::new(ReasoningService::new(Arc::new(llm))))
    }

    fn fast_config(world_event_chance: f64) -> SimulationConfig {
        SimulationConfig {
            tick: Duration::from_millis(10),
            world_event_chance,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn round_emits_npc_move_per_agent_in_roster_order() {
        let (session, reasoning) = setup(ScriptedLlm::new(vec![
            r#"{"action": "ram", "target_lane": -1.0, "target_speed": 0.5}"#,
            r#"{"action": "weave", "target_lane": 3.0, "target_speed": 0.3}"#,
            r#"{"action": "race", "target_lane": 0.0, "target_speed": 0.4}"#,
        ]));
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_npc_simulation(
            session.clone(),
            reasoning,
            tx,
            cancel.clone(),
            fast_config(0.0),
        ));

        let mut moves = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.expect("message") {
                ServerMessage::NpcMove {
                    npc_id,
                    target_lane,
                    ..
                } => moves.push((npc_id.to_string(), target_lane)),
                other => panic!("unexpected message: {other:?}"),
            }
        }
        cancel.cancel();
        task.await.expect("simulation task");

        assert_eq!(
            moves,
            vec![
                ("rider_1".to_string(), -1.0),
                ("rider_2".to_string(), 3.0),
                ("rider_3".to_string(), 0.0),
            ]
        );

        // Decisions were applied to the shared state before being announced.
        let state = session.read().await;
        let axel = state.npcs.get(&"rider_1".into()).expect("rider_1");
        assert_eq!(axel.target_lane, -1.0);
        assert_eq!(axel.speed, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_provider_still_moves_every_agent() {
        let (session, reasoning) = setup(FailingLlm);
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_npc_simulation(
            session.clone(),
            reasoning,
            tx,
            cancel.clone(),
            fast_config(0.0),
        ));

        // Fallback decisions hold each rider's current lane at cruising speed.
        let mut lanes = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.expect("message") {
                ServerMessage::NpcMove {
                    target_lane, speed, ..
                } => {
                    lanes.push(target_lane);
                    assert_eq!(speed, 0.2);
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
        cancel.cancel();
        task.await.expect("simulation task");

        assert_eq!(lanes, vec![-2.0, 2.0, 0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn world_event_follows_the_roster_round() {
        let (session, reasoning) = setup(FailingLlm);
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_npc_simulation(
            session,
            reasoning,
            tx,
            cancel.clone(),
            fast_config(1.0),
        ));

        for _ in 0..3 {
            assert!(matches!(
                rx.recv().await.expect("message"),
                ServerMessage::NpcMove { .. }
            ));
        }
        match rx.recv().await.expect("message") {
            ServerMessage::WorldEvent { event } => {
                assert_eq!(event.title, "Routine Inspection");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        cancel.cancel();
        task.await.expect("simulation task");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_after_cancellation_even_with_a_call_in_flight() {
        let (session, reasoning) = setup(SlowLlm::new(
            Duration::from_millis(500),
            r#"{"action": "ram", "target_lane": 0.0, "target_speed": 0.5}"#,
        ));
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_npc_simulation(
            session,
            reasoning,
            tx,
            cancel.clone(),
            SimulationConfig {
                tick: Duration::from_millis(1),
                world_event_chance: 0.0,
            },
        ));

        // Let the first round start its (slow) provider call, then cancel
        // while it is in flight.
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        task.await.expect("simulation task");

        // The in-flight result was discarded, not sent.
        assert!(rx.recv().await.is_none());
    }
}
