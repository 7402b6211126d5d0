//! The engine actor under tokio.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use futures::future::{BoxFuture, FutureExt};
use tragedy_looper::cards::{AbilityId, CardConfig};
use tragedy_looper::core::{
    CharacterId, EngineConfig, GameState, Location, PhaseTimeouts, Player, PlayerAction, PlayerRole, Stat,
};
use tragedy_looper::effects::{Effect, TargetSelector};
use tragedy_looper::engine::{ActionRequest, AiError, Engine, EngineError, EngineLoop, RandomActionGenerator};
use tragedy_looper::events::{EventHandlers, EventKind, EventManager, EventType, GameEvent};
use tragedy_looper::rules::{PhaseKind, Winner};
use tragedy_looper::view::HIDDEN_ROLE;
use tragedy_looper::ActionGenerator;

fn unstarted(config: EngineConfig) -> Engine {
    init_tracing();
    Engine::new(Arc::new(script(1, 2)), players(), config).unwrap()
}

/// Queries see every message queued before them.
#[tokio::test]
async fn test_queries_are_ordered_after_actions() {
    let (actor, handle, _events) = EngineLoop::new(unstarted(quiet()), None);
    let join = actor.spawn();

    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::MastermindCardPlay);
    handle.submit_action(MM, PlayerAction::PassTurn).unwrap();
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::ProtagonistCardPlay);

    let view = handle.player_view(P1).await.unwrap().expect("seated player");
    assert_eq!(view.viewer, P1);
    assert_eq!(view.phase, PhaseKind::ProtagonistCardPlay);
    assert!(view.characters.iter().all(|c| c.role == HIDDEN_ROLE));
    assert!(handle.player_view(P2).await.unwrap().is_none());

    drop(handle);
    let engine = join.await.unwrap();
    assert_eq!(engine.current_phase(), PhaseKind::ProtagonistCardPlay);
}

/// Rejected actions are logged and leave the game alone.
#[tokio::test]
async fn test_rejected_action_changes_nothing() {
    let (actor, handle, _events) = EngineLoop::new(unstarted(quiet()), None);
    let join = actor.spawn();

    handle.submit_action(P1, PlayerAction::PassTurn).unwrap();
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::MastermindCardPlay);

    drop(handle);
    let engine = join.await.unwrap();
    assert!(engine.state().player(P1).is_some_and(|p| !p.ready));
}

#[tokio::test]
async fn test_events_stream_in_order() {
    let (actor, handle, mut events) = EngineLoop::new(unstarted(quiet()), None);
    let join = actor.spawn();

    handle.submit_action(MM, PlayerAction::PassTurn).unwrap();
    handle.current_phase().await.unwrap();
    drop(handle);
    let engine = join.await.unwrap();

    let mut seqs = Vec::new();
    let mut entered = Vec::new();
    while let Ok(event) = events.try_recv() {
        seqs.push(event.seq);
        if let EventKind::PhaseChanged { to, .. } = event.kind {
            entered.push(to);
        }
    }
    assert!(!seqs.is_empty());
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seqs.last().copied(), Some(engine.last_event_seq()));
    assert!(entered.contains(&PhaseKind::MastermindCardPlay));
    assert_eq!(entered.last(), Some(&PhaseKind::ProtagonistCardPlay));
}

/// Dropping every handle stops the loop, even with a timer armed.
#[tokio::test(start_paused = true)]
async fn test_dropping_handles_stops_the_loop() {
    let config = EngineConfig::default();
    let (actor, handle, _events) = EngineLoop::new(unstarted(config), None);
    let join = actor.spawn();
    let copy = handle.clone();

    assert_eq!(copy.current_phase().await.unwrap(), PhaseKind::MastermindCardPlay);
    drop(handle);
    drop(copy);

    let engine = tokio::time::timeout(Duration::from_secs(1), join)
        .await
        .expect("loop stopped")
        .unwrap();
    assert_eq!(engine.current_phase(), PhaseKind::MastermindCardPlay);
}

#[tokio::test]
async fn test_full_queue_rejects_submissions() {
    let mut config = quiet();
    config.inbound_capacity = 1;
    let (actor, handle, _events) = EngineLoop::new(unstarted(config), None);

    // Not running yet: the queue fills up.
    handle.submit_action(MM, PlayerAction::PassTurn).unwrap();
    assert_eq!(
        handle.submit_action(MM, PlayerAction::PassTurn),
        Err(EngineError::QueueFull)
    );

    let join = actor.spawn();
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::ProtagonistCardPlay);
    drop(handle);
    join.await.unwrap();
}

#[tokio::test]
async fn test_stopped_loop_closes_the_handle() {
    let (actor, handle, _events) = EngineLoop::new(unstarted(quiet()), None);
    let spare = handle.clone();
    let join = actor.spawn();
    join.abort();
    let _ = join.await;

    assert_eq!(spare.current_phase().await, Err(EngineError::QueueClosed));
    assert_eq!(
        handle.submit_action(MM, PlayerAction::PassTurn),
        Err(EngineError::QueueClosed)
    );
}

/// Card play times out into the next phase.
#[tokio::test(start_paused = true)]
async fn test_phase_timeout_passes_for_the_idle_player() {
    let timeouts = PhaseTimeouts {
        card_play_ms: 1_000,
        ..PhaseTimeouts::disabled()
    };
    let (actor, handle, _events) = EngineLoop::new(unstarted(quiet().with_timeouts(timeouts)), None);
    let join = actor.spawn();
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::MastermindCardPlay);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::ProtagonistCardPlay);

    // A fresh timer for the new phase.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::Abilities);

    drop(handle);
    let engine = join.await.unwrap();
    let passes = engine
        .state()
        .day_log
        .iter()
        .filter(|e| matches!(e.kind, EventKind::PlayerPassed { .. }))
        .count();
    assert_eq!(passes, 2);
}

/// A game between AI players plays itself to the end.
#[tokio::test]
async fn test_ai_players_finish_the_game() {
    init_tracing();
    let seats = vec![
        Player::new(MM, "Mastermind", PlayerRole::Mastermind).with_ai("random"),
        Player::new(P1, "Leader", PlayerRole::Protagonist).with_ai("random"),
        Player::new(P2, "Sidekick", PlayerRole::Protagonist).with_ai("random"),
    ];
    let engine = Engine::new(Arc::new(with_murder(script(2, 3))), seats, quiet()).unwrap();
    let generator: Arc<dyn ActionGenerator> = Arc::new(RandomActionGenerator::new(11));
    let (actor, handle, _events) = EngineLoop::new(engine, Some(generator));
    let join = actor.spawn();

    let finished = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if handle.current_phase().await.unwrap() == PhaseKind::GameOver {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(finished.is_ok(), "AI game did not finish");

    drop(handle);
    let engine = join.await.unwrap();
    assert!(engine.winner().is_some());
    assert!(engine.awaited_players().is_empty());
}

/// The Protagonists keep their ability sub-turn when the Mastermind idles.
#[tokio::test(start_paused = true)]
async fn test_abilities_timeout_hands_over_the_sub_turn() {
    let timeouts = PhaseTimeouts {
        abilities_ms: 1_000,
        ..PhaseTimeouts::disabled()
    };
    let (actor, handle, _events) = EngineLoop::new(unstarted(quiet().with_timeouts(timeouts)), None);
    let join = actor.spawn();

    handle.submit_action(MM, PlayerAction::PassTurn).unwrap();
    handle.submit_action(P1, PlayerAction::PassTurn).unwrap();
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::Abilities);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(handle.current_phase().await.unwrap(), PhaseKind::Abilities);

    drop(handle);
    let engine = join.await.unwrap();
    assert_eq!(engine.state().day, 1);
    assert_eq!(engine.awaited_players(), vec![P1]);
    assert!(engine.armed_timer().is_some());
}

fn ai_seats() -> Vec<Player> {
    vec![
        Player::new(MM, "Mastermind", PlayerRole::Mastermind).with_ai("stub"),
        Player::new(P1, "Leader", PlayerRole::Protagonist).with_ai("stub"),
    ]
}

/// Plays one scripted action when it is offered and fails otherwise.
struct Scripted(PlayerAction);

impl ActionGenerator for Scripted {
    fn generate(&self, request: ActionRequest) -> BoxFuture<'static, Result<PlayerAction, AiError>> {
        let result = if request.candidates.contains(&self.0) {
            Ok(self.0.clone())
        } else {
            Err(AiError::Generation(format!("nothing scripted for {}", request.phase)))
        };
        async move { result }.boxed()
    }
}

/// Always answers with an action no phase accepts.
struct Illegal;

impl ActionGenerator for Illegal {
    fn generate(&self, _request: ActionRequest) -> BoxFuture<'static, Result<PlayerAction, AiError>> {
        async move {
            Ok(PlayerAction::UseAbility {
                character: CharacterId(99),
                ability: AbilityId(99),
                target: None,
            })
        }
        .boxed()
    }
}

async fn play_out(engine: Engine, generator: Arc<dyn ActionGenerator>) -> Engine {
    let (actor, handle, _events) = EngineLoop::new(engine, Some(generator));
    let join = actor.spawn();
    let finished = tokio::time::timeout(Duration::from_secs(10), async {
        while handle.current_phase().await.unwrap() != PhaseKind::GameOver {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(finished.is_ok(), "AI game did not finish");
    drop(handle);
    join.await.unwrap()
}

/// Failed generations fall back to passing and to the first option.
#[tokio::test]
async fn test_failing_ai_falls_back_to_defaults() {
    init_tracing();
    let mut data = script(1, 1);
    data.add_card(CardConfig::new(
        INTRIGUE,
        "Rumors",
        PlayerRole::Mastermind,
        Effect::adjust(TargetSelector::AtLocation(Location::School), Stat::Intrigue, 1),
    ));
    let engine = Engine::new(Arc::new(data), ai_seats(), quiet()).unwrap();
    let rumors = PlayerAction::PlayCard {
        card: INTRIGUE,
        target: DOCTOR,
    };

    let engine = play_out(engine, Arc::new(Scripted(rumors))).await;

    let state = engine.state();
    assert_eq!(count_events(state, EventType::ChoiceRequired), 1);
    assert_eq!(count_events(state, EventType::ChoiceMade), 1);
    assert_eq!(state.character(BOY).unwrap().stats.intrigue, 1);
    assert_eq!(state.character(GIRL).unwrap().stats.intrigue, 0);
    assert_eq!(engine.winner(), Some(Winner::Protagonist));
}

/// Rejected AI actions are replaced by the fallback.
#[tokio::test]
async fn test_illegal_ai_actions_fall_back_to_passing() {
    init_tracing();
    let engine = Engine::new(Arc::new(script(1, 2)), ai_seats(), quiet()).unwrap();

    let engine = play_out(engine, Arc::new(Illegal)).await;

    let state = engine.state();
    assert_eq!(count_events(state, EventType::AbilityUsed), 0);
    assert_eq!(state.day, 2);
    assert_eq!(engine.winner(), Some(Winner::Protagonist));
}

/// The board without logs; replayed events carry fresh timestamps.
fn board(state: &GameState) -> serde_json::Value {
    let mut value = serde_json::to_value(state).unwrap();
    let fields = value.as_object_mut().unwrap();
    fields.remove("day_log");
    fields.remove("loop_log");
    value
}

fn kinds(events: &[GameEvent]) -> Vec<(u64, EventKind)> {
    events.iter().map(|e| (e.seq, e.kind.clone())).collect()
}

/// Many clients at once still see one total order of events.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_serialize() {
    init_tracing();
    let seats = vec![
        Player::new(MM, "Mastermind", PlayerRole::Mastermind),
        Player::new(P1, "Leader", PlayerRole::Protagonist),
        Player::new(P2, "Sidekick", PlayerRole::Protagonist),
    ];
    let data = Arc::new(script(2, 3));
    let mut config = quiet();
    config.broadcast_capacity = 10_000;
    let engine = Engine::new(Arc::clone(&data), seats.clone(), config).unwrap();
    let (actor, handle, mut events) = EngineLoop::new(engine, None);
    let join = actor.spawn();

    let clients: Vec<_> = [MM, P1, P2, MM, P1, P2]
        .into_iter()
        .map(|player| {
            let handle = handle.clone();
            tokio::spawn(async move {
                while handle.current_phase().await.unwrap() != PhaseKind::GameOver {
                    let submitted = handle.submit_action(player, PlayerAction::PassTurn);
                    assert!(matches!(submitted, Ok(()) | Err(EngineError::QueueFull)));
                    assert!(handle.player_view(player).await.unwrap().is_some());
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    let finished = tokio::time::timeout(Duration::from_secs(10), futures::future::join_all(clients)).await;
    assert!(finished.is_ok_and(|joined| joined.iter().all(Result::is_ok)));

    drop(handle);
    let engine = join.await.unwrap();
    assert_eq!(engine.winner(), Some(Winner::Protagonist));

    let mut streamed = Vec::new();
    while let Ok(event) = events.try_recv() {
        streamed.push(event);
    }
    let seqs: Vec<u64> = streamed.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=engine.last_event_seq()).collect::<Vec<_>>());

    // Feeding the stream through a fresh pipeline rebuilds the same game.
    let mut replay = GameState::new(&data, seats);
    let mut manager = EventManager::new(EventHandlers::standard());
    for event in &streamed {
        assert_eq!(manager.create_and_process(&mut replay, event.kind.clone()), event.seq);
    }
    assert_eq!(board(&replay), board(engine.state()));
    let logged: Vec<GameEvent> = engine.state().loop_log.iter().cloned().collect();
    let replayed: Vec<GameEvent> = replay.loop_log.iter().cloned().collect();
    assert_eq!(kinds(&replayed), kinds(&logged));
}
