//! Shared scenario fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tragedy_looper::cards::{
    AbilityConfig, AbilityId, CardConfig, CardId, CharacterConfig, GameData, IncidentConfig, ScriptConfig,
};
use tragedy_looper::core::{
    CharacterId, EngineConfig, GameState, IncidentId, Location, PhaseTimeouts, Player, PlayerAction, PlayerId,
    PlayerRole, Stat,
};
use tragedy_looper::effects::{Effect, TargetSelector};
use tragedy_looper::engine::Engine;
use tragedy_looper::events::{EventKind, EventType};
use tragedy_looper::rules::PhaseKind;
use tragedy_looper::triggers::Condition;

pub const MM: PlayerId = PlayerId(0);
pub const P1: PlayerId = PlayerId(1);
pub const P2: PlayerId = PlayerId(2);

pub const BOY: CharacterId = CharacterId(1);
pub const GIRL: CharacterId = CharacterId(2);
pub const DOCTOR: CharacterId = CharacterId(3);

/// Mastermind: paranoia +1 on the card's target.
pub const PARANOIA: CardId = CardId(1);
/// Mastermind: intrigue +1 on the card's target.
pub const INTRIGUE: CardId = CardId(2);
/// Protagonist: goodwill +1 on the card's target.
pub const GOODWILL: CardId = CardId(11);

/// Goodwill ability of the Girl Student: paranoia -1 on a target.
pub const REASSURE: AbilityId = AbilityId(1);

pub const MURDER: IncidentId = IncidentId(1);

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Three characters, the Doctor cast as Killer and the Boy as Key Person.
///
/// The Mastermind holds PARANOIA and INTRIGUE, every Protagonist holds
/// GOODWILL. No incidents and no loss conditions.
pub fn script(loops: u32, days: u32) -> GameData {
    let mut script = ScriptConfig::new("Test Town", loops, days);
    script.cast(BOY, "Key Person");
    script.cast(DOCTOR, "Killer");
    script.mastermind_cards = vec![PARANOIA, INTRIGUE];
    script.protagonist_cards = vec![GOODWILL];

    let mut data = GameData::new(script);
    data.add_character(CharacterConfig::new(BOY, "Boy Student", Location::School).with_trait("Student"));
    data.add_character(
        CharacterConfig::new(GIRL, "Girl Student", Location::School)
            .with_trait("Student")
            .with_ability(REASSURE),
    );
    data.add_character(CharacterConfig::new(DOCTOR, "Doctor", Location::Hospital));

    data.add_card(CardConfig::new(
        PARANOIA,
        "Paranoia +1",
        PlayerRole::Mastermind,
        Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, 1),
    ));
    data.add_card(CardConfig::new(
        INTRIGUE,
        "Intrigue +1",
        PlayerRole::Mastermind,
        Effect::adjust(TargetSelector::AbilityTarget, Stat::Intrigue, 1),
    ));
    data.add_card(CardConfig::new(
        GOODWILL,
        "Goodwill +1",
        PlayerRole::Protagonist,
        Effect::adjust(TargetSelector::AbilityTarget, Stat::Goodwill, 1),
    ));
    data.add_ability(
        AbilityConfig::new(
            REASSURE,
            "Reassure",
            PlayerRole::Protagonist,
            Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, -1),
        )
        .once_per_loop(),
    );
    data
}

/// The murder incident: fires once the Boy reaches 3 paranoia.
pub fn with_murder(mut data: GameData) -> GameData {
    data.script.incidents.push(MURDER);
    data.add_incident(IncidentConfig::new(
        MURDER,
        "Murder",
        BOY,
        Condition::stat_at_least(TargetSelector::Culprit, Stat::Paranoia, 3),
    ));
    data
}

pub fn players() -> Vec<Player> {
    vec![
        Player::new(MM, "Mastermind", PlayerRole::Mastermind),
        Player::new(P1, "Leader", PlayerRole::Protagonist),
    ]
}

/// Configuration with every timer disabled.
pub fn quiet() -> EngineConfig {
    EngineConfig::default().with_timeouts(PhaseTimeouts::disabled())
}

/// A started engine with timers disabled.
pub fn engine(data: GameData) -> Engine {
    init_tracing();
    let mut engine = Engine::new(Arc::new(data), players(), quiet()).expect("valid test data");
    engine.start();
    engine
}

/// Event types of the current loop, in order.
pub fn loop_events(state: &GameState) -> Vec<EventType> {
    state.loop_log.iter().map(|e| e.event_type()).collect()
}

pub fn count_events(state: &GameState, event_type: EventType) -> usize {
    state.loop_log.iter().filter(|e| e.event_type() == event_type).count()
}

pub fn paranoia(state: &GameState, character: CharacterId) -> u32 {
    state.character(character).map_or(0, |c| c.stats.paranoia)
}

/// Play one day: the Mastermind places `mm_card` (or passes), everyone
/// else passes through card play and abilities.
pub fn play_day(engine: &mut Engine, mm_card: Option<(CardId, CharacterId)>) {
    assert_eq!(engine.current_phase(), PhaseKind::MastermindCardPlay);
    match mm_card {
        Some((card, target)) => {
            engine.submit(MM, PlayerAction::PlayCard { card, target }).expect("card accepted");
            if engine.current_phase() == PhaseKind::MastermindCardPlay {
                engine.submit(MM, PlayerAction::PassTurn).expect("pass accepted");
            }
        }
        None => engine.submit(MM, PlayerAction::PassTurn).expect("pass accepted"),
    }
    pass_all(engine, PhaseKind::ProtagonistCardPlay);
    pass_all(engine, PhaseKind::Abilities);
}

/// Pass for every player the game waits on while it stays in `phase`.
pub fn pass_all(engine: &mut Engine, phase: PhaseKind) {
    while engine.current_phase() == phase {
        let Some(&player) = engine.awaited_players().first() else {
            panic!("{phase} is waiting on nobody");
        };
        engine.submit(player, PlayerAction::PassTurn).expect("pass accepted");
    }
}

/// Whether the event was a board change on `character`.
pub fn touches(kind: &EventKind, character: CharacterId) -> bool {
    match kind {
        EventKind::StatAdjusted { character: c, .. }
        | EventKind::CharacterMoved { character: c, .. }
        | EventKind::TraitAdded { character: c, .. }
        | EventKind::TraitRemoved { character: c, .. }
        | EventKind::CharacterKilled { character: c } => *c == character,
        _ => false,
    }
}
