//! Event handlers: the only code that writes to [`GameState`].
//!
//! Handlers are plain functions of `(state, event)`. The dispatch table is
//! built explicitly by [`EventHandlers::standard`] and handed to the
//! [`EventManager`](super::EventManager); event types without a handler
//! are informational.

use rustc_hash::FxHashMap;

use super::event::{EventKind, EventType, GameEvent};
use crate::cards::{AbilityInstance, CardInstance};
use crate::core::{Deduction, GameState, PlayedCard, PlayerRole};

/// Applies one event to the state.
pub type EventHandler = fn(&mut GameState, &GameEvent);

/// Dispatch table from event type to handler.
#[derive(Clone, Default)]
pub struct EventHandlers {
    table: FxHashMap<EventType, EventHandler>,
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

impl EventHandlers {
    /// A table with no handlers: every event is informational.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ruleset's handlers.
    #[must_use]
    pub fn standard() -> Self {
        let mut handlers = Self::empty();
        handlers.register(EventType::HandDealt, hand_dealt);
        handlers.register(EventType::PhaseChanged, phase_changed);
        handlers.register(EventType::LoopStarted, loop_started);
        handlers.register(EventType::DayStarted, day_started);
        handlers.register(EventType::PlayerPassed, player_passed);
        handlers.register(EventType::TragedyOccurred, tragedy_occurred);
        handlers.register(EventType::LoopEnded, loop_ended);
        handlers.register(EventType::GameEnded, game_ended);
        handlers.register(EventType::CardPlayed, card_played);
        handlers.register(EventType::AbilityUsed, ability_used);
        handlers.register(EventType::CharacterMoved, character_moved);
        handlers.register(EventType::StatAdjusted, stat_adjusted);
        handlers.register(EventType::TraitAdded, trait_added);
        handlers.register(EventType::TraitRemoved, trait_removed);
        handlers.register(EventType::CharacterKilled, character_killed);
        handlers.register(EventType::IncidentTriggered, incident_triggered);
        handlers
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(&mut self, event_type: EventType, handler: EventHandler) -> Option<EventHandler> {
        self.table.insert(event_type, handler)
    }

    #[must_use]
    pub fn get(&self, event_type: EventType) -> Option<EventHandler> {
        self.table.get(&event_type).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// === Progression ===

fn hand_dealt(state: &mut GameState, event: &GameEvent) {
    let EventKind::HandDealt { player, cards } = &event.kind else { return };
    if let Some(player) = state.player_mut(*player) {
        player.hand = cards.iter().copied().map(CardInstance::new).collect();
    }
}

fn phase_changed(state: &mut GameState, event: &GameEvent) {
    let EventKind::PhaseChanged { to, .. } = &event.kind else { return };
    state.phase = *to;
    state.update_players(|player| player.ready = false);
}

/// Restores the board and clears every loop-scoped record.
fn loop_started(state: &mut GameState, event: &GameEvent) {
    let EventKind::LoopStarted { loop_index } = &event.kind else { return };
    state.loop_index = *loop_index;
    state.day = 0;
    state.reset_characters();
    state.day_played.clear();
    state.loop_played.clear();
    state.triggered_incidents.clear();
    state.tragedy_this_loop = false;
    state.day_log.clear();
    state.loop_log.clear();
    state.update_players(|player| player.hand.iter_mut().for_each(CardInstance::reset));
    state.update_characters(|character| character.abilities.iter_mut().for_each(AbilityInstance::reset));
}

fn day_started(state: &mut GameState, event: &GameEvent) {
    let EventKind::DayStarted { day } = &event.kind else { return };
    state.day = *day;
    state.day_played.clear();
    state.day_log.clear();
}

fn player_passed(state: &mut GameState, event: &GameEvent) {
    let EventKind::PlayerPassed { player } = &event.kind else { return };
    if let Some(player) = state.player_mut(*player) {
        player.ready = true;
    }
}

fn tragedy_occurred(state: &mut GameState, _event: &GameEvent) {
    state.tragedy_this_loop = true;
}

/// Hands protagonists what the loop revealed.
fn loop_ended(state: &mut GameState, event: &GameEvent) {
    let EventKind::LoopEnded { loop_index, .. } = &event.kind else { return };
    let notes: Vec<Deduction> = state
        .loop_log
        .iter()
        .filter_map(|logged| match &logged.kind {
            EventKind::IncidentTriggered { incident, culprit, .. } => Some(Deduction::IncidentOccurred {
                loop_index: *loop_index,
                incident: *incident,
                culprit: *culprit,
            }),
            EventKind::CharacterKilled { character } => Some(Deduction::CharacterDied {
                loop_index: *loop_index,
                character: *character,
            }),
            _ => None,
        })
        .collect();
    state.update_players(|player| {
        if player.role == PlayerRole::Protagonist {
            player.deductions.extend(notes.iter().cloned());
        }
    });
}

fn game_ended(state: &mut GameState, event: &GameEvent) {
    let EventKind::GameEnded { winner } = &event.kind else { return };
    state.winner = Some(*winner);
}

// === Cards and abilities ===

fn card_played(state: &mut GameState, event: &GameEvent) {
    let EventKind::CardPlayed { player, card, target, .. } = &event.kind else { return };
    if let Some(instance) = state.player_mut(*player).and_then(|p| p.card_mut(*card)) {
        instance.used_this_loop = true;
        instance.target = Some(*target);
    }
    let played = PlayedCard {
        player: *player,
        card: *card,
        target: *target,
    };
    state.loop_played.push(played.clone());
    state.day_played.push(played);
}

fn ability_used(state: &mut GameState, event: &GameEvent) {
    let EventKind::AbilityUsed { character, ability, target, .. } = &event.kind else { return };
    if let Some(instance) = state.character_mut(*character).and_then(|c| c.ability_mut(*ability)) {
        instance.used_this_loop = true;
        instance.target = *target;
    }
}

// === Board ===

fn character_moved(state: &mut GameState, event: &GameEvent) {
    let EventKind::CharacterMoved { character, to, .. } = &event.kind else { return };
    if let Some(character) = state.character_mut(*character) {
        character.location = *to;
    }
}

fn stat_adjusted(state: &mut GameState, event: &GameEvent) {
    let EventKind::StatAdjusted { character, stat, amount } = &event.kind else { return };
    if let Some(character) = state.character_mut(*character) {
        character.stats.adjust(*stat, *amount);
    }
}

/// Adding a trait the character already has is a no-op.
fn trait_added(state: &mut GameState, event: &GameEvent) {
    let EventKind::TraitAdded { character, name } = &event.kind else { return };
    if let Some(character) = state.character_mut(*character) {
        character.traits.insert(name.clone());
    }
}

/// Removing a trait the character lacks is a no-op.
fn trait_removed(state: &mut GameState, event: &GameEvent) {
    let EventKind::TraitRemoved { character, name } = &event.kind else { return };
    if let Some(character) = state.character_mut(*character) {
        character.traits.remove(name);
    }
}

fn character_killed(state: &mut GameState, event: &GameEvent) {
    let EventKind::CharacterKilled { character } = &event.kind else { return };
    if let Some(character) = state.character_mut(*character) {
        character.alive = false;
    }
}

fn incident_triggered(state: &mut GameState, event: &GameEvent) {
    let EventKind::IncidentTriggered { incident, .. } = &event.kind else { return };
    state.triggered_incidents.insert(*incident);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CharacterConfig, GameData, ScriptConfig};
    use crate::core::{CharacterId, IncidentId, Location, Player, PlayerId, Stat};

    fn state() -> GameState {
        let mut data = GameData::new(ScriptConfig::new("Handlers", 2, 2));
        data.add_character(CharacterConfig::new(CharacterId(1), "Boy Student", Location::School));
        GameState::new(
            &data,
            [
                Player::new(PlayerId(0), "MM", PlayerRole::Mastermind),
                Player::new(PlayerId(1), "P1", PlayerRole::Protagonist),
            ],
        )
    }

    fn apply(state: &mut GameState, kind: EventKind) {
        let event = GameEvent::new(1, kind);
        let handler = EventHandlers::standard().get(event.event_type());
        if let Some(handler) = handler {
            handler(state, &event);
        }
    }

    #[test]
    fn test_informational_events_have_no_handler() {
        let handlers = EventHandlers::standard();
        assert!(handlers.get(EventType::CardsRevealed).is_none());
        assert!(handlers.get(EventType::ChoiceRequired).is_none());
        assert!(handlers.get(EventType::StatAdjusted).is_some());
        assert!(EventHandlers::empty().is_empty());
    }

    #[test]
    fn test_trait_handlers_are_idempotent() {
        let mut state = state();
        let add = EventKind::TraitAdded {
            character: CharacterId(1),
            name: "Culprit".into(),
        };
        apply(&mut state, add.clone());
        apply(&mut state, add);
        assert_eq!(state.character(CharacterId(1)).unwrap().traits.len(), 1);

        let remove = EventKind::TraitRemoved {
            character: CharacterId(1),
            name: "Culprit".into(),
        };
        apply(&mut state, remove.clone());
        apply(&mut state, remove);
        assert!(state.character(CharacterId(1)).unwrap().traits.is_empty());
    }

    #[test]
    fn test_loop_started_resets_board_and_usage() {
        let mut state = state();
        apply(&mut state, EventKind::HandDealt { player: PlayerId(0), cards: vec![CardId(1)] });
        apply(
            &mut state,
            EventKind::StatAdjusted {
                character: CharacterId(1),
                stat: Stat::Paranoia,
                amount: 2,
            },
        );
        apply(
            &mut state,
            EventKind::CardPlayed {
                player: PlayerId(0),
                role: PlayerRole::Mastermind,
                card: CardId(1),
                target: CharacterId(1),
            },
        );
        state.triggered_incidents.insert(IncidentId(1));
        assert!(state.player(PlayerId(0)).unwrap().hand[0].used_this_loop);

        apply(&mut state, EventKind::LoopStarted { loop_index: 2 });

        assert_eq!(state.loop_index, 2);
        assert_eq!(state.character(CharacterId(1)).unwrap().stats.paranoia, 0);
        assert!(!state.player(PlayerId(0)).unwrap().hand[0].used_this_loop);
        assert!(state.loop_played.is_empty());
        assert!(state.triggered_incidents.is_empty());
    }

    #[test]
    fn test_loop_ended_records_deductions() {
        let mut state = state();
        state.loop_log.push_back(GameEvent::new(
            1,
            EventKind::IncidentTriggered {
                incident: IncidentId(4),
                culprit: CharacterId(1),
                victim: None,
            },
        ));
        apply(&mut state, EventKind::LoopEnded { loop_index: 1, survived: false });

        assert_eq!(
            state.player(PlayerId(1)).unwrap().deductions,
            vec![Deduction::IncidentOccurred {
                loop_index: 1,
                incident: IncidentId(4),
                culprit: CharacterId(1),
            }]
        );
        assert!(state.player(PlayerId(0)).unwrap().deductions.is_empty());
    }
}
