//! Per-player projections of game state.

use serde::{Deserialize, Serialize};

use crate::cards::{AbilityId, CardInstance};
use crate::core::{CharacterId, Deduction, GameState, Location, PlayerId, PlayerRole, Stats};
use crate::events::GameEvent;
use crate::rules::{PhaseKind, Winner};

/// Role shown to viewers who may not see hidden roles.
pub const HIDDEN_ROLE: &str = "unknown";

/// A character as one player sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub location: Location,
    pub stats: Stats,
    /// Hidden role for the Mastermind, [`HIDDEN_ROLE`] for everyone else.
    pub role: String,
    pub traits: Vec<String>,
    pub alive: bool,
    pub abilities: Vec<AbilityId>,
}

/// Public facts about a seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub role: PlayerRole,
    pub ready: bool,
    pub hand_size: usize,
}

/// Read-only snapshot of the game for one player.
///
/// Owns all of its data; nothing in it aliases the game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub viewer: PlayerId,
    pub role: PlayerRole,
    pub phase: PhaseKind,
    pub loop_index: u32,
    pub day: u32,
    pub characters: Vec<CharacterView>,
    pub players: Vec<PlayerSummary>,
    /// The viewer's own hand.
    pub hand: Vec<CardInstance>,
    /// The viewer's own notes.
    pub deductions: Vec<Deduction>,
    /// Today's events the viewer may see, in order.
    pub events: Vec<GameEvent>,
    pub tragedy_this_loop: bool,
    pub winner: Option<Winner>,
}

pub struct PlayerViewProjector;

impl PlayerViewProjector {
    /// Project `state` for `player`. `None` for an unknown player.
    #[must_use]
    pub fn project(state: &GameState, player: PlayerId) -> Option<PlayerView> {
        let viewer = state.player(player)?;
        let reveal = viewer.is_mastermind();

        let characters = state
            .characters
            .values()
            .map(|c| CharacterView {
                id: c.id,
                name: c.name.clone(),
                location: c.location,
                stats: c.stats,
                role: if reveal {
                    c.hidden_role.clone()
                } else {
                    HIDDEN_ROLE.to_string()
                },
                traits: c.traits.iter().cloned().collect(),
                alive: c.alive,
                abilities: c.abilities.iter().map(|a| a.ability_id).collect(),
            })
            .collect();

        let players = state
            .players
            .values()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                role: p.role,
                ready: p.ready,
                hand_size: p.hand.len(),
            })
            .collect();

        let events = state
            .day_log
            .iter()
            .filter(|event| event.visible_to(viewer))
            .cloned()
            .collect();

        Some(PlayerView {
            viewer: player,
            role: viewer.role,
            phase: state.phase,
            loop_index: state.loop_index,
            day: state.day,
            characters,
            players,
            hand: viewer.hand.clone(),
            deductions: viewer.deductions.clone(),
            events,
            tragedy_this_loop: state.tragedy_this_loop,
            winner: state.winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CharacterConfig, GameData, ScriptConfig};
    use crate::core::Player;
    use crate::events::{EventHandlers, EventKind, EventManager};

    fn state() -> GameState {
        let mut script = ScriptConfig::new("Views", 1, 1);
        script.cast(CharacterId(1), "Key Person");
        let mut data = GameData::new(script);
        data.add_character(CharacterConfig::new(CharacterId(1), "Shrine Maiden", Location::Shrine));
        GameState::new(
            &data,
            [
                Player::new(PlayerId(0), "MM", PlayerRole::Mastermind),
                Player::new(PlayerId(1), "P1", PlayerRole::Protagonist),
                Player::new(PlayerId(2), "P2", PlayerRole::Protagonist),
            ],
        )
    }

    #[test]
    fn test_roles_masked_for_protagonists() {
        let state = state();
        let mastermind = PlayerViewProjector::project(&state, PlayerId(0)).unwrap();
        let protagonist = PlayerViewProjector::project(&state, PlayerId(1)).unwrap();

        assert_eq!(mastermind.characters[0].role, "Key Person");
        assert_eq!(protagonist.characters[0].role, HIDDEN_ROLE);
    }

    #[test]
    fn test_only_own_hand_and_private_events() {
        let mut state = state();
        let mut events = EventManager::new(EventHandlers::standard());
        events.create_and_process(&mut state, EventKind::HandDealt { player: PlayerId(0), cards: vec![CardId(1)] });
        events.create_and_process(&mut state, EventKind::HandDealt { player: PlayerId(1), cards: vec![CardId(2)] });

        let view = PlayerViewProjector::project(&state, PlayerId(1)).unwrap();
        assert_eq!(view.hand.len(), 1);
        assert_eq!(view.hand[0].card_id, CardId(2));
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.players[2].hand_size, 0);

        let other = PlayerViewProjector::project(&state, PlayerId(2)).unwrap();
        assert!(other.hand.is_empty());
        assert!(other.events.is_empty());
    }

    #[test]
    fn test_unknown_player_has_no_view() {
        assert!(PlayerViewProjector::project(&state(), PlayerId(9)).is_none());
    }
}
