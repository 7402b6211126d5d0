//! Game state: the single mutable aggregate.
//!
//! ## Ownership
//!
//! A `GameState` is owned by exactly one engine. Nothing outside the
//! engine's event pipeline writes to it: every change is the result of an
//! event handler applying a [`GameEvent`]. Other components only ever see
//! it through `&GameState` while the engine is processing a message.
//!
//! ## Loop resets
//!
//! `baseline` holds every character as it stands when a loop begins.
//! Starting a loop restores `characters` from it; with `im` persistent
//! maps that is an O(1) clone. Player deductions are never reset.

use std::collections::BTreeSet;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::character::Character;
use super::entity::{CharacterId, IncidentId};
use super::location::Location;
use super::player::{Player, PlayerId, PlayerRole};
use crate::cards::{AbilityInstance, CardId, GameData};
use crate::events::GameEvent;
use crate::rules::{PhaseKind, Winner};

/// A card placed on the board this day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub player: PlayerId,
    pub card: CardId,
    pub target: CharacterId,
}

/// Complete authoritative game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    // === Progression ===
    /// Index of the current loop (1-based; 0 before the first loop starts).
    pub loop_index: u32,
    /// Day within the current loop (1-based; 0 before the first day).
    pub day: u32,
    pub phase: PhaseKind,

    // === Board ===
    pub characters: OrdMap<CharacterId, Character>,
    baseline: OrdMap<CharacterId, Character>,
    pub players: OrdMap<PlayerId, Player>,

    // === Loop records ===
    pub day_played: Vec<PlayedCard>,
    pub loop_played: Vec<PlayedCard>,
    pub triggered_incidents: BTreeSet<IncidentId>,
    /// Set once a loss condition held at the end of a day this loop.
    pub tragedy_this_loop: bool,

    // === Logs ===
    pub day_log: Vector<GameEvent>,
    pub loop_log: Vector<GameEvent>,

    pub winner: Option<Winner>,
}

impl GameState {
    /// Build the initial state for a game.
    ///
    /// Characters come from the game data with their scripted roles,
    /// starting locations, traits and abilities. Hands are dealt later by
    /// the SETUP phase.
    #[must_use]
    pub fn new(data: &GameData, players: impl IntoIterator<Item = Player>) -> Self {
        let baseline: OrdMap<CharacterId, Character> = data
            .characters()
            .map(|config| {
                let mut character = Character::new(config.id, config.name.clone(), config.start_location)
                    .with_role(data.role_of(config.id));
                for name in &config.traits {
                    character.traits.insert(name.clone());
                }
                character.abilities = config
                    .abilities
                    .iter()
                    .map(|&id| AbilityInstance::new(id))
                    .collect();
                (config.id, character)
            })
            .collect();

        Self {
            loop_index: 0,
            day: 0,
            phase: PhaseKind::Setup,
            characters: baseline.clone(),
            baseline,
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            day_played: Vec::new(),
            loop_played: Vec::new(),
            triggered_incidents: BTreeSet::new(),
            tragedy_this_loop: false,
            day_log: Vector::new(),
            loop_log: Vector::new(),
            winner: None,
        }
    }

    // === Characters ===

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Living characters at a location, in id order.
    pub fn characters_at(&self, location: Location) -> impl Iterator<Item = &Character> {
        self.characters
            .values()
            .filter(move |c| c.alive && c.location == location)
    }

    /// Apply `f` to every character, in id order.
    pub fn update_characters(&mut self, mut f: impl FnMut(&mut Character)) {
        let ids: Vec<CharacterId> = self.characters.keys().copied().collect();
        for id in ids {
            if let Some(character) = self.characters.get_mut(&id) {
                f(character);
            }
        }
    }

    /// Restore every character to its loop-start baseline.
    pub fn reset_characters(&mut self) {
        self.characters = self.baseline.clone();
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Apply `f` to every player, in id order.
    pub fn update_players(&mut self, mut f: impl FnMut(&mut Player)) {
        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for id in ids {
            if let Some(player) = self.players.get_mut(&id) {
                f(player);
            }
        }
    }

    #[must_use]
    pub fn mastermind(&self) -> Option<&Player> {
        self.players.values().find(|p| p.is_mastermind())
    }

    pub fn protagonists(&self) -> impl Iterator<Item = &Player> {
        self.players
            .values()
            .filter(|p| p.role == PlayerRole::Protagonist)
    }

    /// Ids of every player holding `role`, in id order.
    #[must_use]
    pub fn players_with_role(&self, role: PlayerRole) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.role == role)
            .map(|p| p.id)
            .collect()
    }

    // === Cards ===

    /// Whether `player` already played `card` today.
    #[must_use]
    pub fn played_today(&self, player: PlayerId, card: CardId) -> bool {
        self.day_played
            .iter()
            .any(|p| p.player == player && p.card == card)
    }

    /// Number of cards `player` placed today.
    #[must_use]
    pub fn cards_played_today(&self, player: PlayerId) -> usize {
        self.day_played.iter().filter(|p| p.player == player).count()
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.winner.is_some()
    }
}
