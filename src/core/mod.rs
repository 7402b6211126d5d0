//! Core types: ids, board, characters, players, state, actions, RNG, configuration.
//!
//! Everything here is plain data. Rules live in `rules`, effects in
//! `effects`, and the only writer of [`GameState`] is the event pipeline in
//! `events`.

pub mod action;
pub mod character;
pub mod config;
pub mod entity;
pub mod location;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{PlayerAction, RoleGuess};
pub use character::{Character, Stat, Stats, CULPRIT_TRAIT, DEFAULT_ROLE};
pub use config::{ConfigError, EngineConfig, PhaseTimeouts};
pub use entity::{CharacterId, IncidentId};
pub use location::{Location, Movement};
pub use player::{AiSession, Deduction, Player, PlayerId, PlayerRole};
pub use rng::GameRng;
pub use state::{GameState, PlayedCard};
