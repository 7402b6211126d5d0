//! # tragedy-looper
//!
//! A deterministic, event-sourced engine for the hidden-role time-loop
//! board game Tragedy Looper.
//!
//! ## Design Principles
//!
//! 1. **Events Are the Only Writers**: Phases and effects never touch
//!    [`GameState`] directly. They emit [`EventKind`]s; the event handlers
//!    apply them, and the event log is the full history of a game.
//!
//! 2. **Configuration Over Convention**: Scripts, characters, cards,
//!    abilities and incidents are data in [`GameData`]. Conditions and
//!    effects are trees evaluated at runtime.
//!
//! 3. **One Writer Per Game**: The [`EngineLoop`] actor serializes player
//!    actions, timer signals, AI results and queries through one queue.
//!
//! ## Architecture
//!
//! - **Phase Machine**: Fourteen stateless phases; which follows which is a
//!   [`TransitionTable`] with guards.
//!
//! - **Resumable Effects**: An effect that needs a decision parks in the
//!   [`ResolutionQueue`] and resumes once the choice is answered.
//!
//! - **Persistent Data Structures**: `im-rs` maps make state snapshots for
//!   player views cheap.
//!
//! ## Modules
//!
//! - `core`: Ids, board, characters, players, state, actions, RNG, configuration
//! - `cards`: Card, ability, character and incident definitions
//! - `triggers`: Conditions and incident scheduling
//! - `effects`: Effects, targeting and effect resolution
//! - `events`: Events, handlers and the event manager
//! - `stack`: The resolution queue
//! - `rules`: Phases, transitions and the phase machine
//! - `view`: Role-filtered player views
//! - `engine`: The engine core, its actor and AI players

pub mod cards;
pub mod core;
pub mod effects;
pub mod engine;
pub mod events;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod view;

// Re-export commonly used types
pub use crate::core::{
    CharacterId, EngineConfig, GameRng, GameState, IncidentId, Location, Player, PlayerAction, PlayerId,
    PlayerRole, Stat,
};

pub use crate::cards::{AbilityConfig, AbilityId, CardConfig, CardId, CharacterConfig, GameData, ScriptConfig};

pub use crate::triggers::{Condition, ConditionEvaluator};

pub use crate::effects::{Effect, EffectResolver, TargetResolver, TargetSelector, TargetSpec};

pub use crate::events::{EventKind, EventManager, GameEvent};

pub use crate::stack::ResolutionQueue;

pub use crate::rules::{ActionError, PhaseKind, PhaseMachine, TransitionTable, Winner};

pub use crate::view::{PlayerView, PlayerViewProjector};

pub use crate::engine::{ActionGenerator, Engine, EngineHandle, EngineLoop};
