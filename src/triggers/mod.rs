//! Conditions and incidents.
//!
//! ## Key Components
//!
//! - [`Condition`]: boolean tree over game state (stats, locations, traits)
//! - [`ConditionEvaluator`]: evaluates a condition with a resolution context
//! - [`IncidentEvaluator`]: decides which scripted incidents are due
//!
//! ## Example Usage
//!
//! ```
//! use tragedy_looper::cards::{CharacterConfig, GameData, ScriptConfig};
//! use tragedy_looper::core::{CharacterId, GameState, Location, Player, PlayerId, PlayerRole, Stat};
//! use tragedy_looper::effects::{ResolutionContext, TargetSelector};
//! use tragedy_looper::triggers::{Condition, ConditionEvaluator};
//!
//! let mut data = GameData::new(ScriptConfig::new("Example", 1, 1));
//! data.add_character(CharacterConfig::new(CharacterId::new(1), "Boy Student", Location::School));
//! let state = GameState::new(&data, [Player::new(PlayerId::new(0), "MM", PlayerRole::Mastermind)]);
//!
//! let calm = Condition::stat(
//!     TargetSelector::Character(CharacterId::new(1)),
//!     Stat::Paranoia,
//!     tragedy_looper::triggers::Comparator::Eq,
//!     0,
//! );
//! let ctx = ResolutionContext::new();
//! assert!(ConditionEvaluator::evaluate(&state, Some(&calm), &ctx).unwrap());
//!
//! // NOT takes exactly one operand.
//! assert!(ConditionEvaluator::evaluate(&state, Some(&Condition::Not(vec![])), &ctx).is_err());
//! ```

mod condition;
mod incident;

pub use condition::{Comparator, Condition, ConditionError, ConditionEvaluator, Operand};
pub use incident::IncidentEvaluator;
