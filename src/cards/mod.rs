//! Card system: definitions, instances, and the game data registry.
//!
//! ## Key Types
//!
//! - `CardConfig` / `AbilityConfig`: Immutable definitions (effect tree, once-per-loop flag)
//! - `CardInstance` / `AbilityInstance`: Loop-scoped runtime state (used flag, last target)
//! - `GameData`: Read-only accessor for script, cards, abilities, characters, incidents

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{AbilityConfig, AbilityId, CardConfig, CardId, TriggerType};
pub use instance::{AbilityInstance, CardInstance};
pub use registry::{CharacterConfig, DataError, GameData, IncidentConfig, ScriptConfig};
