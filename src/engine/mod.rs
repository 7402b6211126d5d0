//! Running games.
//!
//! - [`Engine`]: synchronous core owning one game
//! - [`EngineLoop`] / [`EngineHandle`]: tokio actor serializing every input
//! - [`ActionGenerator`]: capability used for AI-controlled players

mod actor;
mod ai;
mod game;

pub use actor::{EngineError, EngineHandle, EngineLoop, EngineMessage};
pub use ai::{candidate_actions, ActionGenerator, ActionRequest, AiError, RandomActionGenerator};
pub use game::{ArmedTimer, Engine};
