//! Game rules: phases, transitions and the phase machine.
//!
//! Each phase is a stateless unit struct implementing [`Phase`]. Which
//! phase follows which is data in a [`TransitionTable`]; the
//! [`PhaseMachine`] enters phases, routes actions and timeouts to the
//! active one and settles transitions.

mod error;
mod machine;
mod phase;
pub mod phases;
mod transitions;

use serde::{Deserialize, Serialize};

pub use error::ActionError;
pub use machine::PhaseMachine;
pub use phase::{Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
pub use phases::phase_for;
pub use transitions::{Guard, Transition, TransitionTable};

/// Side that won the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Mastermind,
    Protagonist,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Mastermind => write!(f, "Mastermind"),
            Winner::Protagonist => write!(f, "Protagonists"),
        }
    }
}
