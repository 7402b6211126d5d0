//! Declared phase transitions.
//!
//! When a phase reports [`PhaseOutcome::Done`](super::PhaseOutcome::Done)
//! the machine takes the first outgoing transition whose guard holds.
//! The flow of the game is this table, not control flow in the phases.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::phase::PhaseKind;
use crate::cards::GameData;
use crate::core::GameState;

/// Condition on a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guard {
    Always,
    /// A loss condition held at the end of a day this loop.
    TragedyThisLoop,
    /// The current day is the last of the loop.
    FinalDay,
    /// A winner has been declared.
    GameDecided,
    /// Every scripted loop has been played. `LoopStarted` resets the day,
    /// so a loop that has just begun never counts.
    LoopsExhausted,
}

impl Guard {
    #[must_use]
    pub fn holds(self, state: &GameState, data: &GameData) -> bool {
        match self {
            Guard::Always => true,
            Guard::TragedyThisLoop => state.tragedy_this_loop,
            Guard::FinalDay => state.day >= data.script.days_per_loop,
            Guard::GameDecided => state.is_over(),
            Guard::LoopsExhausted => state.loop_index >= data.script.loops && state.day > 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub to: PhaseKind,
    pub guard: Guard,
}

/// Outgoing transitions per phase, in priority order.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    edges: FxHashMap<PhaseKind, Vec<Transition>>,
}

impl TransitionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ruleset's flow.
    #[must_use]
    pub fn standard() -> Self {
        use PhaseKind::*;

        Self::new()
            .with(Setup, MastermindSetup, Guard::Always)
            .with(MastermindSetup, LoopStart, Guard::Always)
            .with(LoopStart, ProtagonistGuess, Guard::LoopsExhausted)
            .with(LoopStart, DayStart, Guard::Always)
            .with(DayStart, MastermindCardPlay, Guard::Always)
            .with(MastermindCardPlay, ProtagonistCardPlay, Guard::Always)
            .with(ProtagonistCardPlay, CardReveal, Guard::Always)
            .with(CardReveal, CardResolve, Guard::Always)
            .with(CardResolve, Abilities, Guard::Always)
            .with(Abilities, Incidents, Guard::Always)
            .with(Incidents, DayEnd, Guard::Always)
            .with(DayEnd, LoopEnd, Guard::TragedyThisLoop)
            .with(DayEnd, LoopEnd, Guard::FinalDay)
            .with(DayEnd, DayStart, Guard::Always)
            .with(LoopEnd, GameOver, Guard::GameDecided)
            .with(LoopEnd, LoopStart, Guard::Always)
            .with(ProtagonistGuess, GameOver, Guard::Always)
    }

    /// Add a transition (builder pattern). Earlier transitions win.
    #[must_use]
    pub fn with(mut self, from: PhaseKind, to: PhaseKind, guard: Guard) -> Self {
        self.edges.entry(from).or_default().push(Transition { to, guard });
        self
    }

    #[must_use]
    pub fn edges(&self, from: PhaseKind) -> &[Transition] {
        self.edges.get(&from).map_or(&[], Vec::as_slice)
    }

    /// First transition out of `from` whose guard holds.
    #[must_use]
    pub fn next(&self, from: PhaseKind, state: &GameState, data: &GameData) -> Option<PhaseKind> {
        self.edges(from)
            .iter()
            .find(|t| t.guard.holds(state, data))
            .map(|t| t.to)
    }
}
