//! Phases and the context they run in.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::ActionError;
use crate::cards::GameData;
use crate::core::{CharacterId, EngineConfig, GameState, PlayerAction, PlayerId, PlayerRole};
use crate::effects::{Choice, ChoiceId, EffectResolver, Step};
use crate::events::{EventKind, EventManager, GameEvent};
use crate::stack::{QueueStatus, Resolution, ResolutionQueue};

/// Every phase of the game, in table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Setup,
    MastermindSetup,
    LoopStart,
    DayStart,
    MastermindCardPlay,
    ProtagonistCardPlay,
    CardReveal,
    CardResolve,
    Abilities,
    Incidents,
    DayEnd,
    LoopEnd,
    ProtagonistGuess,
    GameOver,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 14] = [
        PhaseKind::Setup,
        PhaseKind::MastermindSetup,
        PhaseKind::LoopStart,
        PhaseKind::DayStart,
        PhaseKind::MastermindCardPlay,
        PhaseKind::ProtagonistCardPlay,
        PhaseKind::CardReveal,
        PhaseKind::CardResolve,
        PhaseKind::Abilities,
        PhaseKind::Incidents,
        PhaseKind::DayEnd,
        PhaseKind::LoopEnd,
        PhaseKind::ProtagonistGuess,
        PhaseKind::GameOver,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PhaseKind::Setup => "SETUP",
            PhaseKind::MastermindSetup => "MASTERMIND_SETUP",
            PhaseKind::LoopStart => "LOOP_START",
            PhaseKind::DayStart => "DAY_START",
            PhaseKind::MastermindCardPlay => "MASTERMIND_CARD_PLAY",
            PhaseKind::ProtagonistCardPlay => "PROTAGONIST_CARD_PLAY",
            PhaseKind::CardReveal => "CARD_REVEAL",
            PhaseKind::CardResolve => "CARD_RESOLVE",
            PhaseKind::Abilities => "ABILITIES",
            PhaseKind::Incidents => "INCIDENTS",
            PhaseKind::DayEnd => "DAY_END",
            PhaseKind::LoopEnd => "LOOP_END",
            PhaseKind::ProtagonistGuess => "PROTAGONIST_GUESS",
            PhaseKind::GameOver => "GAME_OVER",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a phase wants after handling something.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseOutcome {
    /// Keep waiting in this phase.
    Stay,
    /// Finished; the transition table picks the next phase.
    Done,
    /// Finished; go straight to this phase.
    Goto(PhaseKind),
}

/// Per-phase working memory, cleared on every transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseScratch {
    /// Whose sub-turn it is during ABILITIES.
    pub ability_turn: Option<PlayerRole>,
    /// Correct guesses gathered during PROTAGONIST_GUESS.
    pub guesses: BTreeMap<CharacterId, String>,
}

/// Behavior of one phase.
///
/// Phases are stateless; anything a phase needs to remember lives in the
/// game state or in [`PhaseScratch`].
pub trait Phase: Sync {
    fn kind(&self) -> PhaseKind;

    /// Called once on entry. May finish the phase immediately.
    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome;

    /// Validate and apply a player action. Errors leave state untouched.
    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError>;

    /// React to an event that was just applied.
    fn handle_event(&self, state: &GameState, event: &GameEvent) -> PhaseOutcome;

    /// Apply the default action when the phase timer fires.
    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome;

    /// Called once before leaving.
    fn exit(&self, ctx: &mut PhaseContext<'_>);

    /// Timer armed on entry. Zero means no timer.
    fn timeout_duration(&self, config: &EngineConfig) -> Duration;

    /// Players the phase is waiting on.
    fn awaiting(&self, state: &GameState, scratch: &PhaseScratch) -> Vec<PlayerId>;
}

/// Everything a phase may touch while handling one message.
pub struct PhaseContext<'a> {
    pub state: &'a mut GameState,
    pub data: &'a GameData,
    pub config: &'a EngineConfig,
    pub events: &'a mut EventManager,
    pub effects: &'a EffectResolver,
    pub queue: &'a mut ResolutionQueue,
    pub scratch: &'a mut PhaseScratch,
}

impl PhaseContext<'_> {
    /// Process an event through the pipeline.
    pub fn emit(&mut self, kind: EventKind) -> u64 {
        self.events.create_and_process(self.state, kind)
    }

    pub fn mastermind(&self) -> Option<PlayerId> {
        self.state.mastermind().map(|p| p.id)
    }

    pub fn schedule(&mut self, resolution: Resolution) {
        self.queue.push(resolution);
    }

    /// Run queued resolutions until the queue is empty or parks on a choice.
    pub fn run_queue(&mut self) -> QueueStatus {
        while let Some(resolution) = self.queue.pop_next() {
            self.drive(resolution, None);
        }
        self.queue.status()
    }

    /// Answer the parked choice and keep resolving.
    pub fn answer_choice(
        &mut self,
        player: PlayerId,
        choice: ChoiceId,
        index: usize,
    ) -> Result<QueueStatus, ActionError> {
        let (resolution, option) = self.queue.answer(player, choice, index)?;
        self.emit(EventKind::ChoiceMade { choice, player, index });
        self.drive(resolution, Some(option));
        Ok(self.run_queue())
    }

    /// Answer the parked choice, if any, with its first option.
    pub fn answer_default(&mut self) -> QueueStatus {
        let Some((player, choice)) = self.queue.pending().map(|p| (p.player, p.id)) else {
            return self.run_queue();
        };
        info!(%player, %choice, "choosing first option by default");
        match self.answer_choice(player, choice, 0) {
            Ok(status) => status,
            Err(error) => {
                warn!(%player, %choice, %error, "default choice rejected, dropping resolution");
                self.queue.clear();
                QueueStatus::Idle
            }
        }
    }

    /// Walk one resolution until it completes, parks or fails.
    ///
    /// Events emitted before a failure stay applied.
    fn drive(&mut self, mut resolution: Resolution, mut chosen: Option<Choice>) {
        for kind in resolution.take_prelude() {
            self.emit(kind);
        }
        loop {
            match self.effects.step(self.state, &mut resolution, chosen.take()) {
                Ok(Step::Emitted(kinds)) => {
                    for kind in kinds {
                        self.emit(kind);
                    }
                }
                Ok(Step::NeedsChoice(options)) => {
                    let player = resolution.chooser;
                    let label = resolution.label.clone();
                    let id = self.queue.park(resolution, options.clone());
                    info!(choice = %id, %player, resolution = %label, options = options.len(), "waiting for choice");
                    self.emit(EventKind::ChoiceRequired {
                        choice: id,
                        player,
                        options,
                    });
                    return;
                }
                Ok(Step::Complete) => {
                    debug!(resolution = %resolution.label, "resolution complete");
                    return;
                }
                Err(error) => {
                    warn!(
                        resolution = %resolution.label,
                        player = %resolution.chooser,
                        source = ?resolution.context.source,
                        %error,
                        "effect aborted"
                    );
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(PhaseKind::MastermindCardPlay.to_string(), "MASTERMIND_CARD_PLAY");
        assert_eq!(PhaseKind::ALL.len(), 14);
        assert_eq!(PhaseKind::ALL[0], PhaseKind::Setup);
        assert_eq!(PhaseKind::ALL[13], PhaseKind::GameOver);
    }
}
