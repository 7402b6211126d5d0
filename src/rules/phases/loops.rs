//! LOOP_START and LOOP_END.

use std::time::Duration;

use tracing::info;

use super::{on_game_ended, wrong_phase};
use crate::core::{EngineConfig, GameState, PlayerAction, PlayerId};
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch, Winner};

/// Starts the next loop, or moves to the final guess once every scripted
/// loop has been played.
pub struct LoopStartPhase;

impl Phase for LoopStartPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::LoopStart
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let loops = ctx.data.script.loops;
        if ctx.state.loop_index >= loops {
            info!(loops, "no loops left, protagonists must guess");
            return PhaseOutcome::Done;
        }
        let loop_index = ctx.state.loop_index + 1;
        info!(loop_index, of = loops, "loop started");
        ctx.emit(EventKind::LoopStarted { loop_index });
        PhaseOutcome::Done
    }

    fn handle_action(
        &self,
        _ctx: &mut PhaseContext<'_>,
        _player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        Err(wrong_phase(self.kind(), action))
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, _ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        PhaseOutcome::Stay
    }

    fn exit(&self, _ctx: &mut PhaseContext<'_>) {}

    fn timeout_duration(&self, _config: &EngineConfig) -> Duration {
        Duration::ZERO
    }

    fn awaiting(&self, _state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        Vec::new()
    }
}

/// Closes the loop. Surviving a loop without a tragedy wins the game for
/// the Protagonists.
pub struct LoopEndPhase;

impl Phase for LoopEndPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::LoopEnd
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let loop_index = ctx.state.loop_index;
        let survived = !ctx.state.tragedy_this_loop;
        info!(loop_index, survived, "loop ended");
        ctx.emit(EventKind::LoopEnded { loop_index, survived });
        if survived {
            ctx.emit(EventKind::GameEnded {
                winner: Winner::Protagonist,
            });
        }
        PhaseOutcome::Done
    }

    fn handle_action(
        &self,
        _ctx: &mut PhaseContext<'_>,
        _player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        Err(wrong_phase(self.kind(), action))
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, _ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        PhaseOutcome::Stay
    }

    fn exit(&self, _ctx: &mut PhaseContext<'_>) {}

    fn timeout_duration(&self, _config: &EngineConfig) -> Duration {
        Duration::ZERO
    }

    fn awaiting(&self, _state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        Vec::new()
    }
}
