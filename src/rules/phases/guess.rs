//! PROTAGONIST_GUESS and GAME_OVER.

use std::time::Duration;

use tracing::info;

use super::{on_game_ended, wrong_phase};
use crate::core::{EngineConfig, GameState, PlayerAction, PlayerId, PlayerRole};
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch, Winner};

/// The Protagonists' last chance once every loop is spent.
///
/// One wrong guess loses. The Protagonists win when the correct guesses
/// they have submitted cover every character. Giving up, or running out
/// of time, hands the game to the Mastermind.
pub struct ProtagonistGuessPhase;

fn mastermind_wins(ctx: &mut PhaseContext<'_>) {
    ctx.emit(EventKind::GameEnded {
        winner: Winner::Mastermind,
    });
}

impl Phase for ProtagonistGuessPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::ProtagonistGuess
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        if ctx.state.protagonists().next().is_none() {
            mastermind_wins(ctx);
        }
        PhaseOutcome::Stay
    }

    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        let seat = ctx.state.player(player).ok_or(ActionError::UnknownPlayer(player))?;
        if seat.role != PlayerRole::Protagonist || seat.ready {
            return Err(ActionError::NotYourTurn(player));
        }

        match action {
            PlayerAction::MakeGuess { guesses } => {
                if let Some(unknown) = guesses.iter().find(|g| ctx.state.character(g.character).is_none()) {
                    return Err(ActionError::InvalidTarget(unknown.character));
                }
                ctx.emit(EventKind::GuessSubmitted {
                    player,
                    guesses: guesses.clone(),
                });

                let wrong = guesses.iter().find(|g| {
                    ctx.state
                        .character(g.character)
                        .is_some_and(|c| c.hidden_role != g.role)
                });
                if let Some(wrong) = wrong {
                    info!(%player, character = %wrong.character, guessed = %wrong.role, "wrong guess");
                    mastermind_wins(ctx);
                    return Ok(PhaseOutcome::Stay);
                }

                for guess in guesses {
                    ctx.scratch.guesses.insert(guess.character, guess.role.clone());
                }
                let covered = ctx
                    .state
                    .characters
                    .keys()
                    .all(|id| ctx.scratch.guesses.contains_key(id));
                if covered {
                    info!(%player, "every role identified");
                    ctx.emit(EventKind::GameEnded {
                        winner: Winner::Protagonist,
                    });
                }
                Ok(PhaseOutcome::Stay)
            }
            PlayerAction::PassTurn => {
                ctx.emit(EventKind::PlayerPassed { player });
                if ctx.state.protagonists().all(|p| p.ready) {
                    info!("protagonists gave up guessing");
                    mastermind_wins(ctx);
                }
                Ok(PhaseOutcome::Stay)
            }
            _ => Err(wrong_phase(self.kind(), action)),
        }
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        info!("guess timed out");
        mastermind_wins(ctx);
        PhaseOutcome::Stay
    }

    fn exit(&self, _ctx: &mut PhaseContext<'_>) {}

    fn timeout_duration(&self, config: &EngineConfig) -> Duration {
        config.timeouts.guess()
    }

    fn awaiting(&self, state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        state.protagonists().filter(|p| !p.ready).map(|p| p.id).collect()
    }
}

/// Terminal phase. Accepts nothing.
pub struct GameOverPhase;

impl Phase for GameOverPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::GameOver
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        match ctx.state.winner {
            Some(winner) => info!(%winner, loop_index = ctx.state.loop_index, "game over"),
            None => info!("game over without a winner"),
        }
        PhaseOutcome::Stay
    }

    fn handle_action(
        &self,
        _ctx: &mut PhaseContext<'_>,
        _player: PlayerId,
        _action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        Err(ActionError::GameOver)
    }

    fn handle_event(&self, _state: &GameState, _event: &GameEvent) -> PhaseOutcome {
        PhaseOutcome::Stay
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
