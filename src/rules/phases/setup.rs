//! SETUP and MASTERMIND_SETUP.

use std::time::Duration;

use tracing::info;

use super::{on_game_ended, wrong_phase};
use crate::core::{EngineConfig, GameState, PlayerAction, PlayerId};
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};

/// Deals every player the hand for their side.
pub struct SetupPhase;

impl Phase for SetupPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Setup
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let script = &ctx.data.script;
        let deals: Vec<(PlayerId, Vec<_>)> = ctx
            .state
            .players
            .values()
            .map(|player| {
                let cards = if player.is_mastermind() {
                    script.mastermind_cards.clone()
                } else {
                    script.protagonist_cards.clone()
                };
                (player.id, cards)
            })
            .collect();

        info!(script = %script.name, players = deals.len(), "dealing hands");
        for (player, cards) in deals {
            ctx.emit(EventKind::HandDealt { player, cards });
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

/// The Mastermind's secret setup. The scripted cast is already placed, so
/// there is nothing to decide.
pub struct MastermindSetupPhase;

impl Phase for MastermindSetupPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::MastermindSetup
    }

    fn enter(&self, _ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
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
