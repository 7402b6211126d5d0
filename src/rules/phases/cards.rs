//! CARD_REVEAL and CARD_RESOLVE.

use std::time::Duration;

use tracing::{debug, warn};

use super::{drop_unfinished, on_game_ended, resume, until_idle, wrong_phase};
use crate::core::{EngineConfig, GameState, PlayerAction, PlayerId};
use crate::effects::ResolutionContext;
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
use crate::stack::Resolution;

/// Turns every placed card face up at once.
pub struct CardRevealPhase;

impl Phase for CardRevealPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::CardReveal
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let cards = ctx.state.day_played.clone();
        debug!(cards = cards.len(), "cards revealed");
        ctx.emit(EventKind::CardsRevealed { cards });
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

/// Resolves the day's cards: the Mastermind's first, then the
/// Protagonists', each side in the order played.
pub struct CardResolvePhase;

impl Phase for CardResolvePhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::CardResolve
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let data = ctx.data;
        let mut played = ctx.state.day_played.clone();
        let mastermind = ctx.mastermind();
        played.sort_by_key(|p| Some(p.player) != mastermind);

        for card in played {
            let Some(config) = data.card(card.card) else {
                warn!(card = %card.card, player = %card.player, "played card has no definition");
                continue;
            };
            ctx.schedule(
                Resolution::new(
                    card.player,
                    ResolutionContext::for_card(card.player, card.card, card.target),
                    config.name.clone(),
                    Some(config.effect.clone()),
                )
                .with_prelude([EventKind::CardResolved {
                    player: card.player,
                    card: card.card,
                    target: card.target,
                }]),
            );
        }
        until_idle(ctx.run_queue())
    }

    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        resume(ctx, self.kind(), player, action)
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        until_idle(ctx.answer_default())
    }

    fn exit(&self, ctx: &mut PhaseContext<'_>) {
        drop_unfinished(ctx);
    }

    fn timeout_duration(&self, _config: &EngineConfig) -> Duration {
        Duration::ZERO
    }

    fn awaiting(&self, _state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        Vec::new()
    }
}
