//! MASTERMIND_CARD_PLAY and PROTAGONIST_CARD_PLAY.
//!
//! Cards are placed face down. A player is done once they pass, reach the
//! daily limit for their side or run out of playable cards.

use std::time::Duration;

use tracing::{debug, info};

use super::{on_game_ended, wrong_phase};
use crate::cards::{CardId, GameData};
use crate::core::{CharacterId, EngineConfig, GameState, PlayerAction, PlayerId, PlayerRole};
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};

/// Check a card placement without touching state.
pub(crate) fn validate_play(
    state: &GameState,
    data: &GameData,
    config: &EngineConfig,
    player: PlayerId,
    card: CardId,
    target: CharacterId,
) -> Result<(), ActionError> {
    let seat = state.player(player).ok_or(ActionError::UnknownPlayer(player))?;
    let instance = seat.card(card).ok_or(ActionError::CardNotInHand(card))?;
    let definition = data.card(card).ok_or(ActionError::CardNotInHand(card))?;

    if state.played_today(player, card) {
        return Err(ActionError::CardAlreadyPlayed(card));
    }
    if definition.once_per_loop && instance.used_this_loop {
        return Err(ActionError::AlreadyUsedThisLoop(definition.name.clone()));
    }
    let limit = config.cards_per_day(seat.role);
    if state.cards_played_today(player) >= limit {
        return Err(ActionError::CardLimitReached { limit });
    }
    if !state.character(target).is_some_and(|c| c.alive) {
        return Err(ActionError::InvalidTarget(target));
    }
    Ok(())
}

/// Cards `player` could still place today.
pub(crate) fn playable_cards(state: &GameState, data: &GameData, player: PlayerId) -> Vec<CardId> {
    let Some(seat) = state.player(player) else {
        return Vec::new();
    };
    seat.hand
        .iter()
        .filter(|instance| !state.played_today(player, instance.card_id))
        .filter(|instance| {
            data.card(instance.card_id)
                .is_some_and(|card| !(card.once_per_loop && instance.used_this_loop))
        })
        .map(|instance| instance.card_id)
        .collect()
}

fn finished(ctx: &PhaseContext<'_>, player: PlayerId) -> bool {
    let Some(seat) = ctx.state.player(player) else {
        return true;
    };
    seat.ready
        || ctx.state.cards_played_today(player) >= ctx.config.cards_per_day(seat.role)
        || playable_cards(ctx.state, ctx.data, player).is_empty()
}

fn pending_players(ctx: &PhaseContext<'_>, role: PlayerRole) -> Vec<PlayerId> {
    ctx.state
        .players_with_role(role)
        .into_iter()
        .filter(|&player| !finished(ctx, player))
        .collect()
}

fn waiting_on(state: &GameState, role: PlayerRole) -> Vec<PlayerId> {
    state
        .players
        .values()
        .filter(|p| p.role == role && !p.ready)
        .map(|p| p.id)
        .collect()
}

/// Shared handling for both sides' card play.
fn play_action(
    ctx: &mut PhaseContext<'_>,
    kind: PhaseKind,
    role: PlayerRole,
    player: PlayerId,
    action: &PlayerAction,
) -> Result<PhaseOutcome, ActionError> {
    let seat_role = ctx.state.player(player).map(|p| p.role);
    if seat_role != Some(role) {
        return Err(ActionError::NotYourTurn(player));
    }
    if ctx.state.player(player).is_some_and(|p| p.ready) {
        return Err(ActionError::NotYourTurn(player));
    }

    match action {
        PlayerAction::PlayCard { card, target } => {
            validate_play(ctx.state, ctx.data, ctx.config, player, *card, *target)?;
            debug!(%player, %card, %target, "card placed");
            ctx.emit(EventKind::CardPlayed {
                player,
                role,
                card: *card,
                target: *target,
            });
        }
        PlayerAction::PassTurn => {
            ctx.emit(EventKind::PlayerPassed { player });
        }
        _ => return Err(wrong_phase(kind, action)),
    }

    if pending_players(ctx, role).is_empty() {
        Ok(PhaseOutcome::Done)
    } else {
        Ok(PhaseOutcome::Stay)
    }
}

fn enter_play(ctx: &mut PhaseContext<'_>, role: PlayerRole) -> PhaseOutcome {
    if pending_players(ctx, role).is_empty() {
        PhaseOutcome::Done
    } else {
        PhaseOutcome::Stay
    }
}

/// Pass for everyone still placing cards.
fn timeout_play(ctx: &mut PhaseContext<'_>, role: PlayerRole) -> PhaseOutcome {
    for player in pending_players(ctx, role) {
        info!(%player, "card play timed out, passing");
        ctx.emit(EventKind::PlayerPassed { player });
    }
    PhaseOutcome::Done
}

pub struct MastermindCardPlayPhase;

impl Phase for MastermindCardPlayPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::MastermindCardPlay
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        enter_play(ctx, PlayerRole::Mastermind)
    }

    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        play_action(ctx, self.kind(), PlayerRole::Mastermind, player, action)
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        timeout_play(ctx, PlayerRole::Mastermind)
    }

    fn exit(&self, _ctx: &mut PhaseContext<'_>) {}

    fn timeout_duration(&self, config: &EngineConfig) -> Duration {
        config.timeouts.card_play()
    }

    fn awaiting(&self, state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        waiting_on(state, PlayerRole::Mastermind)
    }
}

pub struct ProtagonistCardPlayPhase;

impl Phase for ProtagonistCardPlayPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::ProtagonistCardPlay
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        enter_play(ctx, PlayerRole::Protagonist)
    }

    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        play_action(ctx, self.kind(), PlayerRole::Protagonist, player, action)
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        timeout_play(ctx, PlayerRole::Protagonist)
    }

    fn exit(&self, _ctx: &mut PhaseContext<'_>) {}

    fn timeout_duration(&self, config: &EngineConfig) -> Duration {
        config.timeouts.card_play()
    }

    fn awaiting(&self, state: &GameState, _scratch: &PhaseScratch) -> Vec<PlayerId> {
        waiting_on(state, PlayerRole::Protagonist)
    }
}
