//! ABILITIES: the Mastermind acts first, then the Protagonists.

use std::time::Duration;

use tracing::{debug, info};

use super::{drop_unfinished, on_game_ended, wrong_phase};
use crate::cards::{AbilityConfig, AbilityId, GameData, TriggerType};
use crate::core::{CharacterId, EngineConfig, GameState, PlayerAction, PlayerId, PlayerRole};
use crate::effects::{EffectError, ResolutionContext};
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
use crate::stack::Resolution;
use crate::triggers::ConditionEvaluator;

/// Whether the ability was already used today, from the day log.
fn used_today(state: &GameState, character: CharacterId, ability: AbilityId) -> bool {
    state.day_log.iter().any(|event| {
        matches!(
            &event.kind,
            EventKind::AbilityUsed { character: c, ability: a, .. } if *c == character && *a == ability
        )
    })
}

/// Check an ability use without touching state.
pub(crate) fn validate_ability<'d>(
    state: &GameState,
    data: &'d GameData,
    player: PlayerId,
    character: CharacterId,
    ability: AbilityId,
    target: Option<CharacterId>,
) -> Result<(&'d AbilityConfig, ResolutionContext), ActionError> {
    let role = state.player(player).ok_or(ActionError::UnknownPlayer(player))?.role;
    let owner = state
        .character(character)
        .filter(|c| c.alive)
        .ok_or(ActionError::InvalidTarget(character))?;
    let instance = owner
        .ability(ability)
        .ok_or(ActionError::AbilityNotFound { character, ability })?;
    let config = data
        .ability(ability)
        .ok_or(ActionError::AbilityNotFound { character, ability })?;

    if config.user != role || config.trigger != TriggerType::Active {
        return Err(ActionError::AbilityUnavailable(ability));
    }
    if config.once_per_loop && instance.used_this_loop {
        return Err(ActionError::AlreadyUsedThisLoop(config.name.clone()));
    }
    if used_today(state, character, ability) {
        return Err(ActionError::AbilityUnavailable(ability));
    }
    if let Some(target) = target {
        if !state.character(target).is_some_and(|c| c.alive) {
            return Err(ActionError::InvalidTarget(target));
        }
    }

    let context = ResolutionContext::for_ability(player, ability, character, target);
    match ConditionEvaluator::evaluate(state, config.condition.as_ref(), &context) {
        Ok(true) => Ok((config, context)),
        Ok(false) => Err(ActionError::AbilityUnavailable(ability)),
        Err(error) => Err(EffectError::from(error).into()),
    }
}

fn turn(scratch: &PhaseScratch) -> PlayerRole {
    scratch.ability_turn.unwrap_or(PlayerRole::Mastermind)
}

fn protagonists_done(state: &GameState) -> bool {
    state.protagonists().all(|p| p.ready)
}

pub struct AbilitiesPhase;

impl Phase for AbilitiesPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Abilities
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        ctx.scratch.ability_turn = Some(PlayerRole::Mastermind);
        PhaseOutcome::Stay
    }

    fn handle_action(
        &self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<PhaseOutcome, ActionError> {
        if let PlayerAction::ChooseOption { choice, index } = action {
            ctx.answer_choice(player, *choice, *index)?;
            return Ok(PhaseOutcome::Stay);
        }

        let seat = ctx.state.player(player).ok_or(ActionError::UnknownPlayer(player))?;
        if seat.role != turn(ctx.scratch) || seat.ready {
            return Err(ActionError::NotYourTurn(player));
        }
        let role = seat.role;

        match action {
            PlayerAction::UseAbility {
                character,
                ability,
                target,
            } => {
                let data = ctx.data;
                let (config, context) = validate_ability(ctx.state, data, player, *character, *ability, *target)?;
                info!(%player, %character, ability = %config.name, "ability used");
                ctx.emit(EventKind::AbilityUsed {
                    player,
                    character: *character,
                    ability: *ability,
                    target: *target,
                });
                ctx.schedule(Resolution::new(
                    player,
                    context,
                    config.name.clone(),
                    Some(config.effect.clone()),
                ));
                ctx.run_queue();
                Ok(PhaseOutcome::Stay)
            }
            PlayerAction::PassTurn => {
                ctx.emit(EventKind::PlayerPassed { player });
                if role == PlayerRole::Mastermind {
                    debug!("mastermind passed, protagonists' turn");
                    ctx.scratch.ability_turn = Some(PlayerRole::Protagonist);
                }
                if protagonists_done(ctx.state) {
                    return Ok(PhaseOutcome::Done);
                }
                Ok(PhaseOutcome::Stay)
            }
            _ => Err(wrong_phase(self.kind(), action)),
        }
    }

    fn handle_event(&self, _state: &GameState, event: &GameEvent) -> PhaseOutcome {
        on_game_ended(event)
    }

    /// Resolve a pending choice by default, otherwise pass for whoever
    /// holds the sub-turn.
    fn handle_timeout(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        if ctx.queue.pending().is_some() {
            ctx.answer_default();
            return PhaseOutcome::Stay;
        }
        let role = turn(ctx.scratch);
        let waiting: Vec<PlayerId> = ctx
            .state
            .players
            .values()
            .filter(|p| p.role == role && !p.ready)
            .map(|p| p.id)
            .collect();
        for player in waiting {
            info!(%player, ?role, "abilities timed out, passing");
            ctx.emit(EventKind::PlayerPassed { player });
        }
        if role == PlayerRole::Mastermind {
            ctx.scratch.ability_turn = Some(PlayerRole::Protagonist);
            if !protagonists_done(ctx.state) {
                return PhaseOutcome::Stay;
            }
        }
        PhaseOutcome::Done
    }

    fn exit(&self, ctx: &mut PhaseContext<'_>) {
        drop_unfinished(ctx);
    }

    fn timeout_duration(&self, config: &EngineConfig) -> Duration {
        config.timeouts.abilities()
    }

    fn awaiting(&self, state: &GameState, scratch: &PhaseScratch) -> Vec<PlayerId> {
        let role = turn(scratch);
        state
            .players
            .values()
            .filter(|p| p.role == role && !p.ready)
            .map(|p| p.id)
            .collect()
    }
}
