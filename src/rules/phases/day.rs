//! DAY_START and DAY_END.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{drop_unfinished, on_game_ended, resume, until_idle, wrong_phase};
use crate::cards::{AbilityId, TriggerType};
use crate::core::{CharacterId, EngineConfig, GameState, PlayerAction, PlayerId};
use crate::effects::ResolutionContext;
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
use crate::stack::Resolution;
use crate::triggers::ConditionEvaluator;

/// Advances the day and fires day-start abilities.
///
/// Day-start abilities are acted by the Mastermind, in character order.
/// Their conditions are checked when the day starts, before any of them
/// resolves.
pub struct DayStartPhase;

impl Phase for DayStartPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::DayStart
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let day = ctx.state.day + 1;
        debug!(loop_index = ctx.state.loop_index, day, "day started");
        ctx.emit(EventKind::DayStarted { day });

        let Some(mastermind) = ctx.mastermind() else {
            return PhaseOutcome::Done;
        };
        let data = ctx.data;

        let owned: Vec<(CharacterId, AbilityId, bool)> = ctx
            .state
            .characters
            .values()
            .filter(|c| c.alive)
            .flat_map(|c| c.abilities.iter().map(move |a| (c.id, a.ability_id, a.used_this_loop)))
            .collect();

        for (character, ability, used) in owned {
            let Some(config) = data.ability(ability) else { continue };
            if config.trigger != TriggerType::DayStart || (config.once_per_loop && used) {
                continue;
            }
            let context = ResolutionContext::for_ability(mastermind, ability, character, None);
            match ConditionEvaluator::evaluate(ctx.state, config.condition.as_ref(), &context) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    warn!(%character, %ability, %error, "day-start condition failed to evaluate");
                    continue;
                }
            }
            info!(%character, ability = %config.name, "day-start ability fires");
            ctx.schedule(
                Resolution::new(mastermind, context, config.name.clone(), Some(config.effect.clone())).with_prelude([
                    EventKind::AbilityUsed {
                        player: mastermind,
                        character,
                        ability,
                        target: None,
                    },
                ]),
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

/// Checks the script's loss conditions. The first one to hold in a loop
/// is the loop's tragedy.
pub struct DayEndPhase;

impl Phase for DayEndPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::DayEnd
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let context = ResolutionContext::new();
        let lost = ctx.data.script.loss_conditions.iter().any(|condition| {
            match ConditionEvaluator::check(ctx.state, condition, &context) {
                Ok(holds) => holds,
                Err(error) => {
                    warn!(condition = condition.name(), %error, "loss condition failed to evaluate");
                    false
                }
            }
        });

        if lost && !ctx.state.tragedy_this_loop {
            let (loop_index, day) = (ctx.state.loop_index, ctx.state.day);
            info!(loop_index, day, "tragedy occurred");
            ctx.emit(EventKind::TragedyOccurred { loop_index, day });
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
