//! INCIDENTS.

use std::time::Duration;

use tracing::info;

use super::{drop_unfinished, on_game_ended, resume, until_idle};
use crate::core::{EngineConfig, GameState, PlayerAction, PlayerId, CULPRIT_TRAIT};
use crate::effects::ResolutionContext;
use crate::events::{EventKind, GameEvent};
use crate::rules::{ActionError, Phase, PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
use crate::stack::Resolution;
use crate::triggers::IncidentEvaluator;

/// Fires every incident due today, in script order.
///
/// Which incidents are due is decided once, on entry. A triggered incident
/// marks its culprit with the culprit trait before its effect resolves.
pub struct IncidentsPhase;

impl Phase for IncidentsPhase {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Incidents
    }

    fn enter(&self, ctx: &mut PhaseContext<'_>) -> PhaseOutcome {
        let Some(mastermind) = ctx.mastermind() else {
            return PhaseOutcome::Done;
        };
        let data = ctx.data;
        for incident in IncidentEvaluator::due(ctx.state, data) {
            let scope = incident.scope();
            info!(incident = %incident.name, culprit = %incident.culprit, day = ctx.state.day, "incident triggered");
            ctx.schedule(
                Resolution::new(
                    mastermind,
                    ResolutionContext::for_incident(Some(mastermind), scope),
                    incident.name.clone(),
                    incident.effect.clone(),
                )
                .with_prelude([
                    EventKind::IncidentTriggered {
                        incident: incident.id,
                        culprit: incident.culprit,
                        victim: incident.victim,
                    },
                    EventKind::TraitAdded {
                        character: incident.culprit,
                        name: CULPRIT_TRAIT.to_string(),
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
