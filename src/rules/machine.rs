//! The phase state machine.

use tracing::{debug, info, warn};

use super::error::ActionError;
use super::phase::{PhaseContext, PhaseKind, PhaseOutcome, PhaseScratch};
use super::phases::phase_for;
use super::transitions::TransitionTable;
use crate::core::{PlayerAction, PlayerId};
use crate::events::EventKind;

/// Drives the active phase and performs transitions.
///
/// Transitions are settled in a loop: a phase that finishes on entry hands
/// control straight to the next one, so one message can walk several
/// phases without recursion. A transition requested by an event handler
/// takes precedence over the outcome the phase itself returned.
#[derive(Debug)]
pub struct PhaseMachine {
    table: TransitionTable,
    entries: u64,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new(TransitionTable::standard())
    }
}

impl PhaseMachine {
    #[must_use]
    pub const fn new(table: TransitionTable) -> Self {
        Self { table, entries: 0 }
    }

    /// Number of phase entries so far. Changes on every transition.
    #[must_use]
    pub const fn entries(&self) -> u64 {
        self.entries
    }

    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Enter the current phase and settle.
    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) {
        let phase = phase_for(ctx.state.phase);
        info!(phase = %phase.kind(), "starting phase machine");
        self.entries += 1;
        let outcome = phase.enter(ctx);
        self.settle(ctx, outcome);
    }

    /// Route an action to the active phase.
    ///
    /// While a choice is pending only its answer is accepted.
    pub fn handle_action(
        &mut self,
        ctx: &mut PhaseContext<'_>,
        player: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), ActionError> {
        if ctx.state.is_over() {
            return Err(ActionError::GameOver);
        }
        if ctx.state.player(player).is_none() {
            return Err(ActionError::UnknownPlayer(player));
        }
        let answering = matches!(action, PlayerAction::ChooseOption { .. });
        match ctx.queue.pending() {
            Some(pending) if !answering => return Err(ActionError::ChoicePending(pending.id)),
            None if answering => return Err(ActionError::NoPendingChoice),
            _ => {}
        }

        let outcome = phase_for(ctx.state.phase).handle_action(ctx, player, action)?;
        self.settle(ctx, outcome);
        Ok(())
    }

    /// Apply the active phase's default action.
    pub fn handle_timeout(&mut self, ctx: &mut PhaseContext<'_>) {
        let outcome = phase_for(ctx.state.phase).handle_timeout(ctx);
        self.settle(ctx, outcome);
    }

    fn settle(&mut self, ctx: &mut PhaseContext<'_>, outcome: PhaseOutcome) {
        let mut outcome = outcome;
        loop {
            let current = ctx.state.phase;
            let next = match ctx.events.take_request().unwrap_or(outcome) {
                PhaseOutcome::Stay => return,
                PhaseOutcome::Goto(kind) => kind,
                PhaseOutcome::Done => match self.table.next(current, ctx.state, ctx.data) {
                    Some(kind) => kind,
                    None => {
                        warn!(phase = %current, "phase finished with no transition out");
                        return;
                    }
                },
            };
            self.transition(ctx, current, next);
            outcome = phase_for(next).enter(ctx);
        }
    }

    fn transition(&mut self, ctx: &mut PhaseContext<'_>, from: PhaseKind, to: PhaseKind) {
        phase_for(from).exit(ctx);
        *ctx.scratch = PhaseScratch::default();
        ctx.emit(EventKind::PhaseChanged { from, to });
        self.entries += 1;
        if to == PhaseKind::GameOver || from == PhaseKind::LoopEnd {
            info!(%from, %to, loop_index = ctx.state.loop_index, day = ctx.state.day, "phase transition");
        } else {
            debug!(%from, %to, loop_index = ctx.state.loop_index, day = ctx.state.day, "phase transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CharacterConfig, GameData, ScriptConfig};
    use crate::core::{CharacterId, EngineConfig, GameState, Location, Player, PlayerRole};
    use crate::effects::{ChoiceId, EffectResolver};
    use crate::events::{EventHandlers, EventManager};
    use crate::rules::{Guard, Winner};
    use crate::stack::ResolutionQueue;

    const MM: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    struct Fixture {
        data: GameData,
        config: EngineConfig,
        state: GameState,
        events: EventManager,
        effects: EffectResolver,
        queue: ResolutionQueue,
        scratch: PhaseScratch,
    }

    impl Fixture {
        fn new() -> Self {
            let mut data = GameData::new(ScriptConfig::new("Machine", 1, 1));
            data.add_character(CharacterConfig::new(CharacterId(1), "Boy Student", Location::School));
            let state = GameState::new(
                &data,
                [
                    Player::new(MM, "MM", PlayerRole::Mastermind),
                    Player::new(P1, "P1", PlayerRole::Protagonist),
                ],
            );
            Self {
                data,
                config: EngineConfig::default(),
                state,
                events: EventManager::new(EventHandlers::standard()),
                effects: EffectResolver::default(),
                queue: ResolutionQueue::new(),
                scratch: PhaseScratch::default(),
            }
        }

        fn ctx(&mut self) -> PhaseContext<'_> {
            PhaseContext {
                state: &mut self.state,
                data: &self.data,
                config: &self.config,
                events: &mut self.events,
                effects: &self.effects,
                queue: &mut self.queue,
                scratch: &mut self.scratch,
            }
        }
    }

    #[test]
    fn test_start_settles_through_administrative_phases() {
        let mut fx = Fixture::new();
        let mut machine = PhaseMachine::default();

        machine.start(&mut fx.ctx());

        // SETUP through CARD_RESOLVE finish on entry.
        assert_eq!(fx.state.phase, PhaseKind::Abilities);
        assert_eq!(machine.entries(), 9);
        assert_eq!((fx.state.loop_index, fx.state.day), (1, 1));
    }

    #[test]
    fn test_surviving_the_last_day_ends_the_game() {
        let mut fx = Fixture::new();
        let mut machine = PhaseMachine::default();
        machine.start(&mut fx.ctx());

        machine.handle_action(&mut fx.ctx(), MM, &PlayerAction::PassTurn).unwrap();
        assert_eq!(fx.state.phase, PhaseKind::Abilities);
        machine.handle_action(&mut fx.ctx(), P1, &PlayerAction::PassTurn).unwrap();

        assert_eq!(fx.state.phase, PhaseKind::GameOver);
        assert_eq!(fx.state.winner, Some(Winner::Protagonist));
        assert_eq!(
            machine.handle_action(&mut fx.ctx(), P1, &PlayerAction::PassTurn),
            Err(ActionError::GameOver)
        );
    }

    #[test]
    fn test_rejections_leave_phase_alone() {
        let mut fx = Fixture::new();
        let mut machine = PhaseMachine::default();
        machine.start(&mut fx.ctx());
        let before = fx.events.last_seq();

        let answer = PlayerAction::ChooseOption {
            choice: ChoiceId(1),
            index: 0,
        };
        assert_eq!(
            machine.handle_action(&mut fx.ctx(), MM, &answer),
            Err(ActionError::NoPendingChoice)
        );
        assert_eq!(
            machine.handle_action(&mut fx.ctx(), PlayerId(7), &PlayerAction::PassTurn),
            Err(ActionError::UnknownPlayer(PlayerId(7)))
        );
        assert_eq!(
            machine.handle_action(&mut fx.ctx(), P1, &PlayerAction::PassTurn),
            Err(ActionError::NotYourTurn(P1))
        );

        assert_eq!(fx.state.phase, PhaseKind::Abilities);
        assert_eq!(fx.events.last_seq(), before);
    }

    #[test]
    fn test_missing_transition_stays_put() {
        let mut fx = Fixture::new();
        let table = TransitionTable::new().with(PhaseKind::Setup, PhaseKind::MastermindSetup, Guard::Always);
        let mut machine = PhaseMachine::new(table);

        machine.start(&mut fx.ctx());

        assert_eq!(fx.state.phase, PhaseKind::MastermindSetup);
        assert_eq!(machine.entries(), 2);
    }
}
