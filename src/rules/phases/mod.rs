//! One unit struct per phase.

mod abilities;
mod cards;
mod day;
mod guess;
mod incidents;
mod loops;
mod play;
mod setup;

use tracing::warn;

pub use abilities::AbilitiesPhase;
pub use cards::{CardResolvePhase, CardRevealPhase};
pub use day::{DayEndPhase, DayStartPhase};
pub use guess::{GameOverPhase, ProtagonistGuessPhase};
pub use incidents::IncidentsPhase;
pub use loops::{LoopEndPhase, LoopStartPhase};
pub use play::{MastermindCardPlayPhase, ProtagonistCardPlayPhase};
pub use setup::{MastermindSetupPhase, SetupPhase};

pub(crate) use abilities::validate_ability;
pub(crate) use play::{playable_cards, validate_play};

use super::error::ActionError;
use super::phase::{Phase, PhaseContext, PhaseKind, PhaseOutcome};
use crate::core::PlayerAction;
use crate::events::{EventKind, GameEvent};
use crate::stack::QueueStatus;

static SETUP: SetupPhase = SetupPhase;
static MASTERMIND_SETUP: MastermindSetupPhase = MastermindSetupPhase;
static LOOP_START: LoopStartPhase = LoopStartPhase;
static DAY_START: DayStartPhase = DayStartPhase;
static MASTERMIND_CARD_PLAY: MastermindCardPlayPhase = MastermindCardPlayPhase;
static PROTAGONIST_CARD_PLAY: ProtagonistCardPlayPhase = ProtagonistCardPlayPhase;
static CARD_REVEAL: CardRevealPhase = CardRevealPhase;
static CARD_RESOLVE: CardResolvePhase = CardResolvePhase;
static ABILITIES: AbilitiesPhase = AbilitiesPhase;
static INCIDENTS: IncidentsPhase = IncidentsPhase;
static DAY_END: DayEndPhase = DayEndPhase;
static LOOP_END: LoopEndPhase = LoopEndPhase;
static PROTAGONIST_GUESS: ProtagonistGuessPhase = ProtagonistGuessPhase;
static GAME_OVER: GameOverPhase = GameOverPhase;

/// The behavior registered for a phase.
#[must_use]
pub fn phase_for(kind: PhaseKind) -> &'static dyn Phase {
    match kind {
        PhaseKind::Setup => &SETUP,
        PhaseKind::MastermindSetup => &MASTERMIND_SETUP,
        PhaseKind::LoopStart => &LOOP_START,
        PhaseKind::DayStart => &DAY_START,
        PhaseKind::MastermindCardPlay => &MASTERMIND_CARD_PLAY,
        PhaseKind::ProtagonistCardPlay => &PROTAGONIST_CARD_PLAY,
        PhaseKind::CardReveal => &CARD_REVEAL,
        PhaseKind::CardResolve => &CARD_RESOLVE,
        PhaseKind::Abilities => &ABILITIES,
        PhaseKind::Incidents => &INCIDENTS,
        PhaseKind::DayEnd => &DAY_END,
        PhaseKind::LoopEnd => &LOOP_END,
        PhaseKind::ProtagonistGuess => &PROTAGONIST_GUESS,
        PhaseKind::GameOver => &GAME_OVER,
    }
}

// === Shared phase behavior ===

/// Any phase but GAME_OVER leaves for GAME_OVER once a winner is declared.
fn on_game_ended(event: &GameEvent) -> PhaseOutcome {
    match event.kind {
        EventKind::GameEnded { .. } => PhaseOutcome::Goto(PhaseKind::GameOver),
        _ => PhaseOutcome::Stay,
    }
}

fn wrong_phase(kind: PhaseKind, action: &PlayerAction) -> ActionError {
    ActionError::WrongPhase {
        phase: kind,
        action: action.name(),
    }
}

/// Phases that only resolve effects are done once the queue drains.
const fn until_idle(status: QueueStatus) -> PhaseOutcome {
    match status {
        QueueStatus::Idle => PhaseOutcome::Done,
        QueueStatus::Parked(_) => PhaseOutcome::Stay,
    }
}

/// Answer a choice in a phase that accepts nothing else.
fn resume(
    ctx: &mut PhaseContext<'_>,
    kind: PhaseKind,
    player: crate::core::PlayerId,
    action: &PlayerAction,
) -> Result<PhaseOutcome, ActionError> {
    match action {
        PlayerAction::ChooseOption { choice, index } => Ok(until_idle(ctx.answer_choice(player, *choice, *index)?)),
        _ => Err(wrong_phase(kind, action)),
    }
}

/// Drop resolutions still queued when a resolving phase is left.
fn drop_unfinished(ctx: &mut PhaseContext<'_>) {
    if !ctx.queue.is_empty() {
        warn!(
            phase = %ctx.state.phase,
            queued = ctx.queue.len(),
            parked = ctx.queue.pending().is_some(),
            "leaving phase with unfinished resolutions"
        );
        ctx.queue.clear();
    }
}
