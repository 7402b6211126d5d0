//! Rejected player actions.

use super::phase::PhaseKind;
use crate::cards::{AbilityId, CardId};
use crate::core::{CharacterId, PlayerId};
use crate::effects::{ChoiceId, EffectError};

/// Why an action was rejected. State is never touched by a rejected action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("`{action}` is not accepted during {phase}")]
    WrongPhase {
        phase: PhaseKind,
        action: &'static str,
    },

    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("{0} is not in hand")]
    CardNotInHand(CardId),

    #[error("{0} was already played today")]
    CardAlreadyPlayed(CardId),

    #[error("{0} was already used this loop")]
    AlreadyUsedThisLoop(String),

    #[error("{character} has no ability {ability}")]
    AbilityNotFound {
        character: CharacterId,
        ability: AbilityId,
    },

    /// Wrong side, wrong trigger, already used today, or its condition fails.
    #[error("{0} cannot be used now")]
    AbilityUnavailable(AbilityId),

    #[error("{0} is not a valid target")]
    InvalidTarget(CharacterId),

    #[error("no choice is pending")]
    NoPendingChoice,

    #[error("{0} must be answered first")]
    ChoicePending(ChoiceId),

    #[error("option {index} does not exist ({available} available)")]
    InvalidChoice { index: usize, available: usize },

    #[error("no more than {limit} cards per day")]
    CardLimitReached { limit: usize },

    #[error("the game is over")]
    GameOver,

    #[error(transparent)]
    Effect(#[from] EffectError),
}
