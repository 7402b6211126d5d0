//! Player actions: the only input the engine accepts.
//!
//! Humans and AI players submit the same payloads. The engine validates
//! every action against the active phase; invalid ones are logged and
//! dropped without touching state.

use serde::{Deserialize, Serialize};

use super::entity::CharacterId;
use crate::cards::{AbilityId, CardId};
use crate::effects::ChoiceId;

/// A single guess about a character's hidden role.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGuess {
    pub character: CharacterId,
    pub role: String,
}

impl RoleGuess {
    #[must_use]
    pub fn new(character: CharacterId, role: impl Into<String>) -> Self {
        Self {
            character,
            role: role.into(),
        }
    }
}

/// Everything a player can ask the engine to do.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Place a card from hand face down on a character.
    PlayCard { card: CardId, target: CharacterId },

    /// Use an ability owned by `character`.
    UseAbility {
        character: CharacterId,
        ability: AbilityId,
        target: Option<CharacterId>,
    },

    /// Guess hidden roles during the final guess.
    MakeGuess { guesses: Vec<RoleGuess> },

    /// Answer a pending choice.
    ChooseOption { choice: ChoiceId, index: usize },

    /// Done for this phase.
    PassTurn,
}

impl PlayerAction {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            PlayerAction::PlayCard { .. } => "play_card",
            PlayerAction::UseAbility { .. } => "use_ability",
            PlayerAction::MakeGuess { .. } => "make_guess",
            PlayerAction::ChooseOption { .. } => "choose_option",
            PlayerAction::PassTurn => "pass_turn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(PlayerAction::PassTurn.name(), "pass_turn");
        let play = PlayerAction::PlayCard {
            card: CardId(1),
            target: CharacterId(2),
        };
        assert_eq!(play.name(), "play_card");
    }

    #[test]
    fn test_action_serialization() {
        let action = PlayerAction::MakeGuess {
            guesses: vec![RoleGuess::new(CharacterId(1), "Killer")],
        };
        let json = serde_json::to_string(&action).unwrap();
        let deserialized: PlayerAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, deserialized);
    }
}
