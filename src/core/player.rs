//! Players and what they know.
//!
//! A game has exactly one Mastermind and one or more Protagonists.
//! Players are keyed by [`PlayerId`]; the id says nothing about the role.

use serde::{Deserialize, Serialize};

use super::entity::{CharacterId, IncidentId};
use crate::cards::{CardId, CardInstance};

/// Player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Which side a player is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    Mastermind,
    Protagonist,
}

/// Handle tying a player to an external action generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSession {
    /// Free-form label for logs (model name, bot name).
    pub label: String,
}

/// A fact the Protagonists learned in an earlier loop.
///
/// Deductions survive loop resets; everything else on the board does not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deduction {
    IncidentOccurred {
        loop_index: u32,
        incident: IncidentId,
        culprit: CharacterId,
    },
    CharacterDied {
        loop_index: u32,
        character: CharacterId,
    },
}

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: PlayerRole,
    pub hand: Vec<CardInstance>,
    /// Set when the player is done for the current phase.
    pub ready: bool,
    /// Accumulated notes. Always empty for the Mastermind.
    pub deductions: Vec<Deduction>,
    pub ai: Option<AiSession>,
}

impl Player {
    /// Create a human-controlled player with an empty hand.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, role: PlayerRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            hand: Vec::new(),
            ready: false,
            deductions: Vec::new(),
            ai: None,
        }
    }

    /// Mark the player as AI-controlled (builder pattern).
    #[must_use]
    pub fn with_ai(mut self, label: impl Into<String>) -> Self {
        self.ai = Some(AiSession { label: label.into() });
        self
    }

    #[must_use]
    pub const fn is_mastermind(&self) -> bool {
        matches!(self.role, PlayerRole::Mastermind)
    }

    #[must_use]
    pub const fn is_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Find a card in hand.
    #[must_use]
    pub fn card(&self, card: CardId) -> Option<&CardInstance> {
        self.hand.iter().find(|c| c.card_id == card)
    }

    pub fn card_mut(&mut self, card: CardId) -> Option<&mut CardInstance> {
        self.hand.iter_mut().find(|c| c.card_id == card)
    }
}
