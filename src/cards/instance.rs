//! Runtime card and ability state.
//!
//! Instances point at their immutable definition by id and carry only
//! what changes during a loop. Both are reset whenever a loop starts.

use serde::{Deserialize, Serialize};

use super::definition::{AbilityId, CardId};
use crate::core::CharacterId;

/// A card in a player's hand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    pub card_id: CardId,
    /// Set when the card is played; only once-per-loop cards are held to it.
    pub used_this_loop: bool,
    /// Where the card was last played.
    pub target: Option<CharacterId>,
}

impl CardInstance {
    #[must_use]
    pub const fn new(card_id: CardId) -> Self {
        Self {
            card_id,
            used_this_loop: false,
            target: None,
        }
    }

    /// Clear loop-scoped state.
    pub fn reset(&mut self) {
        self.used_this_loop = false;
        self.target = None;
    }
}

/// An ability owned by a character.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityInstance {
    pub ability_id: AbilityId,
    pub used_this_loop: bool,
    pub target: Option<CharacterId>,
}

impl AbilityInstance {
    #[must_use]
    pub const fn new(ability_id: AbilityId) -> Self {
        Self {
            ability_id,
            used_this_loop: false,
            target: None,
        }
    }

    /// Clear loop-scoped state.
    pub fn reset(&mut self) {
        self.used_this_loop = false;
        self.target = None;
    }
}
