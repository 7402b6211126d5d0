//! Characters: the pieces the Mastermind and Protagonists fight over.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::CharacterId;
use super::location::Location;
use crate::cards::{AbilityId, AbilityInstance};

/// Hidden role given to characters without one in the script.
pub const DEFAULT_ROLE: &str = "Person";

/// Trait marking a character whose incident has fired.
pub const CULPRIT_TRAIT: &str = "Culprit";

/// A mutable character stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Paranoia,
    Goodwill,
    Intrigue,
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stat::Paranoia => "paranoia",
            Stat::Goodwill => "goodwill",
            Stat::Intrigue => "intrigue",
        })
    }
}

/// The three counters every character carries.
///
/// Values never go below zero; there is no upper bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    pub paranoia: u32,
    pub goodwill: u32,
    pub intrigue: u32,
}

impl Stats {
    /// Read a stat.
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Paranoia => self.paranoia,
            Stat::Goodwill => self.goodwill,
            Stat::Intrigue => self.intrigue,
        }
    }

    /// Adjust a stat by `delta`, saturating at zero.
    pub fn adjust(&mut self, stat: Stat, delta: i32) {
        let slot = match stat {
            Stat::Paranoia => &mut self.paranoia,
            Stat::Goodwill => &mut self.goodwill,
            Stat::Intrigue => &mut self.intrigue,
        };
        *slot = slot.saturating_add_signed(delta);
    }
}

/// A character on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub location: Location,
    pub stats: Stats,
    /// Secret role. Only the Mastermind's view ever contains it.
    pub hidden_role: String,
    pub traits: BTreeSet<String>,
    pub alive: bool,
    pub abilities: Vec<AbilityInstance>,
}

impl Character {
    /// Create a living character with zeroed stats and the default role.
    #[must_use]
    pub fn new(id: CharacterId, name: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            stats: Stats::default(),
            hidden_role: DEFAULT_ROLE.to_string(),
            traits: BTreeSet::new(),
            alive: true,
            abilities: Vec::new(),
        }
    }

    /// Set the hidden role (builder pattern).
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.hidden_role = role.into();
        self
    }

    /// Add a trait (builder pattern).
    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.insert(name.into());
        self
    }

    /// Read a stat.
    #[must_use]
    pub const fn stat(&self, stat: Stat) -> u32 {
        self.stats.get(stat)
    }

    #[must_use]
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }

    /// Find an owned ability instance.
    #[must_use]
    pub fn ability(&self, id: AbilityId) -> Option<&AbilityInstance> {
        self.abilities.iter().find(|a| a.ability_id == id)
    }

    pub fn ability_mut(&mut self, id: AbilityId) -> Option<&mut AbilityInstance> {
        self.abilities.iter_mut().find(|a| a.ability_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_saturate_at_zero() {
        let mut stats = Stats::default();
        stats.adjust(Stat::Paranoia, 2);
        stats.adjust(Stat::Paranoia, -5);
        assert_eq!(stats.get(Stat::Paranoia), 0);

        stats.adjust(Stat::Goodwill, 4);
        stats.adjust(Stat::Goodwill, -1);
        assert_eq!(stats.get(Stat::Goodwill), 3);
    }

    #[test]
    fn test_character_builder() {
        let c = Character::new(CharacterId(1), "Boy Student", Location::School)
            .with_role("Key Person")
            .with_trait("Student")
            .with_trait("Student");

        assert_eq!(c.hidden_role, "Key Person");
        assert_eq!(c.traits.len(), 1);
        assert!(c.has_trait("Student"));
        assert!(c.alive);
    }
}
