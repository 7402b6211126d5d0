//! Card and ability definitions - static game data.
//!
//! Definitions never change during a game. What a card did this loop
//! (used, on which target) lives in the runtime instance instead.

use serde::{Deserialize, Serialize};

use crate::core::PlayerRole;
use crate::effects::Effect;
use crate::triggers::Condition;

/// Unique identifier for a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Unique identifier for an ability definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    /// Create a new ability ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// When an ability can fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerType {
    /// Used on demand during the ABILITIES phase.
    #[default]
    Active,
    /// Fires by itself at the start of each day, acted by the Mastermind.
    DayStart,
}

/// A playable card.
///
/// Cards are played face down on a character, revealed together and then
/// resolved. The card's target is the `AbilityTarget` of its effect.
///
/// ## Example
///
/// ```
/// use tragedy_looper::cards::{CardConfig, CardId};
/// use tragedy_looper::core::{PlayerRole, Stat};
/// use tragedy_looper::effects::{Effect, TargetSelector};
///
/// let card = CardConfig::new(
///     CardId::new(1),
///     "Paranoia +1",
///     PlayerRole::Mastermind,
///     Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, 1),
/// );
/// assert!(!card.once_per_loop);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    pub id: CardId,
    pub name: String,
    /// Which side's hand the card belongs to.
    pub owner: PlayerRole,
    pub effect: Effect,
    #[serde(default)]
    pub once_per_loop: bool,
}

impl CardConfig {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, owner: PlayerRole, effect: Effect) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            effect,
            once_per_loop: false,
        }
    }

    /// Limit the card to one play per loop (builder pattern).
    #[must_use]
    pub fn once_per_loop(mut self) -> Self {
        self.once_per_loop = true;
        self
    }
}

/// A character ability.
///
/// Goodwill abilities are used by Protagonists; role abilities by the
/// Mastermind. `condition` is checked with the owning character as the
/// ability user before every use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityConfig {
    pub id: AbilityId,
    pub name: String,
    /// Which side may use the ability.
    pub user: PlayerRole,
    pub effect: Effect,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub trigger: TriggerType,
    #[serde(default)]
    pub once_per_loop: bool,
}

impl AbilityConfig {
    /// Create an active ability with no usage condition.
    #[must_use]
    pub fn new(id: AbilityId, name: impl Into<String>, user: PlayerRole, effect: Effect) -> Self {
        Self {
            id,
            name: name.into(),
            user,
            effect,
            condition: None,
            trigger: TriggerType::Active,
            once_per_loop: false,
        }
    }

    /// Require a condition before use (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the trigger type (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerType) -> Self {
        self.trigger = trigger;
        self
    }

    /// Limit the ability to one use per loop (builder pattern).
    #[must_use]
    pub fn once_per_loop(mut self) -> Self {
        self.once_per_loop = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stat;
    use crate::effects::TargetSelector;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
        assert_eq!(format!("{}", AbilityId::new(3)), "Ability(3)");
    }

    #[test]
    fn test_ability_builder() {
        let ability = AbilityConfig::new(
            AbilityId::new(1),
            "Calm",
            PlayerRole::Protagonist,
            Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, -1),
        )
        .with_condition(Condition::stat_at_least(TargetSelector::AbilityUser, Stat::Goodwill, 2))
        .once_per_loop();

        assert!(ability.once_per_loop);
        assert!(ability.condition.is_some());
        assert_eq!(ability.trigger, TriggerType::Active);
    }

    #[test]
    fn test_card_serialization_defaults() {
        let card = CardConfig::new(
            CardId::new(1),
            "Intrigue +1",
            PlayerRole::Mastermind,
            Effect::adjust(TargetSelector::AbilityTarget, Stat::Intrigue, 1),
        );
        let mut json: serde_json::Value = serde_json::to_value(&card).unwrap();
        json.as_object_mut().unwrap().remove("once_per_loop");
        let deserialized: CardConfig = serde_json::from_value(json).unwrap();
        assert_eq!(card, deserialized);
    }
}
