//! Game data accessor.
//!
//! `GameData` holds every definition a game needs: the script, cards,
//! abilities, characters and incidents. It is built once when a game is
//! created, validated, then shared read-only (behind an `Arc`) by the
//! engine for the lifetime of the game.
//!
//! Loading the data from files is the job of an external loader; the
//! struct is serde-deserializable so any format serde supports works.
//!
//! ## Example
//!
//! ```
//! use tragedy_looper::cards::{CharacterConfig, GameData, ScriptConfig};
//! use tragedy_looper::core::{CharacterId, Location};
//!
//! let mut data = GameData::new(ScriptConfig::new("First Steps", 3, 4));
//! data.add_character(CharacterConfig::new(CharacterId::new(1), "Shrine Maiden", Location::Shrine));
//! data.script.cast(CharacterId::new(1), "Key Person");
//!
//! assert!(data.validate().is_ok());
//! assert_eq!(data.role_of(CharacterId::new(1)), "Key Person");
//! ```

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{AbilityConfig, AbilityId, CardConfig, CardId};
use crate::core::{CharacterId, IncidentId, Location, DEFAULT_ROLE};
use crate::effects::Effect;
use crate::triggers::Condition;

/// Errors found while validating game data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("script references unknown character {0}")]
    UnknownCharacter(CharacterId),

    #[error("script references unknown card {0}")]
    UnknownCard(CardId),

    #[error("character {character} references unknown ability {ability}")]
    UnknownAbility {
        character: CharacterId,
        ability: AbilityId,
    },

    #[error("script references unknown incident {0}")]
    UnknownIncident(IncidentId),

    #[error("script must have at least one loop and one day")]
    EmptySchedule,

    #[error("a game needs exactly one Mastermind, found {0}")]
    MastermindCount(usize),
}

/// Static description of a character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub id: CharacterId,
    pub name: String,
    pub start_location: Location,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

impl CharacterConfig {
    #[must_use]
    pub fn new(id: CharacterId, name: impl Into<String>, start_location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            start_location,
            traits: Vec::new(),
            abilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: AbilityId) -> Self {
        self.abilities.push(ability);
        self
    }
}

/// A scripted incident.
///
/// The incident fires during the INCIDENTS phase of `day` (or of every day
/// when `day` is `None`) once `trigger` holds. It fires at most once per
/// loop. `effect` is resolved with the culprit and victim in scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentConfig {
    pub id: IncidentId,
    pub name: String,
    #[serde(default)]
    pub day: Option<u32>,
    pub culprit: CharacterId,
    #[serde(default)]
    pub victim: Option<CharacterId>,
    pub trigger: Condition,
    #[serde(default)]
    pub effect: Option<Effect>,
}

impl IncidentConfig {
    #[must_use]
    pub fn new(id: IncidentId, name: impl Into<String>, culprit: CharacterId, trigger: Condition) -> Self {
        Self {
            id,
            name: name.into(),
            day: None,
            culprit,
            victim: None,
            trigger,
            effect: None,
        }
    }

    #[must_use]
    pub fn on_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    #[must_use]
    pub fn with_victim(mut self, victim: CharacterId) -> Self {
        self.victim = Some(victim);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// The scenario being played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub name: String,
    /// Number of loops the Protagonists get.
    pub loops: u32,
    pub days_per_loop: u32,
    /// Hidden role per character. Characters not listed are `Person`.
    #[serde(default)]
    pub cast: BTreeMap<CharacterId, String>,
    #[serde(default)]
    pub incidents: Vec<IncidentId>,
    /// The Protagonists lose the loop as soon as any of these holds at
    /// the end of a day.
    #[serde(default)]
    pub loss_conditions: Vec<Condition>,
    #[serde(default)]
    pub mastermind_cards: Vec<CardId>,
    /// Dealt to every Protagonist.
    #[serde(default)]
    pub protagonist_cards: Vec<CardId>,
}

impl ScriptConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, loops: u32, days_per_loop: u32) -> Self {
        Self {
            name: name.into(),
            loops,
            days_per_loop,
            cast: BTreeMap::new(),
            incidents: Vec::new(),
            loss_conditions: Vec::new(),
            mastermind_cards: Vec::new(),
            protagonist_cards: Vec::new(),
        }
    }

    /// Assign a hidden role.
    pub fn cast(&mut self, character: CharacterId, role: impl Into<String>) {
        self.cast.insert(character, role.into());
    }
}

/// Serialized form of [`GameData`]: plain lists, keyed on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GameDataFile {
    script: ScriptConfig,
    #[serde(default)]
    cards: Vec<CardConfig>,
    #[serde(default)]
    abilities: Vec<AbilityConfig>,
    #[serde(default)]
    characters: Vec<CharacterConfig>,
    #[serde(default)]
    incidents: Vec<IncidentConfig>,
}

/// Read-only registry of all definitions for one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GameDataFile", into = "GameDataFile")]
pub struct GameData {
    pub script: ScriptConfig,
    cards: FxHashMap<CardId, CardConfig>,
    abilities: FxHashMap<AbilityId, AbilityConfig>,
    characters: BTreeMap<CharacterId, CharacterConfig>,
    incidents: BTreeMap<IncidentId, IncidentConfig>,
}

impl From<GameDataFile> for GameData {
    fn from(file: GameDataFile) -> Self {
        let mut data = GameData::new(file.script);
        file.cards.into_iter().for_each(|c| data.add_card(c));
        file.abilities.into_iter().for_each(|a| data.add_ability(a));
        file.characters.into_iter().for_each(|c| data.add_character(c));
        file.incidents.into_iter().for_each(|i| data.add_incident(i));
        data
    }
}

impl From<GameData> for GameDataFile {
    fn from(data: GameData) -> Self {
        let mut cards: Vec<_> = data.cards.into_values().collect();
        cards.sort_by_key(|c| c.id);
        let mut abilities: Vec<_> = data.abilities.into_values().collect();
        abilities.sort_by_key(|a| a.id);
        Self {
            script: data.script,
            cards,
            abilities,
            characters: data.characters.into_values().collect(),
            incidents: data.incidents.into_values().collect(),
        }
    }
}

impl GameData {
    /// Create an empty registry for a script.
    #[must_use]
    pub fn new(script: ScriptConfig) -> Self {
        Self {
            script,
            cards: FxHashMap::default(),
            abilities: FxHashMap::default(),
            characters: BTreeMap::new(),
            incidents: BTreeMap::new(),
        }
    }

    /// Register a card. Replaces any card with the same id.
    pub fn add_card(&mut self, card: CardConfig) {
        self.cards.insert(card.id, card);
    }

    pub fn add_ability(&mut self, ability: AbilityConfig) {
        self.abilities.insert(ability.id, ability);
    }

    pub fn add_character(&mut self, character: CharacterConfig) {
        self.characters.insert(character.id, character);
    }

    pub fn add_incident(&mut self, incident: IncidentConfig) {
        self.incidents.insert(incident.id, incident);
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardConfig> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn ability(&self, id: AbilityId) -> Option<&AbilityConfig> {
        self.abilities.get(&id)
    }

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&CharacterConfig> {
        self.characters.get(&id)
    }

    #[must_use]
    pub fn incident(&self, id: IncidentId) -> Option<&IncidentConfig> {
        self.incidents.get(&id)
    }

    /// Iterate over characters in id order.
    pub fn characters(&self) -> impl Iterator<Item = &CharacterConfig> {
        self.characters.values()
    }

    /// Incidents of the script, in script order.
    pub fn script_incidents(&self) -> impl Iterator<Item = &IncidentConfig> {
        self.script.incidents.iter().filter_map(|id| self.incidents.get(id))
    }

    /// Hidden role of a character.
    #[must_use]
    pub fn role_of(&self, id: CharacterId) -> &str {
        self.script.cast.get(&id).map_or(DEFAULT_ROLE, String::as_str)
    }

    /// Check that every id the script and characters reference exists.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.script.loops == 0 || self.script.days_per_loop == 0 {
            return Err(DataError::EmptySchedule);
        }
        for character in self.script.cast.keys() {
            if !self.characters.contains_key(character) {
                return Err(DataError::UnknownCharacter(*character));
            }
        }
        for card in self
            .script
            .mastermind_cards
            .iter()
            .chain(&self.script.protagonist_cards)
        {
            if !self.cards.contains_key(card) {
                return Err(DataError::UnknownCard(*card));
            }
        }
        for character in self.characters.values() {
            for ability in &character.abilities {
                if !self.abilities.contains_key(ability) {
                    return Err(DataError::UnknownAbility {
                        character: character.id,
                        ability: *ability,
                    });
                }
            }
        }
        for incident in &self.script.incidents {
            let config = self
                .incidents
                .get(incident)
                .ok_or(DataError::UnknownIncident(*incident))?;
            if !self.characters.contains_key(&config.culprit) {
                return Err(DataError::UnknownCharacter(config.culprit));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerRole, Stat};
    use crate::effects::TargetSelector;

    fn sample() -> GameData {
        let mut script = ScriptConfig::new("Sample", 2, 3);
        script.cast(CharacterId(1), "Killer");
        script.mastermind_cards.push(CardId(10));
        script.incidents.push(IncidentId(1));

        let mut data = GameData::new(script);
        data.add_character(CharacterConfig::new(CharacterId(1), "Office Worker", Location::City));
        data.add_character(CharacterConfig::new(CharacterId(2), "Doctor", Location::Hospital));
        data.add_card(CardConfig::new(
            CardId(10),
            "Paranoia +1",
            PlayerRole::Mastermind,
            Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, 1),
        ));
        data.add_incident(IncidentConfig::new(
            IncidentId(1),
            "Murder",
            CharacterId(1),
            Condition::stat_at_least(TargetSelector::Character(CharacterId(1)), Stat::Paranoia, 3),
        ));
        data
    }

    #[test]
    fn test_lookup_and_roles() {
        let data = sample();
        assert!(data.validate().is_ok());
        assert_eq!(data.role_of(CharacterId(1)), "Killer");
        assert_eq!(data.role_of(CharacterId(2)), DEFAULT_ROLE);
        assert_eq!(data.characters().count(), 2);
        assert_eq!(data.script_incidents().count(), 1);
        assert!(data.card(CardId(10)).is_some());
        assert!(data.card(CardId(11)).is_none());
    }

    #[test]
    fn test_validate_unknown_card() {
        let mut data = sample();
        data.script.protagonist_cards.push(CardId(99));
        assert_eq!(data.validate(), Err(DataError::UnknownCard(CardId(99))));
    }

    #[test]
    fn test_validate_unknown_ability() {
        let mut data = sample();
        data.add_character(
            CharacterConfig::new(CharacterId(3), "Nurse", Location::Hospital).with_ability(AbilityId(5)),
        );
        assert_eq!(
            data.validate(),
            Err(DataError::UnknownAbility {
                character: CharacterId(3),
                ability: AbilityId(5)
            })
        );
    }

    #[test]
    fn test_validate_empty_schedule() {
        let mut data = sample();
        data.script.days_per_loop = 0;
        assert_eq!(data.validate(), Err(DataError::EmptySchedule));
    }

    #[test]
    fn test_serialization() {
        let data = sample();
        let json = serde_json::to_string(&data).unwrap();
        let deserialized: GameData = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.script, data.script);
        assert_eq!(deserialized.card(CardId(10)), data.card(CardId(10)));
        assert_eq!(deserialized.incident(IncidentId(1)), data.incident(IncidentId(1)));
    }
}
