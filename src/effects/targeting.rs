//! Effect targeting.
//!
//! - `TargetSelector`: declarative description of who an effect touches
//! - `TargetSpec`: a selector plus how many of its candidates are affected
//! - `ResolutionContext`: who is acting, with what, at whom
//! - `TargetResolver`: expands a selector into concrete character ids

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{AbilityId, CardId};
use crate::core::{CharacterId, GameState, IncidentId, Location, PlayerId};

/// Resolved character ids. Most selectors yield a handful at most.
pub type Targets = SmallVec<[CharacterId; 4]>;

/// Who an effect or condition refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSelector {
    /// One specific character, alive or dead.
    Character(CharacterId),
    /// Every living character.
    All,
    /// Every living character at a location.
    AtLocation(Location),
    /// The character whose ability is being used.
    AbilityUser,
    /// The explicit target of the card or ability in flight.
    AbilityTarget,
    /// The culprit of the incident being resolved.
    Culprit,
    /// The victim of the incident being resolved.
    Victim,
}

impl std::fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetSelector::Character(id) => write!(f, "{}", id),
            TargetSelector::All => f.write_str("all"),
            TargetSelector::AtLocation(location) => write!(f, "at {}", location),
            TargetSelector::AbilityUser => f.write_str("ability user"),
            TargetSelector::AbilityTarget => f.write_str("ability target"),
            TargetSelector::Culprit => f.write_str("culprit"),
            TargetSelector::Victim => f.write_str("victim"),
        }
    }
}

/// How many of a selector's candidates an effect touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetCount {
    /// Exactly one; several candidates means a player has to pick.
    #[default]
    One,
    /// Every candidate at once.
    All,
}

/// How a leaf effect picks its targets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    pub selector: TargetSelector,
    #[serde(default)]
    pub count: TargetCount,
}

impl TargetSpec {
    /// Target a single candidate.
    #[must_use]
    pub const fn one(selector: TargetSelector) -> Self {
        Self {
            selector,
            count: TargetCount::One,
        }
    }

    /// Target every candidate.
    #[must_use]
    pub const fn all(selector: TargetSelector) -> Self {
        Self {
            selector,
            count: TargetCount::All,
        }
    }
}

impl From<TargetSelector> for TargetSpec {
    fn from(selector: TargetSelector) -> Self {
        Self::one(selector)
    }
}

/// What put an effect in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSource {
    Card(CardId),
    Ability(AbilityId),
    Incident(IncidentId),
}

/// Culprit and victim of the incident being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentScope {
    pub incident: IncidentId,
    pub culprit: CharacterId,
    pub victim: Option<CharacterId>,
}

/// Context for target resolution.
///
/// Carries what the context-relative selectors (`AbilityUser`,
/// `AbilityTarget`, `Culprit`, `Victim`) resolve against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// The acting player.
    pub actor: Option<PlayerId>,
    pub source: Option<EffectSource>,
    /// Character using the ability.
    pub user: Option<CharacterId>,
    /// Explicit target chosen when the card or ability was played.
    pub target: Option<CharacterId>,
    pub incident: Option<IncidentScope>,
}

impl ResolutionContext {
    /// Empty context: only absolute selectors resolve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a card played on `target`.
    #[must_use]
    pub fn for_card(player: PlayerId, card: CardId, target: CharacterId) -> Self {
        Self {
            actor: Some(player),
            source: Some(EffectSource::Card(card)),
            user: None,
            target: Some(target),
            incident: None,
        }
    }

    /// Context for an ability of `user` aimed at `target`.
    #[must_use]
    pub fn for_ability(
        player: PlayerId,
        ability: AbilityId,
        user: CharacterId,
        target: Option<CharacterId>,
    ) -> Self {
        Self {
            actor: Some(player),
            source: Some(EffectSource::Ability(ability)),
            user: Some(user),
            target,
            incident: None,
        }
    }

    /// Context for an incident's effect, acted by `player`.
    #[must_use]
    pub fn for_incident(player: Option<PlayerId>, scope: IncidentScope) -> Self {
        Self {
            actor: player,
            source: Some(EffectSource::Incident(scope.incident)),
            user: None,
            target: None,
            incident: Some(scope),
        }
    }

    /// Set the ability user (builder pattern).
    #[must_use]
    pub fn with_user(mut self, user: CharacterId) -> Self {
        self.user = Some(user);
        self
    }

    /// Set the explicit target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: CharacterId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Errors raised while resolving a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("character {0} does not exist")]
    CharacterNotFound(CharacterId),

    /// The selector only makes sense inside a scope that is not active.
    #[error("selector `{selector}` cannot be resolved here")]
    Unresolvable { selector: TargetSelector },

    /// The context does not carry what the selector refers to.
    #[error("selector `{selector}` needs context that was not supplied")]
    MissingContext { selector: TargetSelector },
}

/// Expands selectors against live state.
pub struct TargetResolver;

impl TargetResolver {
    /// Resolve a selector to character ids.
    ///
    /// Set-valued selectors (`All`, `AtLocation`) yield living characters
    /// in id order and may be empty. Every other selector yields exactly
    /// one existing character or fails.
    pub fn resolve(
        state: &GameState,
        selector: &TargetSelector,
        context: &ResolutionContext,
    ) -> Result<Targets, TargetError> {
        let single = match selector {
            TargetSelector::All => {
                return Ok(state
                    .characters
                    .values()
                    .filter(|c| c.alive)
                    .map(|c| c.id)
                    .collect());
            }
            TargetSelector::AtLocation(location) => {
                return Ok(state.characters_at(*location).map(|c| c.id).collect());
            }
            TargetSelector::Character(id) => *id,
            TargetSelector::AbilityUser => context
                .user
                .ok_or_else(|| TargetError::MissingContext { selector: selector.clone() })?,
            TargetSelector::AbilityTarget => context
                .target
                .ok_or_else(|| TargetError::MissingContext { selector: selector.clone() })?,
            TargetSelector::Culprit => context
                .incident
                .map(|scope| scope.culprit)
                .ok_or_else(|| TargetError::Unresolvable { selector: selector.clone() })?,
            TargetSelector::Victim => context
                .incident
                .and_then(|scope| scope.victim)
                .ok_or_else(|| TargetError::Unresolvable { selector: selector.clone() })?,
        };

        if state.character(single).is_none() {
            return Err(TargetError::CharacterNotFound(single));
        }
        let mut targets = Targets::new();
        targets.push(single);
        Ok(targets)
    }

    /// Resolve a selector that must name exactly one character.
    ///
    /// Set-valued selectors resolving to several characters yield the
    /// first in id order.
    pub fn resolve_one(
        state: &GameState,
        selector: &TargetSelector,
        context: &ResolutionContext,
    ) -> Result<Option<CharacterId>, TargetError> {
        Ok(Self::resolve(state, selector, context)?.first().copied())
    }
}
