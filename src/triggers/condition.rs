//! Conditions and their evaluation.
//!
//! A `Condition` is a side-effect free boolean tree over game state. It
//! gates abilities, fires incidents and decides whether a loop was lost.

use serde::{Deserialize, Serialize};

use crate::core::{CharacterId, GameState, IncidentId, Location, Stat};
use crate::effects::{ResolutionContext, TargetError, TargetResolver, TargetSelector};

/// Integer comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Gt,
    Lt,
    Eq,
    Ge,
    Le,
}

impl Comparator {
    #[must_use]
    pub const fn compare(self, left: u32, right: u32) -> bool {
        match self {
            Comparator::Gt => left > right,
            Comparator::Lt => left < right,
            Comparator::Eq => left == right,
            Comparator::Ge => left >= right,
            Comparator::Le => left <= right,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Eq => "==",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
        })
    }
}

/// Right-hand side of a stat comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Literal(u32),
    /// The same stat on another character.
    StatOf(TargetSelector),
}

/// A boolean condition over game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    // === Leaves ===

    /// A stat of the target compared against an operand.
    Stat {
        target: TargetSelector,
        stat: Stat,
        op: Comparator,
        value: Operand,
    },

    /// The target stands at `location`.
    AtLocation {
        target: TargetSelector,
        location: Location,
    },

    /// Number of living characters at `location` compared against `count`.
    Population {
        location: Location,
        op: Comparator,
        count: u32,
    },

    HasTrait {
        target: TargetSelector,
        name: String,
    },

    IsAlive { target: TargetSelector },

    /// The incident already fired this loop.
    IncidentOccurred { incident: IncidentId },

    Always,

    // === Combinators ===

    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// Takes exactly one operand; any other count is an evaluation error.
    Not(Vec<Condition>),
}

impl Condition {
    /// `target.stat >= value`.
    #[must_use]
    pub fn stat_at_least(target: TargetSelector, stat: Stat, value: u32) -> Self {
        Self::Stat {
            target,
            stat,
            op: Comparator::Ge,
            value: Operand::Literal(value),
        }
    }

    /// Compare a stat against a literal.
    #[must_use]
    pub fn stat(target: TargetSelector, stat: Stat, op: Comparator, value: u32) -> Self {
        Self::Stat {
            target,
            stat,
            op,
            value: Operand::Literal(value),
        }
    }

    /// Compare a stat of two characters.
    #[must_use]
    pub fn stat_vs(target: TargetSelector, stat: Stat, op: Comparator, other: TargetSelector) -> Self {
        Self::Stat {
            target,
            stat,
            op,
            value: Operand::StatOf(other),
        }
    }

    #[must_use]
    pub const fn at_location(target: TargetSelector, location: Location) -> Self {
        Self::AtLocation { target, location }
    }

    #[must_use]
    pub fn has_trait(target: TargetSelector, name: impl Into<String>) -> Self {
        Self::HasTrait {
            target,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn negate(condition: Condition) -> Self {
        Self::Not(vec![condition])
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Condition::Stat { .. } => "stat",
            Condition::AtLocation { .. } => "at_location",
            Condition::Population { .. } => "population",
            Condition::HasTrait { .. } => "has_trait",
            Condition::IsAlive { .. } => "is_alive",
            Condition::IncidentOccurred { .. } => "incident_occurred",
            Condition::Always => "always",
            Condition::And(_) => "and",
            Condition::Or(_) => "or",
            Condition::Not(_) => "not",
        }
    }
}

/// Errors raised while evaluating a condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// A leaf's subject resolved to nobody: a set selector matched no
    /// one, or an explicit character does not exist.
    #[error("condition `{condition}` has no subject: `{selector}` matched no character")]
    NotFound {
        condition: &'static str,
        selector: TargetSelector,
    },

    #[error("NOT takes exactly one condition, got {0}")]
    NotArity(usize),

    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Evaluates conditions against game state.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate an optional condition. A missing condition is true.
    ///
    /// AND and OR evaluate left to right. AND stops at the first false,
    /// OR at the first true; both return the first error they encounter
    /// before stopping.
    pub fn evaluate(
        state: &GameState,
        condition: Option<&Condition>,
        context: &ResolutionContext,
    ) -> Result<bool, ConditionError> {
        match condition {
            None => Ok(true),
            Some(condition) => Self::check(state, condition, context),
        }
    }

    /// Evaluate a condition.
    pub fn check(
        state: &GameState,
        condition: &Condition,
        context: &ResolutionContext,
    ) -> Result<bool, ConditionError> {
        match condition {
            Condition::Stat {
                target,
                stat,
                op,
                value,
            } => {
                let right = match value {
                    Operand::Literal(n) => *n,
                    Operand::StatOf(other) => {
                        let id = Self::subjects(state, condition, other, context)?[0];
                        Self::stat_of(state, id, *stat)?
                    }
                };
                for id in Self::subjects(state, condition, target, context)? {
                    if op.compare(Self::stat_of(state, id, *stat)?, right) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            Condition::AtLocation { target, location } => Ok(Self::subjects(state, condition, target, context)?
                .iter()
                .filter_map(|id| state.character(*id))
                .any(|c| c.location == *location)),

            Condition::Population { location, op, count } => {
                let population = state.characters_at(*location).count();
                let population = u32::try_from(population).unwrap_or(u32::MAX);
                Ok(op.compare(population, *count))
            }

            Condition::HasTrait { target, name } => Ok(Self::subjects(state, condition, target, context)?
                .iter()
                .filter_map(|id| state.character(*id))
                .any(|c| c.has_trait(name))),

            Condition::IsAlive { target } => Ok(Self::subjects(state, condition, target, context)?
                .iter()
                .filter_map(|id| state.character(*id))
                .any(|c| c.alive)),

            Condition::IncidentOccurred { incident } => Ok(state.triggered_incidents.contains(incident)),

            Condition::Always => Ok(true),

            Condition::And(conditions) => {
                for inner in conditions {
                    if !Self::check(state, inner, context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Condition::Or(conditions) => {
                for inner in conditions {
                    if Self::check(state, inner, context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            Condition::Not(conditions) => match conditions.as_slice() {
                [inner] => Ok(!Self::check(state, inner, context)?),
                other => Err(ConditionError::NotArity(other.len())),
            },
        }
    }

    /// Resolve a leaf's subject; an empty match or an unknown character is
    /// `NotFound`.
    fn subjects(
        state: &GameState,
        condition: &Condition,
        selector: &TargetSelector,
        context: &ResolutionContext,
    ) -> Result<smallvec::SmallVec<[CharacterId; 4]>, ConditionError> {
        let not_found = || ConditionError::NotFound {
            condition: condition.name(),
            selector: selector.clone(),
        };
        match TargetResolver::resolve(state, selector, context) {
            Ok(targets) if targets.is_empty() => Err(not_found()),
            Ok(targets) => Ok(targets),
            Err(TargetError::CharacterNotFound(_)) => Err(not_found()),
            Err(error) => Err(error.into()),
        }
    }

    fn stat_of(state: &GameState, id: CharacterId, stat: Stat) -> Result<u32, ConditionError> {
        state
            .character(id)
            .map(|c| c.stat(stat))
            .ok_or(ConditionError::Target(TargetError::CharacterNotFound(id)))
    }
}
