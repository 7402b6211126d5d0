//! Effect definitions.
//!
//! Effects are pure configuration attached to cards, abilities and
//! incidents. They never touch state: resolving one yields events, and
//! only the event pipeline mutates the game.

use serde::{Deserialize, Serialize};

use super::targeting::{TargetCount, TargetSelector, TargetSpec};
use crate::core::{Movement, Stat};

/// Game effects.
///
/// ## Example
///
/// ```
/// use tragedy_looper::core::{Movement, Stat};
/// use tragedy_looper::effects::{Effect, TargetSelector};
///
/// // "Paranoia +1 on the card's target, then it moves sideways"
/// let effect = Effect::sequence([
///     Effect::adjust(TargetSelector::AbilityTarget, Stat::Paranoia, 1),
///     Effect::movement(TargetSelector::AbilityTarget, Movement::Horizontal),
/// ]);
/// assert_eq!(effect.kind(), tragedy_looper::effects::EffectKind::Sequence);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    // === Leaves ===

    Move {
        target: TargetSpec,
        movement: Movement,
    },

    /// Add `amount` (may be negative) to a stat. Stats floor at zero.
    AdjustStat {
        target: TargetSpec,
        stat: Stat,
        amount: i32,
    },

    AddTrait {
        target: TargetSpec,
        name: String,
    },

    RemoveTrait {
        target: TargetSpec,
        name: String,
    },

    Kill { target: TargetSpec },

    // === Compound ===

    /// Sub-effects in declaration order; the first failure aborts the rest.
    Sequence(Vec<Effect>),

    /// Exactly one sub-effect, picked by a player.
    ChooseOne(Vec<Effect>),
}

/// Fieldless tag of an [`Effect`], the key of the handler table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Move,
    AdjustStat,
    AddTrait,
    RemoveTrait,
    Kill,
    Sequence,
    ChooseOne,
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EffectKind::Move => "move",
            EffectKind::AdjustStat => "adjust_stat",
            EffectKind::AddTrait => "add_trait",
            EffectKind::RemoveTrait => "remove_trait",
            EffectKind::Kill => "kill",
            EffectKind::Sequence => "sequence",
            EffectKind::ChooseOne => "choose_one",
        })
    }
}

impl Effect {
    // === Builders ===

    /// Adjust a stat on one target.
    #[must_use]
    pub fn adjust(selector: TargetSelector, stat: Stat, amount: i32) -> Self {
        Self::AdjustStat {
            target: TargetSpec::one(selector),
            stat,
            amount,
        }
    }

    #[must_use]
    pub fn movement(selector: TargetSelector, movement: Movement) -> Self {
        Self::Move {
            target: TargetSpec::one(selector),
            movement,
        }
    }

    #[must_use]
    pub fn add_trait(selector: TargetSelector, name: impl Into<String>) -> Self {
        Self::AddTrait {
            target: TargetSpec::one(selector),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn remove_trait(selector: TargetSelector, name: impl Into<String>) -> Self {
        Self::RemoveTrait {
            target: TargetSpec::one(selector),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn kill(selector: TargetSelector) -> Self {
        Self::Kill {
            target: TargetSpec::one(selector),
        }
    }

    #[must_use]
    pub fn sequence(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::Sequence(effects.into_iter().collect())
    }

    #[must_use]
    pub fn choose_one(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::ChooseOne(effects.into_iter().collect())
    }

    /// Make a leaf affect every candidate of its selector.
    ///
    /// Compound effects are returned unchanged.
    #[must_use]
    pub fn on_all(mut self) -> Self {
        if let Some(spec) = self.target_mut() {
            spec.count = TargetCount::All;
        }
        self
    }

    // === Accessors ===

    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Effect::Move { .. } => EffectKind::Move,
            Effect::AdjustStat { .. } => EffectKind::AdjustStat,
            Effect::AddTrait { .. } => EffectKind::AddTrait,
            Effect::RemoveTrait { .. } => EffectKind::RemoveTrait,
            Effect::Kill { .. } => EffectKind::Kill,
            Effect::Sequence(_) => EffectKind::Sequence,
            Effect::ChooseOne(_) => EffectKind::ChooseOne,
        }
    }

    /// Targeting of a leaf effect.
    #[must_use]
    pub const fn target(&self) -> Option<&TargetSpec> {
        match self {
            Effect::Move { target, .. }
            | Effect::AdjustStat { target, .. }
            | Effect::AddTrait { target, .. }
            | Effect::RemoveTrait { target, .. }
            | Effect::Kill { target } => Some(target),
            Effect::Sequence(_) | Effect::ChooseOne(_) => None,
        }
    }

    fn target_mut(&mut self) -> Option<&mut TargetSpec> {
        match self {
            Effect::Move { target, .. }
            | Effect::AdjustStat { target, .. }
            | Effect::AddTrait { target, .. }
            | Effect::RemoveTrait { target, .. }
            | Effect::Kill { target } => Some(target),
            Effect::Sequence(_) | Effect::ChooseOne(_) => None,
        }
    }

    /// Sub-effects of a compound effect.
    #[must_use]
    pub fn children(&self) -> &[Effect] {
        match self {
            Effect::Sequence(effects) | Effect::ChooseOne(effects) => effects.as_slice(),
            _ => &[],
        }
    }

    /// Human-readable summary, used as a choice label.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Effect::Move { target, movement } => format!("move {} {:?}", target.selector, movement),
            Effect::AdjustStat { target, stat, amount } => {
                format!("{} {:+} on {}", stat, amount, target.selector)
            }
            Effect::AddTrait { target, name } => format!("add {} to {}", name, target.selector),
            Effect::RemoveTrait { target, name } => format!("remove {} from {}", name, target.selector),
            Effect::Kill { target } => format!("kill {}", target.selector),
            Effect::Sequence(effects) => effects.iter().map(Effect::describe).collect::<Vec<_>>().join(", then "),
            Effect::ChooseOne(effects) => effects.iter().map(Effect::describe).collect::<Vec<_>>().join(" or "),
        }
    }
}
