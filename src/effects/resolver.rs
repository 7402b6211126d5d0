//! Effect resolution.
//!
//! The resolver turns an effect into events; it never writes state.
//!
//! ## Protocol
//!
//! 1. [`EffectResolver::resolve_choices`] lists what the effect could do.
//! 2. More than one option and no choice supplied: resolution stops and
//!    the caller raises a choice. Nothing is applied.
//! 3. Otherwise [`EffectResolver::apply`] pushes the domain events for the
//!    chosen option into an outbox.
//!
//! Dispatch goes through an explicit [`EffectHandlers`] table keyed by
//! [`EffectKind`]. A kind with no handler is a hard error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::effect::{Effect, EffectKind};
use super::targeting::{ResolutionContext, TargetCount, TargetError, TargetResolver, TargetSpec, Targets};
use crate::core::{CharacterId, GameState};
use crate::events::EventKind;
use crate::stack::{Frame, Resolution};
use crate::triggers::ConditionError;

/// Correlation id of a parked choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub u64);

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Choice({})", self.0)
    }
}

/// What picking an option means.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceValue {
    /// Apply a leaf effect to these characters.
    Targets(Targets),
    /// Run this sub-effect of a `ChooseOne`.
    Branch(usize),
    /// Run a sequence as declared.
    Proceed,
}

/// One option offered to a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub label: String,
    pub value: ChoiceValue,
}

/// Errors raised while resolving an effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("no handler registered for effect `{0}`")]
    NoHandler(EffectKind),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error("option {index} is not valid here ({available} available)")]
    InvalidChoice { index: usize, available: usize },

    /// `apply` was called on an ambiguous effect without a choice.
    #[error("effect needs a choice between {count} options")]
    ChoiceRequired { count: usize },

    #[error("character {0} does not exist")]
    CharacterNotFound(CharacterId),
}

/// Lists the options of an effect.
pub type ResolveChoicesFn =
    fn(&EffectResolver, &GameState, &Effect, &ResolutionContext) -> Result<Vec<Choice>, EffectError>;

/// Pushes the events of an effect for the chosen option.
pub type ApplyFn = fn(
    &EffectResolver,
    &GameState,
    &Effect,
    &ResolutionContext,
    Option<&Choice>,
    &mut Vec<EventKind>,
) -> Result<(), EffectError>;

/// Handler pair for one effect kind.
#[derive(Clone, Copy)]
pub struct EffectHandler {
    pub resolve_choices: ResolveChoicesFn,
    pub apply: ApplyFn,
}

/// Dispatch table from effect kind to handler.
#[derive(Clone, Default)]
pub struct EffectHandlers {
    table: FxHashMap<EffectKind, EffectHandler>,
}

impl std::fmt::Debug for EffectHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

impl EffectHandlers {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handlers for every built-in effect kind.
    #[must_use]
    pub fn standard() -> Self {
        let leaf = EffectHandler {
            resolve_choices: leaf_choices,
            apply: apply_leaf,
        };
        let mut handlers = Self::empty();
        for kind in [
            EffectKind::Move,
            EffectKind::AdjustStat,
            EffectKind::AddTrait,
            EffectKind::RemoveTrait,
            EffectKind::Kill,
        ] {
            handlers.register(kind, leaf);
        }
        handlers.register(
            EffectKind::Sequence,
            EffectHandler {
                resolve_choices: sequence_choices,
                apply: apply_sequence,
            },
        );
        handlers.register(
            EffectKind::ChooseOne,
            EffectHandler {
                resolve_choices: branch_choices,
                apply: apply_branch,
            },
        );
        handlers
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(&mut self, kind: EffectKind, handler: EffectHandler) -> Option<EffectHandler> {
        self.table.insert(kind, handler)
    }

    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<EffectHandler> {
        self.table.get(&kind).copied()
    }
}

/// Result of one [`EffectResolver::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A part of the effect was applied; these events must be processed
    /// before the next step.
    Emitted(Vec<EventKind>),
    /// The top of the walk needs a choice.
    NeedsChoice(Vec<Choice>),
    /// Nothing left to do.
    Complete,
}

/// Effect resolver.
#[derive(Clone, Debug)]
pub struct EffectResolver {
    handlers: EffectHandlers,
}

impl Default for EffectResolver {
    fn default() -> Self {
        Self::new(EffectHandlers::standard())
    }
}

impl EffectResolver {
    #[must_use]
    pub const fn new(handlers: EffectHandlers) -> Self {
        Self { handlers }
    }

    fn handler(&self, kind: EffectKind) -> Result<EffectHandler, EffectError> {
        self.handlers.get(kind).ok_or(EffectError::NoHandler(kind))
    }

    /// List the options an effect offers.
    pub fn resolve_choices(
        &self,
        state: &GameState,
        effect: &Effect,
        context: &ResolutionContext,
    ) -> Result<Vec<Choice>, EffectError> {
        (self.handler(effect.kind())?.resolve_choices)(self, state, effect, context)
    }

    /// Push the events of `effect` into `out`.
    ///
    /// Without a choice the effect must be unambiguous. Events produced by
    /// one part of a compound effect are not visible to the next part: the
    /// whole call reads the state as it was on entry.
    pub fn apply(
        &self,
        state: &GameState,
        effect: &Effect,
        context: &ResolutionContext,
        choice: Option<&Choice>,
        out: &mut Vec<EventKind>,
    ) -> Result<(), EffectError> {
        (self.handler(effect.kind())?.apply)(self, state, effect, context, choice, out)
    }

    /// Advance a resolution by one applied part.
    ///
    /// Sequences are walked child by child so that each part sees the
    /// events of the previous ones once the caller has processed them.
    /// `chosen` answers the choice the resolution was parked on.
    pub fn step(
        &self,
        state: &GameState,
        resolution: &mut Resolution,
        mut chosen: Option<Choice>,
    ) -> Result<Step, EffectError> {
        loop {
            let Some(top) = resolution.frames.last_mut() else {
                return Ok(Step::Complete);
            };

            if let Effect::Sequence(children) = &top.effect {
                match children.get(top.next).cloned() {
                    Some(child) => {
                        top.next += 1;
                        resolution.frames.push(Frame::new(child));
                    }
                    None => {
                        resolution.frames.pop();
                    }
                }
                continue;
            }

            let choice = match chosen.take() {
                Some(choice) => Some(choice),
                None => {
                    let mut options = self.resolve_choices(state, &top.effect, &resolution.context)?;
                    if options.len() > 1 {
                        return Ok(Step::NeedsChoice(options));
                    }
                    options.pop()
                }
            };

            let Some(frame) = resolution.frames.pop() else {
                return Ok(Step::Complete);
            };
            if let Effect::ChooseOne(children) = frame.effect {
                if let Some(choice) = choice {
                    let ChoiceValue::Branch(index) = choice.value else {
                        return Err(EffectError::InvalidChoice {
                            index: choice.index,
                            available: children.len(),
                        });
                    };
                    let available = children.len();
                    let child = children
                        .into_iter()
                        .nth(index)
                        .ok_or(EffectError::InvalidChoice { index, available })?;
                    resolution.frames.push(Frame::new(child));
                }
                continue;
            }

            let mut out = Vec::new();
            if let Some(choice) = &choice {
                self.apply(state, &frame.effect, &resolution.context, Some(choice), &mut out)?;
            }
            return Ok(Step::Emitted(out));
        }
    }
}

// === Leaf effects ===

fn spec_of(effect: &Effect) -> Result<&TargetSpec, EffectError> {
    effect.target().ok_or(EffectError::NoHandler(effect.kind()))
}

fn name_of(state: &GameState, id: CharacterId) -> String {
    state
        .character(id)
        .map_or_else(|| id.to_string(), |c| c.name.clone())
}

fn leaf_choices(
    _resolver: &EffectResolver,
    state: &GameState,
    effect: &Effect,
    context: &ResolutionContext,
) -> Result<Vec<Choice>, EffectError> {
    let spec = spec_of(effect)?;
    let targets = TargetResolver::resolve(state, &spec.selector, context)?;
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    Ok(match spec.count {
        TargetCount::One => targets
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let mut chosen = Targets::new();
                chosen.push(*id);
                Choice {
                    index,
                    label: name_of(state, *id),
                    value: ChoiceValue::Targets(chosen),
                }
            })
            .collect(),
        TargetCount::All => {
            let label = targets.iter().map(|id| name_of(state, *id)).collect::<Vec<_>>().join(", ");
            vec![Choice {
                index: 0,
                label,
                value: ChoiceValue::Targets(targets),
            }]
        }
    })
}

/// Pick the option to apply: the supplied one, or the only one there is.
fn settle_choice(
    resolver: &EffectResolver,
    state: &GameState,
    effect: &Effect,
    context: &ResolutionContext,
    choice: Option<&Choice>,
) -> Result<Option<Choice>, EffectError> {
    if let Some(choice) = choice {
        return Ok(Some(choice.clone()));
    }
    let mut options = resolver.resolve_choices(state, effect, context)?;
    if options.len() > 1 {
        return Err(EffectError::ChoiceRequired { count: options.len() });
    }
    Ok(options.pop())
}

fn apply_leaf(
    resolver: &EffectResolver,
    state: &GameState,
    effect: &Effect,
    context: &ResolutionContext,
    choice: Option<&Choice>,
    out: &mut Vec<EventKind>,
) -> Result<(), EffectError> {
    let Some(choice) = settle_choice(resolver, state, effect, context, choice)? else {
        return Ok(());
    };
    let ChoiceValue::Targets(targets) = &choice.value else {
        return Err(EffectError::InvalidChoice {
            index: choice.index,
            available: 0,
        });
    };

    for &id in targets {
        let character = state.character(id).ok_or(EffectError::CharacterNotFound(id))?;
        match effect {
            Effect::Move { movement, .. } => {
                let to = movement.apply(character.location);
                if to != character.location {
                    out.push(EventKind::CharacterMoved {
                        character: id,
                        from: character.location,
                        to,
                    });
                }
            }
            Effect::AdjustStat { stat, amount, .. } => out.push(EventKind::StatAdjusted {
                character: id,
                stat: *stat,
                amount: *amount,
            }),
            Effect::AddTrait { name, .. } => out.push(EventKind::TraitAdded {
                character: id,
                name: name.clone(),
            }),
            Effect::RemoveTrait { name, .. } => out.push(EventKind::TraitRemoved {
                character: id,
                name: name.clone(),
            }),
            Effect::Kill { .. } => {
                if character.alive {
                    out.push(EventKind::CharacterKilled { character: id });
                }
            }
            Effect::Sequence(_) | Effect::ChooseOne(_) => {
                return Err(EffectError::NoHandler(effect.kind()));
            }
        }
    }
    Ok(())
}

// === Compound effects ===

fn sequence_choices(
    _resolver: &EffectResolver,
    _state: &GameState,
    effect: &Effect,
    _context: &ResolutionContext,
) -> Result<Vec<Choice>, EffectError> {
    Ok(vec![Choice {
        index: 0,
        label: effect.describe(),
        value: ChoiceValue::Proceed,
    }])
}

fn apply_sequence(
    resolver: &EffectResolver,
    state: &GameState,
    effect: &Effect,
    context: &ResolutionContext,
    _choice: Option<&Choice>,
    out: &mut Vec<EventKind>,
) -> Result<(), EffectError> {
    for child in effect.children() {
        resolver.apply(state, child, context, None, out)?;
    }
    Ok(())
}

fn branch_choices(
    _resolver: &EffectResolver,
    _state: &GameState,
    effect: &Effect,
    _context: &ResolutionContext,
) -> Result<Vec<Choice>, EffectError> {
    Ok(effect
        .children()
        .iter()
        .enumerate()
        .map(|(index, child)| Choice {
            index,
            label: child.describe(),
            value: ChoiceValue::Branch(index),
        })
        .collect())
}

fn apply_branch(
    resolver: &EffectResolver,
    state: &GameState,
    effect: &Effect,
    context: &ResolutionContext,
    choice: Option<&Choice>,
    out: &mut Vec<EventKind>,
) -> Result<(), EffectError> {
    let Some(choice) = settle_choice(resolver, state, effect, context, choice)? else {
        return Ok(());
    };
    let children = effect.children();
    let ChoiceValue::Branch(index) = choice.value else {
        return Err(EffectError::InvalidChoice {
            index: choice.index,
            available: children.len(),
        });
    };
    let child = children.get(index).ok_or(EffectError::InvalidChoice {
        index,
        available: children.len(),
    })?;
    resolver.apply(state, child, context, None, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CharacterConfig, GameData, ScriptConfig};
    use crate::core::{Location, Movement, Player, PlayerId, PlayerRole, Stat};
    use crate::effects::TargetSelector;

    fn state() -> GameState {
        let mut data = GameData::new(ScriptConfig::new("Effects", 1, 1));
        data.add_character(CharacterConfig::new(CharacterId(1), "Boy Student", Location::School));
        data.add_character(CharacterConfig::new(CharacterId(2), "Girl Student", Location::School));
        data.add_character(CharacterConfig::new(CharacterId(3), "Doctor", Location::Hospital));
        GameState::new(&data, [Player::new(PlayerId(0), "MM", PlayerRole::Mastermind)])
    }

    fn school() -> TargetSelector {
        TargetSelector::AtLocation(Location::School)
    }

    #[test]
    fn test_single_target_applies_without_choice() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::adjust(TargetSelector::Character(CharacterId(3)), Stat::Goodwill, 2);
        let mut out = Vec::new();

        resolver.apply(&state, &effect, &ResolutionContext::new(), None, &mut out).unwrap();

        assert_eq!(
            out,
            vec![EventKind::StatAdjusted {
                character: CharacterId(3),
                stat: Stat::Goodwill,
                amount: 2
            }]
        );
    }

    #[test]
    fn test_ambiguous_target_offers_one_choice_per_candidate() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::kill(school());
        let ctx = ResolutionContext::new();

        let options = resolver.resolve_choices(&state, &effect, &ctx).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Boy Student");

        let mut out = Vec::new();
        let err = resolver.apply(&state, &effect, &ctx, None, &mut out).unwrap_err();
        assert_eq!(err, EffectError::ChoiceRequired { count: 2 });
        assert!(out.is_empty());

        resolver.apply(&state, &effect, &ctx, Some(&options[1]), &mut out).unwrap();
        assert_eq!(out, vec![EventKind::CharacterKilled { character: CharacterId(2) }]);
    }

    #[test]
    fn test_all_count_is_one_choice() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::adjust(school(), Stat::Paranoia, 1).on_all();
        let mut out = Vec::new();

        resolver.apply(&state, &effect, &ResolutionContext::new(), None, &mut out).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_move_wraps_on_grid() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::movement(TargetSelector::Character(CharacterId(3)), Movement::Diagonal);
        let mut out = Vec::new();

        resolver.apply(&state, &effect, &ResolutionContext::new(), None, &mut out).unwrap();
        assert_eq!(
            out,
            vec![EventKind::CharacterMoved {
                character: CharacterId(3),
                from: Location::Hospital,
                to: Location::School
            }]
        );
    }

    #[test]
    fn test_choose_one_needs_branch() {
        let state = state();
        let resolver = EffectResolver::default();
        let doctor = TargetSelector::Character(CharacterId(3));
        let effect = Effect::choose_one([
            Effect::adjust(doctor.clone(), Stat::Paranoia, 1),
            Effect::adjust(doctor, Stat::Intrigue, 1),
        ]);
        let ctx = ResolutionContext::new();

        let options = resolver.resolve_choices(&state, &effect, &ctx).unwrap();
        assert_eq!(options.len(), 2);

        let mut out = Vec::new();
        resolver.apply(&state, &effect, &ctx, Some(&options[1]), &mut out).unwrap();
        assert_eq!(
            out,
            vec![EventKind::StatAdjusted {
                character: CharacterId(3),
                stat: Stat::Intrigue,
                amount: 1
            }]
        );
    }

    #[test]
    fn test_sequence_aborts_on_first_failure() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::sequence([
            Effect::adjust(TargetSelector::Character(CharacterId(3)), Stat::Paranoia, 1),
            Effect::adjust(TargetSelector::Culprit, Stat::Paranoia, 1),
            Effect::adjust(TargetSelector::Character(CharacterId(1)), Stat::Paranoia, 1),
        ]);
        let mut out = Vec::new();

        let err = resolver.apply(&state, &effect, &ResolutionContext::new(), None, &mut out).unwrap_err();
        assert!(matches!(err, EffectError::Target(TargetError::Unresolvable { .. })));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_missing_handler_is_an_error() {
        let state = state();
        let resolver = EffectResolver::new(EffectHandlers::empty());
        let effect = Effect::kill(TargetSelector::All);
        let err = resolver
            .apply(&state, &effect, &ResolutionContext::new(), None, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, EffectError::NoHandler(EffectKind::Kill));
    }

    #[test]
    fn test_step_walks_sequence_and_parks() {
        let state = state();
        let resolver = EffectResolver::default();
        let effect = Effect::sequence([
            Effect::adjust(TargetSelector::Character(CharacterId(3)), Stat::Goodwill, 1),
            Effect::add_trait(school(), "Marked"),
        ]);
        let mut resolution = Resolution::new(PlayerId(0), ResolutionContext::new(), "test", Some(effect));

        let first = resolver.step(&state, &mut resolution, None).unwrap();
        assert!(matches!(first, Step::Emitted(ref events) if events.len() == 1));

        let Step::NeedsChoice(options) = resolver.step(&state, &mut resolution, None).unwrap() else {
            panic!("expected a choice");
        };
        assert_eq!(options.len(), 2);

        let resumed = resolver.step(&state, &mut resolution, Some(options[0].clone())).unwrap();
        assert_eq!(
            resumed,
            Step::Emitted(vec![EventKind::TraitAdded {
                character: CharacterId(1),
                name: "Marked".into()
            }])
        );
        assert_eq!(resolver.step(&state, &mut resolution, None).unwrap(), Step::Complete);
    }
}
