//! Effect system: what cards, abilities and incidents do.
//!
//! - `Effect`: tagged union of leaf and compound effects
//! - `TargetSpec` / `TargetSelector`: who an effect touches
//! - `TargetResolver`: expands selectors against live state
//! - `EffectResolver`: turns effects into events, pausing for choices
//!
//! Effects are configuration. Resolving one never writes state: it yields
//! `EventKind`s that the event pipeline applies.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Effect, EffectKind};
pub use resolver::{
    ApplyFn, Choice, ChoiceId, ChoiceValue, EffectError, EffectHandler, EffectHandlers, EffectResolver,
    ResolveChoicesFn, Step,
};
pub use targeting::{
    EffectSource, IncidentScope, ResolutionContext, TargetCount, TargetError, TargetResolver, TargetSelector,
    TargetSpec, Targets,
};
