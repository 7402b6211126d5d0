//! A resumable effect resolution.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::effects::{Effect, ResolutionContext};
use crate::events::EventKind;

/// One level of the effect tree being walked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub effect: Effect,
    /// Next child to visit, for sequences.
    pub next: usize,
}

impl Frame {
    #[must_use]
    pub const fn new(effect: Effect) -> Self {
        Self { effect, next: 0 }
    }
}

/// An effect in flight, with everything needed to resume it.
///
/// `frames` is an explicit walk over the effect tree: sequences keep a
/// cursor, a parked leaf or `ChooseOne` stays on top until its choice
/// arrives. `prelude` holds events announced before the effect starts,
/// such as `AbilityUsed` or `IncidentTriggered`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Player who answers any choice this resolution raises.
    pub chooser: PlayerId,
    pub context: ResolutionContext,
    /// What the resolution is for, in logs.
    pub label: String,
    prelude: Vec<EventKind>,
    pub(crate) frames: Vec<Frame>,
}

impl Resolution {
    #[must_use]
    pub fn new(
        chooser: PlayerId,
        context: ResolutionContext,
        label: impl Into<String>,
        effect: Option<Effect>,
    ) -> Self {
        Self {
            chooser,
            context,
            label: label.into(),
            prelude: Vec::new(),
            frames: effect.map(Frame::new).into_iter().collect(),
        }
    }

    /// Announce `events` before the effect runs (builder pattern).
    #[must_use]
    pub fn with_prelude(mut self, events: impl IntoIterator<Item = EventKind>) -> Self {
        self.prelude.extend(events);
        self
    }

    /// Take the announcement events; later calls return nothing.
    pub fn take_prelude(&mut self) -> Vec<EventKind> {
        std::mem::take(&mut self.prelude)
    }

    /// Nothing left to walk.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.frames.is_empty()
    }
}
