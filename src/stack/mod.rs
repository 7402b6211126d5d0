//! Resolution queue: effects in flight and choices they wait on.
//!
//! A card, ability or incident effect becomes a [`Resolution`]. Resolutions
//! run in FIFO order. One that needs a player's decision is parked as a
//! [`PendingChoice`] keyed by its [`ChoiceId`](crate::effects::ChoiceId),
//! and resumes exactly where it stopped once the matching
//! `ChooseOption` action arrives. Nothing is rolled back: events a
//! resolution emitted before it parked or failed stay applied.

mod queue;
mod resolution;

pub use queue::{PendingChoice, QueueStatus, ResolutionQueue};
pub use resolution::{Frame, Resolution};
