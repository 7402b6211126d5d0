//! Events: the sole channel for state mutation.
//!
//! - [`EventKind`]: typed payloads, tagged by [`EventType`]
//! - [`GameEvent`]: a stamped, append-only event
//! - [`EventHandlers`]: explicit dispatch table from event type to handler
//! - [`EventManager`]: apply, notify, log, publish

mod event;
mod handlers;
mod manager;

pub use event::{EventKind, EventType, GameEvent, Visibility};
pub use handlers::{EventHandler, EventHandlers};
pub use manager::EventManager;
