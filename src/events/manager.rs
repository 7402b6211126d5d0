//! The event pipeline.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::event::{EventKind, GameEvent};
use super::handlers::EventHandlers;
use crate::core::GameState;
use crate::rules::{self, PhaseOutcome};

/// The only writer of game state.
///
/// [`create_and_process`](Self::create_and_process) runs the same steps,
/// in the same order, for every event:
///
/// 1. stamp the payload with a sequence number and timestamp
/// 2. run the registered handler, if any
/// 3. let the active phase react; a requested transition is held until
///    the phase machine collects it with [`take_request`](Self::take_request)
/// 4. append to the day and loop logs
/// 5. offer to the bounded outbound queue, dropping the event when full
pub struct EventManager {
    handlers: EventHandlers,
    next_seq: u64,
    outbound: Option<mpsc::Sender<GameEvent>>,
    request: Option<PhaseOutcome>,
}

impl EventManager {
    #[must_use]
    pub fn new(handlers: EventHandlers) -> Self {
        Self {
            handlers,
            next_seq: 1,
            outbound: None,
            request: None,
        }
    }

    /// Publish processed events to `sender`.
    pub fn set_outbound(&mut self, sender: mpsc::Sender<GameEvent>) {
        self.outbound = Some(sender);
    }

    /// Apply an event and publish it. Returns its sequence number.
    pub fn create_and_process(&mut self, state: &mut GameState, kind: EventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let event = GameEvent::new(seq, kind);
        let event_type = event.event_type();

        match self.handlers.get(event_type) {
            Some(handler) => handler(state, &event),
            None => debug!(seq, event = %event_type, "informational event"),
        }

        let outcome = rules::phase_for(state.phase).handle_event(state, &event);
        if outcome != PhaseOutcome::Stay && self.request.is_none() {
            debug!(seq, event = %event_type, phase = %state.phase, ?outcome, "phase requested transition");
            self.request = Some(outcome);
        }

        state.day_log.push_back(event.clone());
        state.loop_log.push_back(event.clone());

        if let Some(sender) = &self.outbound {
            match sender.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(dropped)) => {
                    warn!(seq = dropped.seq, event = %event_type, "outbound event queue full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(seq, "outbound event queue closed");
                    self.outbound = None;
                }
            }
        }
        seq
    }

    /// Collect the transition requested by the active phase, if any.
    pub fn take_request(&mut self) -> Option<PhaseOutcome> {
        self.request.take()
    }

    /// Sequence number of the most recent event (0 before any).
    #[must_use]
    pub const fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }
}
