//! FIFO of resolutions with at most one parked on a choice.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::resolution::Resolution;
use crate::core::PlayerId;
use crate::effects::{Choice, ChoiceId};
use crate::rules::ActionError;

/// A resolution waiting for a player's choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub id: ChoiceId,
    pub player: PlayerId,
    pub options: Vec<Choice>,
    resolution: Resolution,
}

impl PendingChoice {
    #[must_use]
    pub const fn resolution(&self) -> &Resolution {
        &self.resolution
    }
}

/// What the queue is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    /// Nothing queued and nothing parked.
    Idle,
    /// Waiting on a choice.
    Parked(ChoiceId),
}

/// Queue of effect resolutions.
///
/// Resolutions run in the order they were pushed. When one needs a choice
/// it is parked under a fresh [`ChoiceId`]; the rest of the queue waits
/// until [`answer`](Self::answer) hands it back.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResolutionQueue {
    queue: VecDeque<Resolution>,
    pending: Option<PendingChoice>,
    next_choice: u64,
}

impl ResolutionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resolution: Resolution) {
        self.queue.push_back(resolution);
    }

    /// Next resolution to run, unless one is parked.
    pub fn pop_next(&mut self) -> Option<Resolution> {
        if self.pending.is_some() {
            return None;
        }
        self.queue.pop_front()
    }

    /// Park a resolution until `resolution.chooser` picks one of `options`.
    pub fn park(&mut self, resolution: Resolution, options: Vec<Choice>) -> ChoiceId {
        self.next_choice += 1;
        let id = ChoiceId(self.next_choice);
        self.pending = Some(PendingChoice {
            id,
            player: resolution.chooser,
            options,
            resolution,
        });
        id
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    /// Answer the parked choice, returning the resolution and the option.
    ///
    /// A rejected answer leaves the choice parked.
    pub fn answer(
        &mut self,
        player: PlayerId,
        choice: ChoiceId,
        index: usize,
    ) -> Result<(Resolution, Choice), ActionError> {
        let pending = self.pending.as_ref().ok_or(ActionError::NoPendingChoice)?;
        if pending.id != choice {
            return Err(ActionError::NoPendingChoice);
        }
        if pending.player != player {
            return Err(ActionError::NotYourTurn(player));
        }
        if index >= pending.options.len() {
            return Err(ActionError::InvalidChoice {
                index,
                available: pending.options.len(),
            });
        }
        let pending = self.pending.take().ok_or(ActionError::NoPendingChoice)?;
        let option = pending.options.into_iter().nth(index).ok_or(ActionError::InvalidChoice {
            index,
            available: 0,
        })?;
        Ok((pending.resolution, option))
    }

    #[must_use]
    pub fn status(&self) -> QueueStatus {
        match &self.pending {
            Some(pending) => QueueStatus::Parked(pending.id),
            None => QueueStatus::Idle,
        }
    }

    /// Queued resolutions, not counting a parked one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.pending.is_none()
    }

    /// Drop everything, parked choice included.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CharacterId, Stat};
    use crate::effects::{ChoiceValue, Effect, ResolutionContext, TargetSelector};
    use smallvec::smallvec;

    fn resolution(chooser: u8) -> Resolution {
        Resolution::new(
            PlayerId(chooser),
            ResolutionContext::new(),
            "test",
            Some(Effect::adjust(TargetSelector::All, Stat::Paranoia, 1)),
        )
    }

    fn options() -> Vec<Choice> {
        (0..2)
            .map(|i| Choice {
                index: i,
                label: format!("option {}", i),
                value: ChoiceValue::Targets(smallvec![CharacterId(i as u32 + 1)]),
            })
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = ResolutionQueue::new();
        queue.push(resolution(1));
        queue.push(resolution(2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_next().unwrap().chooser, PlayerId(1));
        assert_eq!(queue.pop_next().unwrap().chooser, PlayerId(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_parked_choice_blocks_queue() {
        let mut queue = ResolutionQueue::new();
        queue.push(resolution(2));
        let id = queue.park(resolution(1), options());

        assert_eq!(queue.status(), QueueStatus::Parked(id));
        assert!(queue.pop_next().is_none());

        let (resumed, option) = queue.answer(PlayerId(1), id, 1).unwrap();
        assert_eq!(resumed.chooser, PlayerId(1));
        assert_eq!(option.index, 1);
        assert_eq!(queue.status(), QueueStatus::Idle);
        assert_eq!(queue.pop_next().unwrap().chooser, PlayerId(2));
    }

    #[test]
    fn test_rejected_answers_keep_choice_parked() {
        let mut queue = ResolutionQueue::new();
        let id = queue.park(resolution(1), options());

        assert_eq!(queue.answer(PlayerId(2), id, 0).unwrap_err(), ActionError::NotYourTurn(PlayerId(2)));
        assert_eq!(
            queue.answer(PlayerId(1), id, 5).unwrap_err(),
            ActionError::InvalidChoice { index: 5, available: 2 }
        );
        assert_eq!(
            queue.answer(PlayerId(1), ChoiceId(99), 0).unwrap_err(),
            ActionError::NoPendingChoice
        );
        assert!(queue.pending().is_some());
    }

    #[test]
    fn test_choice_ids_are_fresh() {
        let mut queue = ResolutionQueue::new();
        let first = queue.park(resolution(1), options());
        queue.clear();
        let second = queue.park(resolution(1), options());
        assert_ne!(first, second);
    }
}
