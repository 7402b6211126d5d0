//! Game events.
//!
//! Every change to game state is carried by an event. Events are
//! append-only once emitted: they are applied, logged and broadcast, and
//! never edited afterward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::{AbilityId, CardId};
use crate::core::{CharacterId, IncidentId, Location, Player, PlayerId, PlayerRole, RoleGuess, Stat, PlayedCard};
use crate::effects::{Choice, ChoiceId};
use crate::rules::{PhaseKind, Winner};

/// Who may see an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    /// Only the Mastermind.
    Mastermind,
    /// Only one player.
    Player(PlayerId),
}

impl Visibility {
    #[must_use]
    pub fn visible_to(self, player: &Player) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Mastermind => player.is_mastermind(),
            Visibility::Player(id) => player.id == id,
        }
    }
}

/// Event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    // === Progression ===

    HandDealt {
        player: PlayerId,
        cards: Vec<CardId>,
    },
    PhaseChanged {
        from: PhaseKind,
        to: PhaseKind,
    },
    LoopStarted { loop_index: u32 },
    DayStarted { day: u32 },
    PlayerPassed { player: PlayerId },
    TragedyOccurred { loop_index: u32, day: u32 },
    LoopEnded { loop_index: u32, survived: bool },
    GuessSubmitted {
        player: PlayerId,
        guesses: Vec<RoleGuess>,
    },
    GameEnded { winner: Winner },

    // === Cards and abilities ===

    /// A card was placed face down.
    CardPlayed {
        player: PlayerId,
        role: PlayerRole,
        card: CardId,
        target: CharacterId,
    },
    CardsRevealed { cards: Vec<PlayedCard> },
    CardResolved {
        player: PlayerId,
        card: CardId,
        target: CharacterId,
    },
    AbilityUsed {
        player: PlayerId,
        character: CharacterId,
        ability: AbilityId,
        target: Option<CharacterId>,
    },

    // === Choices ===

    ChoiceRequired {
        choice: ChoiceId,
        player: PlayerId,
        options: Vec<Choice>,
    },
    ChoiceMade {
        choice: ChoiceId,
        player: PlayerId,
        index: usize,
    },

    // === Board ===

    CharacterMoved {
        character: CharacterId,
        from: Location,
        to: Location,
    },
    StatAdjusted {
        character: CharacterId,
        stat: Stat,
        amount: i32,
    },
    TraitAdded {
        character: CharacterId,
        name: String,
    },
    TraitRemoved {
        character: CharacterId,
        name: String,
    },
    CharacterKilled { character: CharacterId },
    IncidentTriggered {
        incident: IncidentId,
        culprit: CharacterId,
        victim: Option<CharacterId>,
    },
}

/// Fieldless tag of an [`EventKind`], the key of the handler table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    HandDealt,
    PhaseChanged,
    LoopStarted,
    DayStarted,
    PlayerPassed,
    TragedyOccurred,
    LoopEnded,
    GuessSubmitted,
    GameEnded,
    CardPlayed,
    CardsRevealed,
    CardResolved,
    AbilityUsed,
    ChoiceRequired,
    ChoiceMade,
    CharacterMoved,
    StatAdjusted,
    TraitAdded,
    TraitRemoved,
    CharacterKilled,
    IncidentTriggered,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl EventKind {
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            EventKind::HandDealt { .. } => EventType::HandDealt,
            EventKind::PhaseChanged { .. } => EventType::PhaseChanged,
            EventKind::LoopStarted { .. } => EventType::LoopStarted,
            EventKind::DayStarted { .. } => EventType::DayStarted,
            EventKind::PlayerPassed { .. } => EventType::PlayerPassed,
            EventKind::TragedyOccurred { .. } => EventType::TragedyOccurred,
            EventKind::LoopEnded { .. } => EventType::LoopEnded,
            EventKind::GuessSubmitted { .. } => EventType::GuessSubmitted,
            EventKind::GameEnded { .. } => EventType::GameEnded,
            EventKind::CardPlayed { .. } => EventType::CardPlayed,
            EventKind::CardsRevealed { .. } => EventType::CardsRevealed,
            EventKind::CardResolved { .. } => EventType::CardResolved,
            EventKind::AbilityUsed { .. } => EventType::AbilityUsed,
            EventKind::ChoiceRequired { .. } => EventType::ChoiceRequired,
            EventKind::ChoiceMade { .. } => EventType::ChoiceMade,
            EventKind::CharacterMoved { .. } => EventType::CharacterMoved,
            EventKind::StatAdjusted { .. } => EventType::StatAdjusted,
            EventKind::TraitAdded { .. } => EventType::TraitAdded,
            EventKind::TraitRemoved { .. } => EventType::TraitRemoved,
            EventKind::CharacterKilled { .. } => EventType::CharacterKilled,
            EventKind::IncidentTriggered { .. } => EventType::IncidentTriggered,
        }
    }

    /// Who may see this event.
    ///
    /// Hands and choices are private to their player. Mastermind card
    /// placements stay hidden until `CardsRevealed`.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        match self {
            EventKind::HandDealt { player, .. }
            | EventKind::ChoiceRequired { player, .. }
            | EventKind::ChoiceMade { player, .. } => Visibility::Player(*player),
            EventKind::CardPlayed {
                role: PlayerRole::Mastermind,
                ..
            } => Visibility::Mastermind,
            EventKind::CardPlayed { player, .. } => Visibility::Player(*player),
            _ => Visibility::Public,
        }
    }
}

/// An emitted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the engine's event stream, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub visibility: Visibility,
    pub kind: EventKind,
}

impl GameEvent {
    /// Stamp a payload.
    #[must_use]
    pub fn new(seq: u64, kind: EventKind) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            visibility: kind.visibility(),
            kind,
        }
    }

    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    #[must_use]
    pub fn visible_to(&self, player: &Player) -> bool {
        self.visibility.visible_to(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let mm = Player::new(PlayerId(0), "MM", PlayerRole::Mastermind);
        let p1 = Player::new(PlayerId(1), "P1", PlayerRole::Protagonist);
        let p2 = Player::new(PlayerId(2), "P2", PlayerRole::Protagonist);

        let hidden = GameEvent::new(
            1,
            EventKind::CardPlayed {
                player: PlayerId(0),
                role: PlayerRole::Mastermind,
                card: CardId(1),
                target: CharacterId(1),
            },
        );
        assert!(hidden.visible_to(&mm));
        assert!(!hidden.visible_to(&p1));

        let hand = GameEvent::new(2, EventKind::HandDealt { player: PlayerId(1), cards: vec![] });
        assert!(hand.visible_to(&p1));
        assert!(!hand.visible_to(&p2));
        assert!(!hand.visible_to(&mm));

        let public = GameEvent::new(3, EventKind::DayStarted { day: 1 });
        assert!(public.visible_to(&p2));
    }

    #[test]
    fn test_event_type_tags() {
        let kind = EventKind::TraitAdded {
            character: CharacterId(1),
            name: "Culprit".into(),
        };
        assert_eq!(kind.event_type(), EventType::TraitAdded);
        assert_eq!(EventType::StatAdjusted.to_string(), "StatAdjusted");
    }

    #[test]
    fn test_serialization() {
        let event = GameEvent::new(
            7,
            EventKind::StatAdjusted {
                character: CharacterId(3),
                stat: Stat::Paranoia,
                amount: 1,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
