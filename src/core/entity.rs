//! Identifiers for the objects on the board.
//!
//! Characters and incidents are defined by the script's game data and keep
//! the same id for the whole game, across every loop. Ids are small `Copy`
//! newtypes so they can be used freely as map keys and in events.
//!
//! ```
//! use tragedy_looper::core::{CharacterId, IncidentId};
//!
//! let girl = CharacterId::new(3);
//! assert_eq!(girl.raw(), 3);
//! assert_eq!(format!("{}", girl), "Character(3)");
//! assert_eq!(format!("{}", IncidentId::new(1)), "Incident(1)");
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a character on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

impl CharacterId {
    /// Create a new character ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CharacterId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Character({})", self.0)
    }
}

/// Identifier of a scripted incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub u32);

impl IncidentId {
    /// Create a new incident ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incident({})", self.0)
    }
}
