//! The board: four locations on a 2x2 grid.
//!
//! ```text
//!            x = 0      x = 1
//!   y = 0  Hospital    Shrine
//!   y = 1  City        School
//! ```
//!
//! Both axes wrap independently (mod 2), so every movement is toroidal:
//! moving horizontally twice always returns to the starting location.

use serde::{Deserialize, Serialize};

/// A location on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Hospital,
    Shrine,
    City,
    School,
}

impl Location {
    /// Every location in grid order.
    pub const ALL: [Location; 4] = [
        Location::Hospital,
        Location::Shrine,
        Location::City,
        Location::School,
    ];

    /// Grid coordinates `(x, y)`, each in `0..2`.
    #[must_use]
    pub const fn coords(self) -> (u8, u8) {
        match self {
            Location::Hospital => (0, 0),
            Location::Shrine => (1, 0),
            Location::City => (0, 1),
            Location::School => (1, 1),
        }
    }

    /// Location at grid coordinates, wrapping both axes.
    #[must_use]
    pub const fn from_coords(x: u8, y: u8) -> Self {
        match (x % 2, y % 2) {
            (0, 0) => Location::Hospital,
            (1, 0) => Location::Shrine,
            (0, _) => Location::City,
            _ => Location::School,
        }
    }

    /// Location reached by moving `(dx, dy)` from here.
    ///
    /// Negative offsets are allowed; on a mod-2 axis they are equivalent
    /// to positive ones.
    #[must_use]
    pub fn offset(self, dx: i8, dy: i8) -> Self {
        let (x, y) = self.coords();
        let nx = (i16::from(x) + i16::from(dx)).rem_euclid(2);
        let ny = (i16::from(y) + i16::from(dy)).rem_euclid(2);
        // rem_euclid(2) is always 0 or 1
        Self::from_coords(nx as u8, ny as u8)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Location::Hospital => "Hospital",
            Location::Shrine => "Shrine",
            Location::City => "City",
            Location::School => "School",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a move effect relocates a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// One step along the x axis.
    Horizontal,
    /// One step along the y axis.
    Vertical,
    /// One step along both axes.
    Diagonal,
    /// Straight to a fixed location.
    To(Location),
}

impl Movement {
    /// Destination when starting from `from`.
    #[must_use]
    pub fn apply(self, from: Location) -> Location {
        match self {
            Movement::Horizontal => from.offset(1, 0),
            Movement::Vertical => from.offset(0, 1),
            Movement::Diagonal => from.offset(1, 1),
            Movement::To(location) => location,
        }
    }
}
