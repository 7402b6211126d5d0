//! Role-filtered snapshots for clients and AI players.

mod projector;

pub use projector::{CharacterView, PlayerSummary, PlayerView, PlayerViewProjector, HIDDEN_ROLE};
