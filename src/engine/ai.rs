//! AI players.
//!
//! An [`ActionGenerator`] is asked for an action whenever the game waits on
//! an AI-controlled player. Its answer is advisory: the engine validates it
//! like any other action and substitutes a safe default when it fails.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::game::Engine;
use crate::core::{GameRng, PlayerAction, PlayerId, RoleGuess, DEFAULT_ROLE};
use crate::rules::phases::{playable_cards, validate_ability, validate_play};
use crate::rules::PhaseKind;
use crate::view::PlayerView;

/// Why an AI player produced no usable action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("action generation failed: {0}")]
    Generation(String),

    #[error("malformed action: {0}")]
    Malformed(String),
}

/// Everything a generator gets to decide with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player: PlayerId,
    /// Engine epoch the request was made in. Answers from older epochs
    /// are discarded.
    pub epoch: u64,
    pub phase: PhaseKind,
    pub view: PlayerView,
    /// Actions the engine would accept right now. Never empty.
    pub candidates: Vec<PlayerAction>,
}

/// Source of actions for AI-controlled players.
pub trait ActionGenerator: Send + Sync {
    fn generate(&self, request: ActionRequest) -> BoxFuture<'static, Result<PlayerAction, AiError>>;
}

/// Picks uniformly among the candidates, one seeded stream per player.
#[derive(Clone, Debug)]
pub struct RandomActionGenerator {
    root: GameRng,
    streams: Arc<Mutex<FxHashMap<PlayerId, GameRng>>>,
}

impl RandomActionGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            root: GameRng::new(seed),
            streams: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }
}

impl ActionGenerator for RandomActionGenerator {
    fn generate(&self, request: ActionRequest) -> BoxFuture<'static, Result<PlayerAction, AiError>> {
        let root = self.root.clone();
        let streams = Arc::clone(&self.streams);
        async move {
            let mut streams = streams.lock().await;
            let rng = streams
                .entry(request.player)
                .or_insert_with(|| root.for_context(&request.player.to_string()));
            rng.choose(&request.candidates)
                .cloned()
                .ok_or_else(|| AiError::Generation(format!("no candidate actions for {}", request.player)))
        }
        .boxed()
    }
}

/// Actions `player` could submit right now, always ending with the
/// fallback action.
#[must_use]
pub fn candidate_actions(engine: &Engine, player: PlayerId) -> Vec<PlayerAction> {
    let fallback = engine.fallback_action(player);
    if let Some(pending) = engine.pending_choice() {
        if pending.player != player {
            return Vec::new();
        }
        return (0..pending.options.len())
            .map(|index| PlayerAction::ChooseOption {
                choice: pending.id,
                index,
            })
            .collect();
    }
    if !engine.awaited_players().contains(&player) {
        return Vec::new();
    }

    let state = engine.state();
    let data = engine.data();
    let living: Vec<_> = state.characters.values().filter(|c| c.alive).map(|c| c.id).collect();

    let mut actions = Vec::new();
    match state.phase {
        PhaseKind::MastermindCardPlay | PhaseKind::ProtagonistCardPlay => {
            for card in playable_cards(state, data, player) {
                for &target in &living {
                    if validate_play(state, data, engine.config(), player, card, target).is_ok() {
                        actions.push(PlayerAction::PlayCard { card, target });
                    }
                }
            }
        }
        PhaseKind::Abilities => {
            for character in state.characters.values().filter(|c| c.alive) {
                for instance in &character.abilities {
                    let targets = std::iter::once(None).chain(living.iter().copied().map(Some));
                    for target in targets {
                        let ability = instance.ability_id;
                        if validate_ability(state, data, player, character.id, ability, target).is_ok() {
                            actions.push(PlayerAction::UseAbility {
                                character: character.id,
                                ability,
                                target,
                            });
                        }
                    }
                }
            }
        }
        PhaseKind::ProtagonistGuess => {
            let roles: BTreeSet<&str> = data
                .script
                .cast
                .values()
                .map(String::as_str)
                .chain([DEFAULT_ROLE])
                .collect();
            for id in state.characters.keys() {
                for role in &roles {
                    actions.push(PlayerAction::MakeGuess {
                        guesses: vec![RoleGuess::new(*id, *role)],
                    });
                }
            }
        }
        _ => {}
    }
    actions.push(fallback);
    actions
}
