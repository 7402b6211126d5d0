//! The synchronous engine core.
//!
//! [`Engine`] owns one game: its state, the event pipeline, the resolution
//! queue and the phase machine. Every method runs to completion, so the
//! engine can be driven directly (tests, replays, simulations) or from the
//! [`EngineLoop`](super::EngineLoop) actor.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tragedy_looper::cards::{CharacterConfig, GameData, ScriptConfig};
//! use tragedy_looper::core::{CharacterId, EngineConfig, Location, Player, PlayerId, PlayerRole};
//! use tragedy_looper::engine::Engine;
//! use tragedy_looper::rules::PhaseKind;
//!
//! let mut data = GameData::new(ScriptConfig::new("Quiet Town", 1, 1));
//! data.add_character(CharacterConfig::new(CharacterId::new(1), "Boy Student", Location::School));
//!
//! let players = vec![
//!     Player::new(PlayerId::new(0), "MM", PlayerRole::Mastermind),
//!     Player::new(PlayerId::new(1), "P1", PlayerRole::Protagonist),
//! ];
//! let mut engine = Engine::new(Arc::new(data), players, EngineConfig::default()).unwrap();
//! engine.start();
//!
//! // Nothing is in hand, so both card phases finish at once and the day
//! // waits on the Mastermind's abilities turn.
//! assert_eq!(engine.current_phase(), PhaseKind::Abilities);
//! assert_eq!(engine.awaited_players(), vec![PlayerId::new(0)]);
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cards::{DataError, GameData};
use crate::core::{EngineConfig, GameState, Player, PlayerAction, PlayerId, PlayerRole};
use crate::effects::{ChoiceId, EffectHandlers, EffectResolver};
use crate::events::{EventHandlers, EventManager, GameEvent};
use crate::rules::{phase_for, ActionError, PhaseContext, PhaseKind, PhaseMachine, PhaseScratch, TransitionTable, Winner};
use crate::stack::{PendingChoice, ResolutionQueue};
use crate::view::{PlayerView, PlayerViewProjector};

/// The timer the engine wants running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    /// Timeouts carrying another epoch are stale.
    pub epoch: u64,
    pub duration: Duration,
}

/// One game.
pub struct Engine {
    data: Arc<GameData>,
    config: EngineConfig,
    state: GameState,
    events: EventManager,
    effects: EffectResolver,
    machine: PhaseMachine,
    queue: ResolutionQueue,
    scratch: PhaseScratch,
    started: bool,

    // === Timer ===
    epoch: u64,
    timer_key: Option<(u64, Option<ChoiceId>, Option<PlayerRole>)>,
    timer: Option<ArmedTimer>,
}

impl Engine {
    /// Create a game with the standard handler tables and transitions.
    pub fn new(
        data: Arc<GameData>,
        players: impl IntoIterator<Item = Player>,
        config: EngineConfig,
    ) -> Result<Self, DataError> {
        Self::with_tables(
            data,
            players,
            config,
            EventHandlers::standard(),
            EffectHandlers::standard(),
            TransitionTable::standard(),
        )
    }

    /// Create a game with explicit dispatch tables.
    pub fn with_tables(
        data: Arc<GameData>,
        players: impl IntoIterator<Item = Player>,
        config: EngineConfig,
        event_handlers: EventHandlers,
        effect_handlers: EffectHandlers,
        transitions: TransitionTable,
    ) -> Result<Self, DataError> {
        data.validate()?;
        let players: Vec<Player> = players.into_iter().collect();
        let masterminds = players.iter().filter(|p| p.is_mastermind()).count();
        if masterminds != 1 {
            return Err(DataError::MastermindCount(masterminds));
        }

        let state = GameState::new(&data, players);
        Ok(Self {
            data,
            config,
            state,
            events: EventManager::new(event_handlers),
            effects: EffectResolver::new(effect_handlers),
            machine: PhaseMachine::new(transitions),
            queue: ResolutionQueue::new(),
            scratch: PhaseScratch::default(),
            started: false,
            epoch: 0,
            timer_key: None,
            timer: None,
        })
    }

    /// Publish every processed event to `sender`.
    pub fn set_event_sink(&mut self, sender: mpsc::Sender<GameEvent>) {
        self.events.set_outbound(sender);
    }

    fn split(&mut self) -> (&mut PhaseMachine, PhaseContext<'_>) {
        let Engine {
            data,
            config,
            state,
            events,
            effects,
            machine,
            queue,
            scratch,
            ..
        } = self;
        let ctx = PhaseContext {
            state,
            data: &**data,
            config,
            events,
            effects,
            queue,
            scratch,
        };
        (machine, ctx)
    }

    /// Enter SETUP and run until the game first waits on a player.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            script = %self.data.script.name,
            loops = self.data.script.loops,
            days = self.data.script.days_per_loop,
            players = self.state.players.len(),
            "game starting"
        );
        let (machine, mut ctx) = self.split();
        machine.start(&mut ctx);
        self.refresh_timer();
    }

    /// Apply a player action. A rejected action changes nothing.
    pub fn submit(&mut self, player: PlayerId, action: PlayerAction) -> Result<(), ActionError> {
        self.start();
        let (machine, mut ctx) = self.split();
        let result = machine.handle_action(&mut ctx, player, &action);
        if result.is_ok() {
            debug!(%player, action = action.name(), phase = %self.state.phase, "action applied");
        }
        self.refresh_timer();
        result
    }

    /// Fire the armed timer. Returns `false` for a stale epoch.
    pub fn handle_timeout(&mut self, epoch: u64) -> bool {
        if self.timer.map(|t| t.epoch) != Some(epoch) {
            debug!(epoch, current = self.epoch, "ignoring stale timeout");
            return false;
        }
        info!(phase = %self.state.phase, epoch, "phase timed out");
        let (machine, mut ctx) = self.split();
        machine.handle_timeout(&mut ctx);
        // A timeout that changed nothing still gets a fresh timer.
        self.timer_key = None;
        self.refresh_timer();
        true
    }

    /// Re-arm the timer when the phase entry, the pending choice or the
    /// ability sub-turn changed.
    fn refresh_timer(&mut self) {
        let pending = self.queue.pending().map(|p| p.id);
        let key = (self.machine.entries(), pending, self.scratch.ability_turn);
        if self.timer_key == Some(key) {
            return;
        }
        self.timer_key = Some(key);
        self.epoch += 1;

        let duration = if pending.is_some() {
            self.config.timeouts.choice()
        } else {
            phase_for(self.state.phase).timeout_duration(&self.config)
        };
        self.timer = (!duration.is_zero() && !self.state.is_over()).then_some(ArmedTimer {
            epoch: self.epoch,
            duration,
        });
    }

    // === Queries ===

    #[must_use]
    pub const fn armed_timer(&self) -> Option<ArmedTimer> {
        self.timer
    }

    /// Changes whenever the phase or the pending choice changes.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn current_phase(&self) -> PhaseKind {
        self.state.phase
    }

    #[must_use]
    pub const fn winner(&self) -> Option<Winner> {
        self.state.winner
    }

    #[must_use]
    pub const fn pending_choice(&self) -> Option<&PendingChoice> {
        self.queue.pending()
    }

    /// Sequence number of the latest event.
    #[must_use]
    pub const fn last_event_seq(&self) -> u64 {
        self.events.last_seq()
    }

    #[must_use]
    pub fn player_view(&self, player: PlayerId) -> Option<PlayerView> {
        PlayerViewProjector::project(&self.state, player)
    }

    /// Players the game is waiting on right now.
    #[must_use]
    pub fn awaited_players(&self) -> Vec<PlayerId> {
        if self.state.is_over() {
            return Vec::new();
        }
        match self.queue.pending() {
            Some(pending) => vec![pending.player],
            None => phase_for(self.state.phase).awaiting(&self.state, &self.scratch),
        }
    }

    /// The action substituted for a missing or rejected one.
    #[must_use]
    pub fn fallback_action(&self, player: PlayerId) -> PlayerAction {
        match self.queue.pending() {
            Some(pending) if pending.player == player => PlayerAction::ChooseOption {
                choice: pending.id,
                index: 0,
            },
            _ => PlayerAction::PassTurn,
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("script", &self.data.script.name)
            .field("phase", &self.state.phase)
            .field("loop_index", &self.state.loop_index)
            .field("day", &self.state.day)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
