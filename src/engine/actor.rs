//! The engine actor.
//!
//! [`EngineLoop`] owns an [`Engine`] and drains one bounded inbound queue
//! strictly in order. Actions, queries, timer signals and AI results all
//! arrive through that queue, so the game state has exactly one reader
//! and writer and needs no locks. Queries carry a oneshot reply channel.
//!
//! Timers and AI generations run as separate tasks. They hold only a weak
//! sender: once every [`EngineHandle`] is dropped the queue closes and the
//! loop returns its engine.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ai::{candidate_actions, ActionGenerator, ActionRequest, AiError};
use super::game::Engine;
use crate::core::{PlayerAction, PlayerId};
use crate::events::GameEvent;
use crate::rules::PhaseKind;
use crate::view::PlayerView;

/// Failures of the actor façade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine loop has stopped")]
    QueueClosed,

    #[error("engine inbound queue is full")]
    QueueFull,

    #[error("engine loop dropped the reply")]
    ResponseDropped,
}

/// Messages accepted by the loop.
#[derive(Debug)]
pub enum EngineMessage {
    Submit {
        player: PlayerId,
        action: PlayerAction,
    },
    GetPlayerView {
        player: PlayerId,
        reply: oneshot::Sender<Option<PlayerView>>,
    },
    GetCurrentPhase {
        reply: oneshot::Sender<PhaseKind>,
    },
    PhaseTimeout {
        epoch: u64,
    },
    AiAction {
        player: PlayerId,
        epoch: u64,
        result: Result<PlayerAction, AiError>,
    },
}

/// Cloneable client side of an [`EngineLoop`].
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineMessage>,
}

impl EngineHandle {
    /// Queue an action without waiting. Dropped with a warning when the
    /// queue is full.
    pub fn submit_action(&self, player: PlayerId, action: PlayerAction) -> Result<(), EngineError> {
        match self.tx.try_send(EngineMessage::Submit { player, action }) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%player, "engine inbound queue full, dropping action");
                Err(EngineError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(EngineError::QueueClosed),
        }
    }

    /// Snapshot of the game for `player`, after every earlier message.
    pub async fn player_view(&self, player: PlayerId) -> Result<Option<PlayerView>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineMessage::GetPlayerView { player, reply })
            .await
            .map_err(|_| EngineError::QueueClosed)?;
        rx.await.map_err(|_| EngineError::ResponseDropped)
    }

    pub async fn current_phase(&self) -> Result<PhaseKind, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineMessage::GetCurrentPhase { reply })
            .await
            .map_err(|_| EngineError::QueueClosed)?;
        rx.await.map_err(|_| EngineError::ResponseDropped)
    }
}

struct RunningTimer {
    epoch: u64,
    task: JoinHandle<()>,
}

/// The actor.
pub struct EngineLoop {
    engine: Engine,
    inbound: mpsc::Receiver<EngineMessage>,
    loopback: mpsc::WeakSender<EngineMessage>,
    generator: Option<Arc<dyn ActionGenerator>>,
    timer: Option<RunningTimer>,
    /// AI players with a generation in flight.
    in_flight: FxHashSet<PlayerId>,
    /// State each AI player was last asked about, as (epoch, last event).
    asked: FxHashMap<PlayerId, (u64, u64)>,
}

impl EngineLoop {
    /// Wrap `engine`. Returns the loop, a handle for clients and the
    /// outbound event stream.
    pub fn new(
        mut engine: Engine,
        generator: Option<Arc<dyn ActionGenerator>>,
    ) -> (Self, EngineHandle, mpsc::Receiver<GameEvent>) {
        let (tx, inbound) = mpsc::channel(engine.config().inbound_capacity.max(1));
        let (events_tx, events_rx) = mpsc::channel(engine.config().broadcast_capacity.max(1));
        engine.set_event_sink(events_tx);

        let actor = Self {
            engine,
            inbound,
            loopback: tx.downgrade(),
            generator,
            timer: None,
            in_flight: FxHashSet::default(),
            asked: FxHashMap::default(),
        };
        (actor, EngineHandle { tx }, events_rx)
    }

    /// Run on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<Engine> {
        tokio::spawn(self.run())
    }

    /// Drain the inbound queue until every handle is dropped.
    pub async fn run(mut self) -> Engine {
        self.engine.start();
        self.settle();

        while let Some(message) = self.inbound.recv().await {
            self.handle(message);
            self.settle();
        }

        if let Some(timer) = self.timer.take() {
            timer.task.abort();
        }
        info!(phase = %self.engine.current_phase(), "engine loop stopped");
        self.engine
    }

    fn handle(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Submit { player, action } => {
                if let Err(error) = self.engine.submit(player, action.clone()) {
                    warn!(%player, action = action.name(), phase = %self.engine.current_phase(), %error, "action rejected");
                }
            }
            EngineMessage::GetPlayerView { player, reply } => {
                if reply.send(self.engine.player_view(player)).is_err() {
                    debug!(%player, "view requester went away");
                }
            }
            EngineMessage::GetCurrentPhase { reply } => {
                if reply.send(self.engine.current_phase()).is_err() {
                    debug!("phase requester went away");
                }
            }
            EngineMessage::PhaseTimeout { epoch } => {
                self.engine.handle_timeout(epoch);
            }
            EngineMessage::AiAction { player, epoch, result } => self.apply_ai(player, epoch, result),
        }
    }

    /// Submit an AI answer, degrading to the fallback action.
    fn apply_ai(&mut self, player: PlayerId, epoch: u64, result: Result<PlayerAction, AiError>) {
        self.in_flight.remove(&player);
        if epoch != self.engine.epoch() {
            debug!(%player, epoch, current = self.engine.epoch(), "discarding stale AI action");
            return;
        }

        let action = match result {
            Ok(action) => action,
            Err(error) => {
                warn!(%player, %error, "AI generation failed, using fallback");
                self.engine.fallback_action(player)
            }
        };
        let name = action.name();
        if let Err(error) = self.engine.submit(player, action) {
            let fallback = self.engine.fallback_action(player);
            warn!(%player, action = name, %error, fallback = fallback.name(), "AI action rejected, using fallback");
            if let Err(error) = self.engine.submit(player, fallback) {
                warn!(%player, %error, "fallback action rejected");
            }
        }
    }

    /// Bring the timer and AI dispatch in line with the engine.
    fn settle(&mut self) {
        self.sync_timer();
        self.dispatch_ai();
    }

    fn sync_timer(&mut self) {
        let armed = self.engine.armed_timer();
        if armed.map(|t| t.epoch) == self.timer.as_ref().map(|t| t.epoch) {
            return;
        }
        if let Some(old) = self.timer.take() {
            old.task.abort();
        }
        let Some(armed) = armed else { return };

        let loopback = self.loopback.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(armed.duration).await;
            if let Some(tx) = loopback.upgrade() {
                let _ = tx.send(EngineMessage::PhaseTimeout { epoch: armed.epoch }).await;
            }
        });
        debug!(epoch = armed.epoch, ms = armed.duration.as_millis() as u64, "timer armed");
        self.timer = Some(RunningTimer {
            epoch: armed.epoch,
            task,
        });
    }

    fn dispatch_ai(&mut self) {
        let Some(generator) = self.generator.clone() else { return };
        let key = (self.engine.epoch(), self.engine.last_event_seq());

        for player in self.engine.awaited_players() {
            let is_ai = self.engine.state().player(player).is_some_and(|p| p.is_ai());
            if !is_ai || self.in_flight.contains(&player) || self.asked.get(&player) == Some(&key) {
                continue;
            }
            let Some(view) = self.engine.player_view(player) else { continue };
            let request = ActionRequest {
                player,
                epoch: key.0,
                phase: self.engine.current_phase(),
                view,
                candidates: candidate_actions(&self.engine, player),
            };
            debug!(%player, epoch = key.0, candidates = request.candidates.len(), "asking AI for an action");

            self.in_flight.insert(player);
            self.asked.insert(player, key);
            let generation = generator.generate(request);
            let loopback = self.loopback.clone();
            tokio::spawn(async move {
                let result = generation.await;
                if let Some(tx) = loopback.upgrade() {
                    let _ = tx
                        .send(EngineMessage::AiAction {
                            player,
                            epoch: key.0,
                            result,
                        })
                        .await;
                }
            });
        }
    }
}
