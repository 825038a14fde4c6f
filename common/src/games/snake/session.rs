use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::Validate;
use crate::games::SessionRng;
use crate::high_score::HighScoreStore;
use crate::{log, log_warn};
use super::bot_controller::BotController;
use super::game_state::GameState;
use super::grace::GraceTimer;
use super::rules::{self, TickOutcome, TickResult};
use super::settings::GameSettings;
use super::types::{Direction, GameStatus, LossReason};

/// Receives every published snapshot and every score/status change.
pub trait StatusBroadcaster: Send + Sync + 'static {
    fn broadcast_state(&self, state: GameState) -> impl Future<Output = ()> + Send;

    fn broadcast_status(&self, status: GameStatus, score: u32) -> impl Future<Output = ()> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Manual steering; also switches autopilot off.
    Turn(Direction),
    ToggleAutopilot,
    Pause,
    Resume,
    Restart,
    Stop,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub settings: GameSettings,
    pub autopilot: bool,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub status: GameStatus,
    pub score: u32,
    pub ticks: u64,
    pub loss_reason: Option<LossReason>,
    pub high_score: u32,
    pub new_high_score: bool,
    pub seed: u64,
}

impl SessionSummary {
    fn not_started(seed: u64) -> Self {
        Self {
            status: GameStatus::Idle,
            score: 0,
            ticks: 0,
            loss_reason: None,
            high_score: 0,
            new_high_score: false,
            seed,
        }
    }
}

struct PendingLoss {
    timer: GraceTimer,
    result: TickResult,
}

pub struct SnakeSession;

impl SnakeSession {
    /// Plays one game until it reaches a terminal status or `Stop` arrives.
    ///
    /// Invalid settings end the session immediately with status `Idle`.
    pub async fn run<B, H>(
        config: SessionConfig,
        broadcaster: B,
        high_scores: H,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> SessionSummary
    where
        B: StatusBroadcaster,
        H: HighScoreStore,
    {
        if let Err(e) = config.settings.validate() {
            log_warn!("Session not started, invalid settings: {}", e);
            return SessionSummary::not_started(config.seed.unwrap_or_default());
        }

        let (grace_tx, mut grace_rx) = mpsc::unbounded_channel();
        let mut ticker = interval(config.settings.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut session = SessionLoop::new(config, broadcaster, high_scores, grace_tx);
        session.publish_start().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => session.on_tick().await,
                Some(id) = grace_rx.recv() => session.on_grace_expired(id).await,
                Some(command) = commands.recv() => {
                    if !session.on_command(command).await {
                        break;
                    }
                }
            }

            if session.state.status.is_terminal() {
                break;
            }
        }

        session.finish()
    }
}

struct SessionLoop<B, H> {
    state: GameState,
    rng: SessionRng,
    started: Instant,
    autopilot: bool,
    requested: Direction,
    pending: Option<PendingLoss>,
    next_grace_id: u64,
    grace_tx: mpsc::UnboundedSender<u64>,
    high_score: u32,
    new_high_score: bool,
    broadcaster: B,
    high_scores: H,
}

impl<B, H> SessionLoop<B, H>
where
    B: StatusBroadcaster,
    H: HighScoreStore,
{
    fn new(
        config: SessionConfig,
        broadcaster: B,
        high_scores: H,
        grace_tx: mpsc::UnboundedSender<u64>,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };
        let state = rules::start(&config.settings, &mut rng, Duration::ZERO);
        let high_score = high_scores.load().unwrap_or_else(|e| {
            log_warn!("Failed to load high score, starting from 0: {}", e);
            0
        });

        Self {
            requested: state.direction,
            state,
            rng,
            started: Instant::now(),
            autopilot: config.autopilot,
            pending: None,
            next_grace_id: 0,
            grace_tx,
            high_score,
            new_high_score: false,
            broadcaster,
            high_scores,
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    async fn publish_start(&self) {
        log!(
            "[seed:{}] Session started, autopilot {}, high score {}",
            self.rng.seed(),
            if self.autopilot { "on" } else { "off" },
            self.high_score
        );
        self.broadcaster.broadcast_state(self.state.clone()).await;
        self.broadcaster
            .broadcast_status(self.state.status, self.state.score)
            .await;
    }

    async fn on_tick(&mut self) {
        if self.pending.is_some() || self.state.status != GameStatus::Playing {
            return;
        }

        let direction = if self.autopilot {
            BotController::calculate_move(&self.state)
        } else {
            self.requested
        };
        let now = self.now();
        let result = rules::tick(&self.state, direction, &mut self.rng, now);

        if let TickOutcome::Lost(reason) = result.outcome
            && !self.autopilot
            && let Some(window) = self.state.settings.grace_period()
        {
            self.next_grace_id += 1;
            log!(
                "Collision ({:?}) pending, grace period {} armed for {} ms",
                reason,
                self.next_grace_id,
                window.as_millis()
            );
            let timer = GraceTimer::arm(self.next_grace_id, window, self.grace_tx.clone());
            self.pending = Some(PendingLoss { timer, result });
            return;
        }

        self.apply(result).await;
    }

    async fn on_grace_expired(&mut self, id: u64) {
        if let Some(pending) = self.pending.take_if(|p| p.timer.token().id() == id) {
            self.apply(pending.result).await;
        }
    }

    /// Returns false when the session should stop.
    async fn on_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Turn(direction) => self.on_turn(direction).await,
            SessionCommand::ToggleAutopilot => {
                self.autopilot = !self.autopilot;
                log!("Autopilot {}", if self.autopilot { "on" } else { "off" });
            }
            SessionCommand::Pause if self.pending.is_none() => {
                self.replace_status(rules::pause(&self.state)).await;
            }
            SessionCommand::Resume => {
                self.replace_status(rules::resume(&self.state)).await;
            }
            SessionCommand::Pause => {}
            SessionCommand::Restart => self.restart().await,
            SessionCommand::Stop => {
                log!("Session stopped at score {}", self.state.score);
                if let Some(pending) = self.pending.take() {
                    pending.timer.cancel();
                }
                return false;
            }
        }
        true
    }

    async fn on_turn(&mut self, direction: Direction) {
        if let Some(pending) = self.pending.take() {
            let now = self.now();
            let attempt = rules::tick(&self.state, direction, &mut self.rng, now);
            if !matches!(attempt.outcome, TickOutcome::Lost(_)) && pending.timer.try_correct() {
                self.requested = direction;
                self.apply(attempt).await;
            } else {
                // Either the turn still collides or the timer already finalized;
                // the expiry notification settles the latter.
                self.pending = Some(pending);
            }
            return;
        }

        if self.state.status != GameStatus::Playing || direction.is_opposite(&self.state.direction) {
            return;
        }
        self.requested = direction;
        if self.autopilot {
            self.autopilot = false;
            log!("Manual turn, autopilot off");
        }
    }

    async fn restart(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.timer.cancel();
        }
        let idle = rules::reset(&self.state);
        self.broadcaster.broadcast_status(idle.status, idle.score).await;

        let now = self.now();
        self.state = rules::start(&idle.settings, &mut self.rng, now);
        self.requested = self.state.direction;
        self.broadcaster.broadcast_state(self.state.clone()).await;
        self.broadcaster
            .broadcast_status(self.state.status, self.state.score)
            .await;
    }

    async fn replace_status(&mut self, next: GameState) {
        if next.status == self.state.status {
            return;
        }
        self.state = next;
        self.broadcaster
            .broadcast_status(self.state.status, self.state.score)
            .await;
    }

    async fn apply(&mut self, result: TickResult) {
        let previous_score = self.state.score;
        let previous_status = self.state.status;

        self.state = result.state;
        self.requested = self.state.direction;
        self.broadcaster.broadcast_state(self.state.clone()).await;

        if self.state.status.is_terminal() {
            self.record_high_score();
        }
        if self.state.score != previous_score || self.state.status != previous_status {
            self.broadcaster
                .broadcast_status(self.state.status, self.state.score)
                .await;
        }
    }

    fn record_high_score(&mut self) {
        if self.state.score <= self.high_score {
            return;
        }
        self.high_score = self.state.score;
        self.new_high_score = true;
        log!("New high score: {}", self.high_score);
        if let Err(e) = self.high_scores.save(self.high_score) {
            log_warn!("Failed to save high score: {}", e);
        }
    }

    fn finish(self) -> SessionSummary {
        SessionSummary {
            status: self.state.status,
            score: self.state.score,
            ticks: self.state.tick,
            loss_reason: self.state.loss_reason,
            high_score: self.high_score,
            new_high_score: self.new_high_score,
            seed: self.rng.seed(),
        }
    }
}
