// src/draw.rs

use crate::app_state::AppState;
use crate::entry::Entry;
use crate::error::{InvalidStateError, LotteryError, Result};
use crate::history_manager::HistoryRecord;
use crate::selector::{percent_of, select_weighted, RandomSource};
use chrono::Utc;
use std::future::{self, Future};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

/// Where the orchestrator is in its per-draw cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawPhase {
    #[default]
    Idle,
    /// Waiting out the suspension window; further draws are rejected.
    Drawing,
    /// The last draw produced a winner.
    Settled,
}

/// Result of one resolved draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    /// The winning entry as it was when the draw resolved.
    pub winner: Entry,
    /// Pool weight at selection time.
    pub total_weight: f64,
    /// The ledger record written for this draw.
    pub record: HistoryRecord,
}

/// Phase transitions, for whatever is rendering them.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Started,
    Settled(DrawOutcome),
    /// The draw ended without a winner (cancelled, dropped, or the pool was
    /// emptied during the window).
    Cancelled,
}

const EVENT_CAPACITY: usize = 16;

/// Sequences a draw: validate, wait out the suspension window, select,
/// record, notify.
///
/// The pool is read when the window expires, so edits made while a draw is
/// in flight affect its outcome.
pub struct DrawOrchestrator {
    state: Mutex<AppState>,
    phase: Mutex<DrawPhase>,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    delay: Duration,
    events: broadcast::Sender<DrawEvent>,
}

impl DrawOrchestrator {
    pub fn new(state: AppState, rng: impl RandomSource + Send + 'static, delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        DrawOrchestrator {
            state: Mutex::new(state),
            phase: Mutex::new(DrawPhase::Idle),
            rng: Mutex::new(Box::new(rng)),
            delay,
            events,
        }
    }

    /// Locks the application state for reading or editing. Do not hold the
    /// guard across an `.await`.
    pub fn state(&self) -> MutexGuard<'_, AppState> {
        lock(&self.state)
    }

    pub fn phase(&self) -> DrawPhase {
        *lock(&self.phase)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DrawEvent> {
        self.events.subscribe()
    }

    /// Runs one draw to completion.
    ///
    /// # Errors
    ///
    /// `InvalidStateError::EmptyPool` if there is nothing to draw from (at the
    /// start or when the window expires), `InvalidStateError::AlreadyDrawing`
    /// while another draw is in flight.
    pub async fn start_draw(&self) -> Result<DrawOutcome> {
        self.start_draw_until(future::pending()).await
    }

    /// Like [`start_draw`](Self::start_draw), but gives up with
    /// `LotteryError::Cancelled` if `cancel` completes before the window
    /// expires. A cancelled or dropped draw leaves entries and history
    /// untouched and returns the phase to `Idle`.
    pub async fn start_draw_until<F>(&self, cancel: F) -> Result<DrawOutcome>
    where
        F: Future<Output = ()>,
    {
        {
            let mut phase = lock(&self.phase);
            if *phase == DrawPhase::Drawing {
                return Err(InvalidStateError::AlreadyDrawing.into());
            }
            if lock(&self.state).entries().is_empty() {
                return Err(InvalidStateError::EmptyPool.into());
            }
            *phase = DrawPhase::Drawing;
        }
        let _ = self.events.send(DrawEvent::Started);
        let guard = DrawingGuard {
            orchestrator: self,
            settled: false,
        };

        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = cancel => {
                log::info!("Draw cancelled before it resolved");
                return Err(LotteryError::Cancelled);
            }
        }

        let outcome = self.resolve()?;
        guard.settle(&outcome);
        Ok(outcome)
    }

    fn resolve(&self) -> Result<DrawOutcome> {
        let mut state = lock(&self.state);
        let total_weight = state.entries().total_weight();
        let mut rng = lock(&self.rng);
        let winner = select_weighted(state.entries().list(), &mut **rng)?.clone();
        drop(rng);

        let probability = percent_of(winner.weight, total_weight);
        let record = state.record_draw(&winner, probability, Utc::now());
        log::info!(
            "Drew '{}' (weight {}, {:.1}%)",
            winner.name,
            winner.weight,
            probability
        );

        Ok(DrawOutcome {
            winner,
            total_weight,
            record,
        })
    }
}

/// Returns the phase to `Idle` unless the draw settled, so an early return,
/// a cancellation or a dropped future never leaves the orchestrator stuck in
/// `Drawing`.
struct DrawingGuard<'a> {
    orchestrator: &'a DrawOrchestrator,
    settled: bool,
}

impl DrawingGuard<'_> {
    fn settle(mut self, outcome: &DrawOutcome) {
        self.settled = true;
        *lock(&self.orchestrator.phase) = DrawPhase::Settled;
        let _ = self
            .orchestrator
            .events
            .send(DrawEvent::Settled(outcome.clone()));
    }
}

impl Drop for DrawingGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        *lock(&self.orchestrator.phase) = DrawPhase::Idle;
        let _ = self.orchestrator.events.send(DrawEvent::Cancelled);
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
