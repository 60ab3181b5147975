//! Timer engine for the interval timer.
//!
//! This module provides the core timer functionality:
//! - An explicitly armed/disarmed tick driver
//! - Session ⇄ break transitions with one-shot completion notifications
//! - Length adjustment that respects the running guard
//! - A single-task command loop so ticks and controls never overlap

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

use crate::types::{EngineConfig, Phase, TickOutcome, TimerSnapshot, TimerState};

/// Capacity of the control channel feeding the engine loop.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for logging and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown resumed
    Started {
        /// Phase being counted down
        phase: Phase,
        /// Seconds left at resume time
        remaining_seconds: u32,
    },
    /// Countdown frozen by the user
    Paused {
        /// Phase being counted down
        phase: Phase,
        /// Seconds left at pause time
        remaining_seconds: u32,
    },
    /// One interval elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// A phase ran out and the next one was loaded
    PhaseCompleted {
        /// Phase that ran out
        ended: Phase,
        /// Phase now loaded
        next: Phase,
        /// Notification text raised
        message: String,
    },
    /// Timer restored to defaults
    Reset,
    /// A phase length was changed
    LengthAdjusted {
        /// Adjusted phase
        phase: Phase,
        /// New length in minutes
        minutes: u32,
    },
    /// Pending notification acknowledged
    NotificationDismissed,
}

// ============================================================================
// TickDriver
// ============================================================================

/// Periodic tick source.
///
/// Holds at most one pending deadline. Arming replaces any previous deadline,
/// so two drivers can never be live at once; disarming drops it.
#[derive(Debug)]
pub struct TickDriver {
    period: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl TickDriver {
    /// Creates a disarmed driver firing every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
            generation: 0,
        }
    }

    /// Arms the driver, discarding any previous schedule.
    ///
    /// The first firing happens one full period from now.
    pub fn arm(&mut self) {
        self.generation += 1;
        self.deadline = Some(Instant::now() + self.period);
        tracing::debug!(generation = self.generation, "tick driver armed");
    }

    /// Disarms the driver. No firing is observed afterwards.
    pub fn disarm(&mut self) {
        if self.deadline.take().is_some() {
            tracing::debug!(generation = self.generation, "tick driver disarmed");
        }
    }

    /// Returns true while a firing is scheduled.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns how many times the driver has been armed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the firing period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits for the next firing.
    ///
    /// Never completes while disarmed. Cancel-safe: dropping the future
    /// before it completes leaves the schedule untouched.
    pub async fn fired(&mut self) {
        let Some(deadline) = self.deadline else {
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        // Late wake-ups skip missed firings instead of bursting.
        let next = deadline + self.period;
        let now = Instant::now();
        self.deadline = Some(if next > now { next } else { now + self.period });
    }
}

// ============================================================================
// Engine commands
// ============================================================================

/// Control operations accepted by the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Start/pause toggle
    Toggle,
    /// Restore defaults
    Reset,
    /// Change a phase length
    Adjust {
        /// Adjusted phase
        phase: Phase,
        /// Signed step in minutes
        delta: i32,
    },
    /// Clear the pending notification
    Dismiss,
    /// Read the current state
    Snapshot,
    /// Tear the engine down
    Shutdown,
}

/// A control paired with the channel its resulting snapshot is sent on.
#[derive(Debug)]
pub struct EngineCommand {
    /// Requested operation
    pub control: Control,
    /// Receives the state after the operation
    pub reply: oneshot::Sender<TimerSnapshot>,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the timer state and its tick driver.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Tick source, armed exactly while `state.running`
    driver: TickDriver,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new TimerEngine with the given configuration and event channel.
    pub fn new(config: EngineConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(),
            driver: TickDriver::new(config.tick_interval()),
            event_tx,
        }
    }

    /// Flips between running and paused. Returns the new running flag.
    ///
    /// Any pending notification is cleared.
    pub fn toggle(&mut self) -> bool {
        let running = self.state.toggle();
        let phase = self.state.phase;
        let remaining_seconds = self.state.remaining_seconds;

        if running {
            self.driver.arm();
            self.emit(TimerEvent::Started {
                phase,
                remaining_seconds,
            });
        } else {
            self.driver.disarm();
            self.emit(TimerEvent::Paused {
                phase,
                remaining_seconds,
            });
        }
        running
    }

    /// Restores the initial state and stops the countdown.
    pub fn reset(&mut self) {
        self.driver.disarm();
        self.state.reset();
        self.emit(TimerEvent::Reset);
    }

    /// Moves the length of `phase` by `delta` minutes and returns the new length.
    ///
    /// While running the remaining time is left alone, but a changed length
    /// restarts the driver's period.
    pub fn adjust_length(&mut self, phase: Phase, delta: i32) -> u32 {
        let before = self.state.lengths.minutes(phase);
        let minutes = self.state.adjust_length(phase, delta);

        if self.state.running && minutes != before {
            self.driver.arm();
        }

        self.emit(TimerEvent::LengthAdjusted { phase, minutes });
        minutes
    }

    /// Clears the pending notification.
    pub fn dismiss(&mut self) {
        if self.state.dismiss() {
            self.emit(TimerEvent::NotificationDismissed);
        }
    }

    /// Applies one driver firing.
    ///
    /// Returns `None` when the countdown is frozen.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.state.running {
            tracing::trace!("tick ignored while paused");
            return None;
        }

        let outcome = self.state.tick();
        match outcome {
            TickOutcome::Decremented { remaining_seconds } => {
                self.emit(TimerEvent::Tick { remaining_seconds });
            }
            TickOutcome::Completed { ended, next } => {
                self.driver.disarm();
                let message = ended.completion_message().to_string();
                tracing::debug!(ended = ended.as_str(), next = next.as_str(), "phase completed");
                self.emit(TimerEvent::PhaseCompleted {
                    ended,
                    next,
                    message,
                });
            }
        }
        Some(outcome)
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a reference to the tick driver.
    pub fn driver(&self) -> &TickDriver {
        &self.driver
    }

    /// Returns the read-only projection of the current state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from_timer_state(&self.state)
    }

    /// Spawns the engine loop and returns a handle to control it.
    pub fn spawn(self) -> (EngineHandle, JoinHandle<TimerSnapshot>) {
        let (handle, commands) = EngineHandle::channel();
        let task = tokio::spawn(self.run(commands));
        (handle, task)
    }

    /// Runs the engine loop until shut down or every handle is dropped.
    ///
    /// Controls and driver firings are handled one at a time, so a phase
    /// switch always completes before the next control is observed.
    /// Returns the final state.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) -> TimerSnapshot {
        tracing::debug!(period_ms = self.driver.period().as_millis() as u64, "timer engine started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(EngineCommand { control, reply }) = command else {
                        break;
                    };
                    if control == Control::Shutdown {
                        self.driver.disarm();
                        let _ = reply.send(self.snapshot());
                        break;
                    }
                    self.apply(control);
                    if reply.send(self.snapshot()).is_err() {
                        tracing::debug!(?control, "requester went away before the reply");
                    }
                }
                _ = self.driver.fired() => {
                    self.tick();
                }
            }
        }

        self.driver.disarm();
        tracing::debug!("timer engine stopped");
        self.snapshot()
    }

    /// Dispatches a control operation.
    fn apply(&mut self, control: Control) {
        match control {
            Control::Toggle => {
                self.toggle();
            }
            Control::Reset => self.reset(),
            Control::Adjust { phase, delta } => {
                self.adjust_length(phase, delta);
            }
            Control::Dismiss => self.dismiss(),
            Control::Snapshot | Control::Shutdown => {}
        }
    }

    /// Sends an event. A closed receiver never fails an operation.
    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("event receiver closed; event dropped");
        }
    }
}

// ============================================================================
// EngineHandle
// ============================================================================

/// Cloneable handle used by surfaces to drive a running engine loop.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Creates a handle and the command receiver to pass to [`TimerEngine::run`].
    pub fn channel() -> (Self, mpsc::Receiver<EngineCommand>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    /// Starts or pauses the countdown.
    pub async fn toggle(&self) -> Result<TimerSnapshot> {
        self.request(Control::Toggle).await
    }

    /// Restores defaults.
    pub async fn reset(&self) -> Result<TimerSnapshot> {
        self.request(Control::Reset).await
    }

    /// Moves a phase length by `delta` minutes.
    pub async fn adjust_length(&self, phase: Phase, delta: i32) -> Result<TimerSnapshot> {
        self.request(Control::Adjust { phase, delta }).await
    }

    /// Clears the pending notification.
    pub async fn dismiss(&self) -> Result<TimerSnapshot> {
        self.request(Control::Dismiss).await
    }

    /// Reads the current state.
    pub async fn snapshot(&self) -> Result<TimerSnapshot> {
        self.request(Control::Snapshot).await
    }

    /// Stops the engine loop and returns its final state.
    pub async fn shutdown(&self) -> Result<TimerSnapshot> {
        self.request(Control::Shutdown).await
    }

    async fn request(&self, control: Control) -> Result<TimerSnapshot> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(EngineCommand { control, reply })
            .await
            .map_err(|_| anyhow!("Timer engine is not running"))?;

        rx.await.context("Timer engine stopped before replying")
    }
}

// ============================================================================
// Tests
// ============================================================================
