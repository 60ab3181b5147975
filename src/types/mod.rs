//! Core data types for the interval timer.
//!
//! This module defines the data structures used for:
//! - The session/break state machine and its length rules
//! - Engine configuration with validation
//! - IPC request/response serialization

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Phase
// ============================================================================

/// The two phases the timer alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work
    Session,
    /// Rest between sessions
    Break,
}

impl Phase {
    /// Returns the wire representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Session => "session",
            Phase::Break => "break",
        }
    }

    /// Returns the heading shown by the display surface.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Session => "Session",
            Phase::Break => "Break",
        }
    }

    /// Returns the phase that follows this one.
    pub fn counterpart(&self) -> Phase {
        match self {
            Phase::Session => Phase::Break,
            Phase::Break => Phase::Session,
        }
    }

    /// Returns the inclusive (min, max) length in minutes.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Phase::Session => (MIN_LENGTH_MINUTES, MAX_SESSION_MINUTES),
            Phase::Break => (MIN_LENGTH_MINUTES, MAX_BREAK_MINUTES),
        }
    }

    /// Returns the message announced when this phase runs out.
    pub fn completion_message(&self) -> &'static str {
        match self {
            Phase::Session => "Time to take a break!",
            Phase::Break => "Time to get back to work!",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Session
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// PhaseLengths
// ============================================================================

/// Default session length in minutes.
pub const DEFAULT_SESSION_MINUTES: u32 = 25;

/// Default break length in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Shortest length either phase may be set to.
pub const MIN_LENGTH_MINUTES: u32 = 1;

/// Longest session length.
pub const MAX_SESSION_MINUTES: u32 = 60;

/// Longest break length.
pub const MAX_BREAK_MINUTES: u32 = 30;

/// Per-phase durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLengths {
    /// Session length (1-60)
    pub session_minutes: u32,
    /// Break length (1-30)
    pub break_minutes: u32,
}

impl Default for PhaseLengths {
    fn default() -> Self {
        Self {
            session_minutes: DEFAULT_SESSION_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl PhaseLengths {
    /// Returns the configured length of `phase` in minutes.
    pub fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Session => self.session_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Returns the configured length of `phase` in seconds.
    pub fn seconds(&self, phase: Phase) -> u32 {
        self.minutes(phase) * 60
    }

    /// Moves the length of `phase` by `delta` minutes, clamped to the phase's
    /// bounds, and returns the new length.
    pub fn adjust(&mut self, phase: Phase, delta: i32) -> u32 {
        let (min, max) = phase.bounds();
        let next = (i64::from(self.minutes(phase)) + i64::from(delta))
            .clamp(i64::from(min), i64::from(max)) as u32;

        match phase {
            Phase::Session => self.session_minutes = next,
            Phase::Break => self.break_minutes = next,
        }
        next
    }
}

// ============================================================================
// Notification
// ============================================================================

/// A one-shot message raised when a phase completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Text shown by the notification surface
    pub message: String,
}

impl Notification {
    /// Builds the notification for the phase that just ended.
    pub fn phase_completed(ended: Phase) -> Self {
        Self {
            message: ended.completion_message().to_string(),
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Result of applying one driver firing to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second was taken off the clock
    Decremented {
        /// Seconds left afterwards
        remaining_seconds: u32,
    },
    /// The clock was already at zero and the phase switched
    Completed {
        /// Phase that ran out
        ended: Phase,
        /// Phase now loaded
        next: Phase,
    },
}

/// The session/break state machine.
///
/// All transitions are plain synchronous methods; the engine decides when
/// they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Active phase
    pub phase: Phase,
    /// Configured phase lengths
    pub lengths: PhaseLengths,
    /// Seconds left in the active phase
    pub remaining_seconds: u32,
    /// Whether the countdown is live
    pub running: bool,
    /// Message raised by the last phase completion, until dismissed
    pub notification: Option<Notification>,
    /// Phase active before the most recent switch
    previous_phase: Phase,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    /// Creates an idle state at the start of a default session.
    pub fn new() -> Self {
        let lengths = PhaseLengths::default();
        Self {
            phase: Phase::Session,
            remaining_seconds: lengths.seconds(Phase::Session),
            lengths,
            running: false,
            notification: None,
            previous_phase: Phase::Session,
        }
    }

    /// Applies one decrement.
    ///
    /// At zero this instead completes the phase: the notification is built
    /// from the phase that is ending, the countdown stops, and the other
    /// phase is loaded at full length.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            return TickOutcome::Decremented {
                remaining_seconds: self.remaining_seconds,
            };
        }

        let ended = self.phase;
        self.notification = Some(Notification::phase_completed(ended));
        self.running = false;
        self.previous_phase = ended;
        self.phase = ended.counterpart();
        self.remaining_seconds = self.lengths.seconds(self.phase);

        TickOutcome::Completed {
            ended,
            next: self.phase,
        }
    }

    /// Flips the running flag and clears any pending notification.
    ///
    /// Returns the new running flag.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.notification = None;
        self.running
    }

    /// Restores the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Moves the length of `phase` by `delta` minutes.
    ///
    /// The visible countdown follows the new session length only while idle
    /// in a session. Break adjustments and adjustments made while running
    /// leave `remaining_seconds` alone.
    pub fn adjust_length(&mut self, phase: Phase, delta: i32) -> u32 {
        let minutes = self.lengths.adjust(phase, delta);

        if phase == Phase::Session && !self.running && self.phase == Phase::Session {
            self.remaining_seconds = minutes * 60;
        }
        minutes
    }

    /// Clears the pending notification. Returns whether one was present.
    pub fn dismiss(&mut self) -> bool {
        self.notification.take().is_some()
    }

    /// Returns the phase active before the most recent switch.
    pub fn previous_phase(&self) -> Phase {
        self.previous_phase
    }

    /// Returns the remaining time as `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}

/// Formats a second count as zero-padded `MM:SS`.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Configuration
// ============================================================================

/// Default duration of one tick in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Tick interval must be positive
    #[error("Tick interval must be at least 1 ms")]
    ZeroTickInterval,

    /// Socket path could not be determined
    #[error("Could not determine the socket path: {0}")]
    SocketPath(String),
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Milliseconds per decrement
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Returns a configuration with the given tick interval.
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Returns the tick interval as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

/// Socket location relative to the home directory.
pub const DEFAULT_SOCKET_PATH: &str = ".pomotimer/pomotimer.sock";

/// Returns `~/.pomotimer/pomotimer.sock`.
pub fn default_socket_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_SOCKET_PATH))
        .ok_or_else(|| ConfigError::SocketPath("home directory not found".to_string()))
}

/// Daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on
    pub socket_path: PathBuf,
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DaemonConfig {
    /// Creates a configuration listening on `socket_path` with default engine settings.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            engine: EngineConfig::default(),
        }
    }

    /// Replaces the engine settings.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::SocketPath("path is empty".to_string()));
        }
        self.engine.validate()
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Read-only projection of the engine state consumed by every surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Active phase
    pub phase: Phase,
    /// Seconds left in the active phase
    pub remaining_seconds: u32,
    /// Remaining time as `MM:SS`
    pub display: String,
    /// Whether the countdown is live
    pub running: bool,
    /// Session length in minutes
    pub session_minutes: u32,
    /// Break length in minutes
    pub break_minutes: u32,
    /// Pending notification text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

impl TimerSnapshot {
    /// Creates a snapshot from timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
            display: state.clock(),
            running: state.running,
            session_minutes: state.lengths.session_minutes,
            break_minutes: state.lengths.break_minutes,
            notification: state.notification.as_ref().map(|n| n.message.clone()),
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start or pause the countdown
    Toggle,
    /// Restore defaults
    Reset,
    /// Change a phase length
    Adjust {
        /// Phase whose length changes
        phase: Phase,
        /// Signed step in minutes
        delta: i32,
    },
    /// Clear the pending notification
    Dismiss,
    /// Query the current state
    Status,
    /// Stop the daemon
    Shutdown,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional state snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TimerSnapshot>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<TimerSnapshot>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if the daemon reported an error.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
