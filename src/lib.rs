//! pomotimer Library
//!
//! This library provides the core functionality for the pomotimer CLI.
//! It includes:
//! - Session/break state machine with clamped phase lengths
//! - Timer engine with an explicitly armed tick driver
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod types;

// Re-export commonly used types for convenience
pub use daemon::{EngineHandle, TimerEngine, TimerEvent};
pub use types::{
    DaemonConfig, EngineConfig, IpcRequest, IpcResponse, Phase, PhaseLengths, TimerSnapshot,
    TimerState,
};
