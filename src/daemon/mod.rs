//! Daemon module for the interval timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with state transitions and countdown logic
//! - `ipc`: Unix socket server exposing the engine to the CLI

pub mod ipc;
pub mod timer;

pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use timer::{Control, EngineHandle, TickDriver, TimerEngine, TimerEvent};

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

use crate::types::{DaemonConfig, TimerSnapshot};

/// How long in-flight connections may take to finish after shutdown.
const DRAIN_TIMEOUT_MS: u64 = 1000;

/// Runs the daemon until interrupted or asked to shut down over IPC.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the socket cannot
/// be bound.
pub async fn run(config: DaemonConfig) -> Result<TimerSnapshot> {
    config.validate().context("Invalid daemon configuration")?;

    let server = IpcServer::new(&config.socket_path)?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (handle, mut engine_task) = TimerEngine::new(config.engine.clone(), event_tx).spawn();
    let logger = tokio::spawn(log_events(event_rx));
    let handler = RequestHandler::new(handle.clone());

    tracing::info!(
        socket = ?config.socket_path,
        tick_interval_ms = config.engine.tick_interval_ms,
        "Daemon started"
    );

    let mut connections = JoinSet::new();
    let interrupt = signal::ctrl_c();
    tokio::pin!(interrupt);

    let final_state = loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    connections.spawn(async move {
                        if let Err(e) = IpcServer::serve_connection(stream, &handler).await {
                            tracing::warn!("IPC connection failed: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::warn!("{:#}", e),
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::warn!("IPC connection task failed: {}", e);
                }
            }
            finished = &mut engine_task => {
                tracing::info!("Shutdown requested over IPC");
                break finished.context("Timer engine task failed")?;
            }
            interrupted = &mut interrupt => {
                interrupted.context("Failed to listen for interrupt signal")?;
                tracing::info!("Interrupt received, shutting down");
                if let Err(e) = handle.shutdown().await {
                    tracing::debug!("Engine already stopped: {:#}", e);
                }
                break (&mut engine_task).await.context("Timer engine task failed")?;
            }
        }
    };

    drop(server);
    // Let the connection that carried a shutdown request write its reply
    let drained = timeout(Duration::from_millis(DRAIN_TIMEOUT_MS), async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::debug!("Aborting {} idle connection(s)", connections.len());
        connections.abort_all();
    }

    drop(handler);
    drop(handle);
    if let Err(e) = logger.await {
        tracing::warn!("Event logger task failed: {}", e);
    }

    tracing::info!(
        phase = final_state.phase.as_str(),
        remaining = %final_state.display,
        "Daemon stopped"
    );
    Ok(final_state)
}

/// Logs engine events until the engine drops its sender.
async fn log_events(mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TimerEvent::Tick { remaining_seconds } => {
                tracing::trace!(remaining_seconds, "tick");
            }
            TimerEvent::Started {
                phase,
                remaining_seconds,
            } => {
                tracing::info!(phase = phase.as_str(), remaining_seconds, "Timer started");
            }
            TimerEvent::Paused {
                phase,
                remaining_seconds,
            } => {
                tracing::info!(phase = phase.as_str(), remaining_seconds, "Timer paused");
            }
            TimerEvent::PhaseCompleted {
                ended,
                next,
                message,
            } => {
                tracing::info!(ended = ended.as_str(), next = next.as_str(), "{}", message);
            }
            TimerEvent::Reset => tracing::info!("Timer reset"),
            TimerEvent::LengthAdjusted { phase, minutes } => {
                tracing::info!(phase = phase.as_str(), minutes, "Length adjusted");
            }
            TimerEvent::NotificationDismissed => tracing::debug!("Notification dismissed"),
        }
    }
}
