//! IPC Server for the interval timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer controls
//! - Dispatch to the engine loop through an [`EngineHandle`]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

use crate::types::{IpcRequest, IpcResponse, Phase, TimerSnapshot};

use super::timer::EngineHandle;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Client hung up without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::info!(path = ?socket_path, "IPC server listening");

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write half or a full JSON
    /// document has arrived, bounded by [`MAX_REQUEST_SIZE`] and a read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(512);
        let mut limited = (&mut *stream).take(MAX_REQUEST_SIZE as u64 + 1);

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            read_request_bytes(&mut limited, &mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer)
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;
        stream
            .shutdown()
            .await
            .context("Failed to shut down response stream")?;

        Ok(())
    }

    /// Serves a single connection: one request, one response.
    ///
    /// Returns true when the client asked the daemon to shut down.
    pub async fn serve_connection(mut stream: UnixStream, handler: &RequestHandler) -> Result<bool> {
        let (response, shutdown) = match Self::receive_request(&mut stream).await {
            Ok(request) => {
                tracing::debug!(?request, "IPC request received");
                let shutdown = request == IpcRequest::Shutdown;
                let response = handler.handle(request).await;
                let shutdown = shutdown && !response.is_error();
                (response, shutdown)
            }
            Err(e) => {
                tracing::warn!("Rejected IPC request: {:#}", e);
                (IpcResponse::error(e.to_string()), false)
            }
        };

        Self::send_response(&mut stream, &response).await?;
        Ok(shutdown)
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Reads until end of stream or until the buffer holds a complete JSON document.
async fn read_request_bytes<R>(reader: &mut R, buffer: &mut Vec<u8>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 512];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        // A complete JSON document ends the request even if the client keeps
        // its write half open.
        if serde_json::from_slice::<serde::de::IgnoredAny>(buffer.as_slice()).is_ok() {
            return Ok(());
        }
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the engine loop.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    /// Handle to the running timer engine
    engine: EngineHandle,
}

impl RequestHandler {
    /// Creates a new request handler with the given engine handle.
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Reset => {
                Self::respond(self.engine.reset().await, |_| "Timer reset".to_string())
            }
            IpcRequest::Adjust { phase, delta } => self.handle_adjust(phase, delta).await,
            IpcRequest::Dismiss => Self::respond(self.engine.dismiss().await, |_| {
                "Notification dismissed".to_string()
            }),
            IpcRequest::Status => Self::respond(self.engine.snapshot().await, |_| String::new()),
            IpcRequest::Shutdown => Self::respond(self.engine.shutdown().await, |_| {
                "Daemon shutting down".to_string()
            }),
        }
    }

    /// Handles the start/pause toggle.
    async fn handle_toggle(&self) -> IpcResponse {
        Self::respond(self.engine.toggle().await, |snapshot| {
            if snapshot.running {
                "Timer started".to_string()
            } else {
                "Timer paused".to_string()
            }
        })
    }

    /// Handles a length adjustment.
    async fn handle_adjust(&self, phase: Phase, delta: i32) -> IpcResponse {
        Self::respond(self.engine.adjust_length(phase, delta).await, |snapshot| {
            let minutes = match phase {
                Phase::Session => snapshot.session_minutes,
                Phase::Break => snapshot.break_minutes,
            };
            format!("{} length set to {} min", phase.label(), minutes)
        })
    }

    fn respond(
        result: Result<TimerSnapshot>,
        message: impl FnOnce(&TimerSnapshot) -> String,
    ) -> IpcResponse {
        match result {
            Ok(snapshot) => IpcResponse::success(message(&snapshot), Some(snapshot)),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
