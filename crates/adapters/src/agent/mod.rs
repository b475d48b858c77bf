// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent process adapters.
//!
//! The `AgentAdapter` trait treats the coding-agent CLI as opaque: argv,
//! environment, working directory in, incrementally-captured stdout/stderr
//! and an exit status out. Two implementations exist:
//! [`SubprocessAgentAdapter`] spawns a real child process; [`FakeAgentAdapter`]
//! (mock mode) produces a deterministic synthetic transcript without
//! spawning anything.

mod fake;
mod subprocess;

pub use fake::{AgentCall, FakeAgentAdapter};
pub use subprocess::SubprocessAgentAdapter;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Errors from agent process operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("signal failed: {0}")]
    SignalFailed(String),
    #[error("agent not found: {0}")]
    NotFound(String),
}

/// Configuration for spawning a coding-agent child process.
#[derive(Debug, Clone)]
pub struct AgentSpawnConfig {
    /// Executable path (resolved from `AGENT_CLI_PATH` or discovery).
    pub program: String,
    /// Constructed argv, task description and flags already serialized.
    pub args: Vec<String>,
    /// Working directory for the child (the task's effective project path).
    pub cwd: PathBuf,
    /// Extra environment variables to set on top of the inherited
    /// environment.
    pub env: Vec<(String, String)>,
}

/// Which output stream a captured chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A chunk of captured child output, tagged by stream.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    pub stream: OutputStream,
    pub bytes: Vec<u8>,
}

/// Terminal outcome of a spawned agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentExit {
    /// Process exited on its own with the given code.
    Exited(i32),
    /// Process was killed by a signal (no exit code available).
    Signaled,
}

/// Handle to a running (or just-finished) agent process.
pub struct AgentHandle {
    /// OS process id, when available (not set in mock mode).
    pub pid: Option<u32>,
    /// Incrementally delivered stdout/stderr chunks.
    pub output_rx: mpsc::UnboundedReceiver<OutputChunk>,
    /// Resolves once the process has exited.
    pub exit_rx: oneshot::Receiver<AgentExit>,
}

/// Adapter for managing the coding-agent child process.
#[async_trait]
pub trait AgentAdapter: Send + Sync + 'static {
    /// Spawn a new agent process. Returns immediately; output and exit
    /// status are delivered asynchronously via the returned handle's
    /// channels.
    async fn spawn(&self, config: AgentSpawnConfig) -> Result<AgentHandle, AgentError>;

    /// Send the platform soft-termination signal (SIGTERM) to the process
    /// identified by `pid`.
    async fn cancel(&self, pid: u32) -> Result<(), AgentError>;

    /// Send the platform hard-kill signal (SIGKILL).
    async fn kill(&self, pid: u32) -> Result<(), AgentError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
