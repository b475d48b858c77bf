// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real child-process implementation of [`AgentAdapter`].

use super::{AgentAdapter, AgentError, AgentExit, AgentHandle, AgentSpawnConfig, OutputChunk, OutputStream};
use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Spawns the coding-agent CLI as a real child process and captures its
/// stdout/stderr incrementally.
#[derive(Debug, Clone, Default)]
pub struct SubprocessAgentAdapter;

impl SubprocessAgentAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentAdapter for SubprocessAgentAdapter {
    async fn spawn(&self, config: AgentSpawnConfig) -> Result<AgentHandle, AgentError> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args)
            .current_dir(&config.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (k, v) in &config.env {
            cmd.env(k, v);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::SpawnFailed(format!("{}: {e}", config.program)))?;

        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::SpawnFailed("no stdout pipe".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::SpawnFailed("no stderr pipe".to_string()))?;

        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = oneshot::channel();

        spawn_reader(output_tx.clone(), stdout, OutputStream::Stdout);
        spawn_reader(output_tx, stderr, OutputStream::Stderr);

        tokio::spawn(async move {
            let status = child.wait().await;
            let exit = match status {
                Ok(status) => match status.code() {
                    Some(code) => AgentExit::Exited(code),
                    None => AgentExit::Signaled,
                },
                Err(_) => AgentExit::Signaled,
            };
            let _ = exit_tx.send(exit);
        });

        Ok(AgentHandle {
            pid,
            output_rx,
            exit_rx,
        })
    }

    async fn cancel(&self, pid: u32) -> Result<(), AgentError> {
        send_signal(pid, Signal::SIGTERM)
    }

    async fn kill(&self, pid: u32) -> Result<(), AgentError> {
        send_signal(pid, Signal::SIGKILL)
    }
}

fn send_signal(pid: u32, sig: Signal) -> Result<(), AgentError> {
    signal::kill(Pid::from_raw(pid as i32), sig)
        .map_err(|e| AgentError::SignalFailed(format!("pid {pid}: {e}")))
}

/// Reads a child output stream in fixed-size chunks and forwards them on
/// `tx`, tagged by stream. Runs until EOF or the channel is dropped.
fn spawn_reader(
    tx: mpsc::UnboundedSender<OutputChunk>,
    mut reader: impl tokio::io::AsyncRead + Unpin + Send + 'static,
    stream: OutputStream,
) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8192];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx
                        .send(OutputChunk {
                            stream,
                            bytes: buf[..n].to_vec(),
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
