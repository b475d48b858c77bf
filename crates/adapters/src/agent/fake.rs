// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic mock-mode agent adapter, selected via `AGENT_MOCK`.
//!
//! No child process is spawned. A synthetic transcript is emitted on the
//! output channel and the configured exit (default: success) is delivered
//! after a short simulated delay, so task state machines still observe the
//! full `STARTED -> RUNNING -> COMPLETED` (or `FAILED`) sequence.

use super::{AgentAdapter, AgentError, AgentExit, AgentHandle, AgentSpawnConfig, OutputChunk, OutputStream};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Recorded call to [`FakeAgentAdapter`], for assertions in tests that use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCall {
    Spawn { program: String, args: Vec<String> },
    Cancel { pid: u32 },
    Kill { pid: u32 },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<AgentCall>,
    next_pid: u32,
    /// Forced exit for the next spawn, by insertion order (FIFO); absent
    /// entries default to a clean `Exited(0)`.
    forced_exits: Vec<AgentExit>,
    /// Simulated delay before the transcript completes.
    delay: Duration,
    /// Pids that have been cancelled/killed: `cancel`/`kill` race the
    /// delayed completion and make it resolve to `Signaled` instead.
    signaled: std::collections::HashSet<u32>,
    signal_notify: HashMap<u32, Vec<tokio::sync::oneshot::Sender<()>>>,
}

/// Fake agent adapter for mock mode and deterministic tests.
#[derive(Clone)]
pub struct FakeAgentAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeAgentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAgentAdapter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                delay: Duration::from_millis(50),
                ..Default::default()
            })),
        }
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    /// Queue a forced exit for the next `spawn()` call (FIFO).
    pub fn push_forced_exit(&self, exit: AgentExit) {
        self.inner.lock().forced_exits.push(exit);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = delay;
    }
}

#[async_trait]
impl AgentAdapter for FakeAgentAdapter {
    async fn spawn(&self, config: AgentSpawnConfig) -> Result<AgentHandle, AgentError> {
        let (pid, delay, forced_exit) = {
            let mut inner = self.inner.lock();
            inner.next_pid += 1;
            let pid = inner.next_pid;
            inner.calls.push(AgentCall::Spawn {
                program: config.program.clone(),
                args: config.args.clone(),
            });
            let forced = if inner.forced_exits.is_empty() {
                None
            } else {
                Some(inner.forced_exits.remove(0))
            };
            (pid, inner.delay, forced)
        };

        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = oneshot::channel();
        let (signal_tx, signal_rx) = oneshot::channel();
        {
            let mut inner = self.inner.lock();
            inner
                .signal_notify
                .entry(pid)
                .or_default()
                .push(signal_tx);
        }

        let _ = output_tx.send(OutputChunk {
            stream: OutputStream::Stdout,
            bytes: format!("[mock] running: {} {:?}\n", config.program, config.args).into_bytes(),
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let signaled = inner.lock().signaled.contains(&pid);
                    let exit = if signaled {
                        AgentExit::Signaled
                    } else {
                        forced_exit.unwrap_or(AgentExit::Exited(0))
                    };
                    let _ = output_tx.send(OutputChunk {
                        stream: OutputStream::Stdout,
                        bytes: b"[mock] done\n".to_vec(),
                    });
                    let _ = exit_tx.send(exit);
                }
                _ = signal_rx => {
                    let _ = output_tx.send(OutputChunk {
                        stream: OutputStream::Stdout,
                        bytes: b"[mock] signaled\n".to_vec(),
                    });
                    let _ = exit_tx.send(AgentExit::Signaled);
                }
            }
        });

        Ok(AgentHandle {
            pid: Some(pid),
            output_rx,
            exit_rx,
        })
    }

    async fn cancel(&self, pid: u32) -> Result<(), AgentError> {
        self.signal(pid, AgentCall::Cancel { pid })
    }

    async fn kill(&self, pid: u32) -> Result<(), AgentError> {
        self.signal(pid, AgentCall::Kill { pid })
    }
}

impl FakeAgentAdapter {
    fn signal(&self, pid: u32, call: AgentCall) -> Result<(), AgentError> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        inner.signaled.insert(pid);
        if let Some(senders) = inner.signal_notify.remove(&pid) {
            for tx in senders {
                let _ = tx.send(());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
