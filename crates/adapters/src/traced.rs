// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability.

use crate::agent::{AgentAdapter, AgentError, AgentHandle, AgentSpawnConfig};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing spans/events around any [`AgentAdapter`].
#[derive(Clone)]
pub struct TracedAgent<A> {
    inner: A,
}

impl<A> TracedAgent<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AgentAdapter> AgentAdapter for TracedAgent<A> {
    async fn spawn(&self, config: AgentSpawnConfig) -> Result<AgentHandle, AgentError> {
        let span = tracing::info_span!("agent.spawn", program = %config.program, cwd = %config.cwd.display());
        async {
            tracing::info!(args = ?config.args, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn(config).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(h) => tracing::info!(pid = ?h.pid, elapsed_ms, "agent spawned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn cancel(&self, pid: u32) -> Result<(), AgentError> {
        let result = self.inner.cancel(pid).await;
        tracing::info_span!("agent.cancel", pid).in_scope(|| match &result {
            Ok(()) => tracing::info!("cancel signal sent"),
            Err(e) => tracing::warn!(error = %e, "cancel failed"),
        });
        result
    }

    async fn kill(&self, pid: u32) -> Result<(), AgentError> {
        let result = self.inner.kill(pid).await;
        tracing::info_span!("agent.kill", pid).in_scope(|| match &result {
            Ok(()) => tracing::info!("kill signal sent"),
            Err(e) => tracing::warn!(error = %e, "kill failed (may be expected)"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
