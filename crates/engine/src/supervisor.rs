// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Supervisor (C7): spawns the coding-agent child process for an
//! admitted task, drives its lifecycle, and handles cancellation/timeout.

use crate::registry::TaskRegistry;
use crate::resource_sampler::ResourceSampler;
use crate::scheduler::SchedulerSignal;
use eto_adapters::{AgentAdapter, AgentExit, AgentSpawnConfig, OutputStream};
use eto_core::{Clock, ProjectTarget, TaskId, TaskState};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Configuration governing how the supervisor spawns and supervises tasks.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub agent_program: String,
    pub grace_period: Duration,
    pub running_grace: Duration,
    pub resource_sample_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            agent_program: "coding-agent".to_string(),
            grace_period: Duration::from_secs(5),
            running_grace: Duration::from_millis(500),
            resource_sample_interval: Duration::from_secs(1),
        }
    }
}

enum ControlMsg {
    Cancel,
}

struct RunningTask {
    pid: Option<u32>,
    control_tx: mpsc::UnboundedSender<ControlMsg>,
}

/// Drives admitted tasks to completion via an [`AgentAdapter`].
pub struct Supervisor<A, C> {
    registry: TaskRegistry,
    adapter: Arc<A>,
    clock: C,
    config: SupervisorConfig,
    running: Arc<Mutex<HashMap<TaskId, RunningTask>>>,
    scheduler_signal_tx: mpsc::Sender<SchedulerSignal>,
}

impl<A, C> Clone for Supervisor<A, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            adapter: Arc::clone(&self.adapter),
            clock: self.clock.clone(),
            config: self.config.clone(),
            running: Arc::clone(&self.running),
            scheduler_signal_tx: self.scheduler_signal_tx.clone(),
        }
    }
}

impl<A, C> Supervisor<A, C>
where
    A: AgentAdapter,
    C: Clock,
{
    pub fn new(
        registry: TaskRegistry,
        adapter: Arc<A>,
        clock: C,
        config: SupervisorConfig,
        scheduler_signal_tx: mpsc::Sender<SchedulerSignal>,
    ) -> Self {
        Self {
            registry,
            adapter,
            clock,
            config,
            running: Arc::new(Mutex::new(HashMap::new())),
            scheduler_signal_tx,
        }
    }

    /// Drain `admitted_rx` forever, spawning one driving task per admitted
    /// task id. Returns once the channel closes.
    pub async fn run(self, mut admitted_rx: mpsc::UnboundedReceiver<TaskId>) {
        while let Some(id) = admitted_rx.recv().await {
            let this = self.clone();
            tokio::spawn(async move {
                this.drive(id).await;
            });
        }
    }

    /// Soft-cancel a running or queued task. Cancelling an unknown id is an
    /// error, not a no-op.
    pub async fn cancel(&self, id: &TaskId) -> Result<(), crate::error::SupervisorError> {
        if let Some(running) = self.running.lock().get(id) {
            let _ = running.control_tx.send(ControlMsg::Cancel);
            return Ok(());
        }

        // Not running yet: if still queued, the scheduler layer handles
        // queued cancellation directly by transitioning to TERMINATED.
        match self.registry.get(id) {
            Some(task) if task.state == TaskState::Queued => {
                let now_ms = self.clock.epoch_ms();
                self.registry
                    .update_state(id, TaskState::Terminated, now_ms)
                    .map_err(|e| crate::error::SupervisorError::SpawnError(e.to_string()))?;
                Ok(())
            }
            Some(_) => Ok(()), // already terminal: cancellation is idempotent
            None => Err(crate::error::SupervisorError::TaskNotFound(id.to_string())),
        }
    }

    async fn drive(&self, id: TaskId) {
        let Some(task) = self.registry.get(&id) else {
            return;
        };

        let cwd = match &task.project_path {
            ProjectTarget::Path(p) => p.clone(),
            ProjectTarget::Active => PathBuf::from("."),
        };

        let (control_tx, mut control_rx) = mpsc::unbounded_channel();
        let config = AgentSpawnConfig {
            program: self.config.agent_program.clone(),
            args: vec![task.description.clone()],
            cwd,
            env: Vec::new(),
        };

        let mut handle = match self.adapter.spawn(config).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(task_id = %id, error = %e, "spawn failed");
                self.finish_without_exit(&id, TaskState::Error, format!("spawn failed: {e}"))
                    .await;
                return;
            }
        };

        self.running.lock().insert(
            id.clone(),
            RunningTask {
                pid: handle.pid,
                control_tx,
            },
        );

        let mut running_transitioned = false;
        let running_grace = tokio::time::sleep(self.config.running_grace);
        tokio::pin!(running_grace);

        let has_timeout = task.timeout_s.is_some();
        let timeout_duration = task
            .timeout_s
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60 * 24 * 365 * 10));
        let timeout_sleep = tokio::time::sleep(timeout_duration);
        tokio::pin!(timeout_sleep);

        let sampler = ResourceSampler::new(self.config.resource_sample_interval);
        let mut sample_tick = tokio::time::interval(self.config.resource_sample_interval);

        let final_state = loop {
            tokio::select! {
                biased;

                exit = &mut handle.exit_rx => {
                    let exit = exit.unwrap_or(AgentExit::Signaled);
                    break self.classify_exit(&id, exit).await;
                }

                Some(chunk) = handle.output_rx.recv() => {
                    match chunk.stream {
                        OutputStream::Stdout => { let _ = self.registry.append_stdout(&id, &chunk.bytes); }
                        OutputStream::Stderr => { let _ = self.registry.append_stderr(&id, &chunk.bytes); }
                    }
                    if !running_transitioned {
                        running_transitioned = true;
                        let now_ms = self.clock.epoch_ms();
                        let _ = self.registry.update_state(&id, TaskState::Running, now_ms);
                    }
                }

                _ = &mut running_grace, if !running_transitioned => {
                    running_transitioned = true;
                    let now_ms = self.clock.epoch_ms();
                    let _ = self.registry.update_state(&id, TaskState::Running, now_ms);
                }

                _ = &mut timeout_sleep, if has_timeout => {
                    break self.cancel_and_wait(&id, &mut handle.exit_rx).await;
                }

                msg = control_rx.recv() => {
                    if let Some(ControlMsg::Cancel) = msg {
                        break self.cancel_and_wait(&id, &mut handle.exit_rx).await;
                    }
                }

                _ = sample_tick.tick() => {
                    if let Some(pid) = handle.pid {
                        if let Some(reading) = sampler.sample(pid, self.clock.epoch_ms()) {
                            let _ = self.registry.set_resource(&id, reading);
                        }
                    }
                }
            }
        };

        self.running.lock().remove(&id);

        if final_state == TaskState::Failed || final_state == TaskState::Error {
            if let Some(task) = self.registry.get(&id) {
                if task.is_eligible_for_retry() {
                    let now_ms = self.clock.epoch_ms();
                    if self.registry.retry_requeue(&id, now_ms).is_ok() {
                        let _ = self.scheduler_signal_tx.send(SchedulerSignal::Submitted).await;
                        return;
                    }
                }
            }
        }
        let _ = self
            .scheduler_signal_tx
            .send(SchedulerSignal::TaskTerminal(id))
            .await;
    }

    /// Drive a task still in `STARTED` through `RUNNING` before a terminal
    /// transition. A real child can exit before producing output and before
    /// `running_grace` elapses, so the `STARTED -> RUNNING` edge can't be
    /// assumed to have already happened by the time the exit is observed.
    fn ensure_running(&self, id: &TaskId, now_ms: u64) {
        if let Some(task) = self.registry.get(id) {
            if task.state == TaskState::Started {
                let _ = self.registry.update_state(id, TaskState::Running, now_ms);
            }
        }
    }

    async fn classify_exit(&self, id: &TaskId, exit: AgentExit) -> TaskState {
        let now_ms = self.clock.epoch_ms();
        self.ensure_running(id, now_ms);
        match exit {
            AgentExit::Exited(code) => {
                let _ = self.registry.set_exit(id, code);
                let target = if code == 0 { TaskState::Completed } else { TaskState::Failed };
                if target == TaskState::Failed {
                    let _ = self
                        .registry
                        .set_failure_reason(id, format!("exit code {code}"));
                }
                let _ = self.registry.update_state(id, target, now_ms);
                target
            }
            AgentExit::Signaled => {
                // A signaled exit with no pending cancellation is an
                // unexpected process death, not a requested termination.
                let _ = self
                    .registry
                    .set_failure_reason(id, "process terminated by signal");
                let _ = self.registry.update_state(id, TaskState::Killed, now_ms);
                TaskState::Killed
            }
        }
    }

    /// Cancellation protocol: soft signal, bounded grace period, then hard
    /// kill. Resulting state is `TERMINATED` if the grace period sufficed,
    /// `KILLED` otherwise.
    async fn cancel_and_wait(
        &self,
        id: &TaskId,
        exit_rx: &mut tokio::sync::oneshot::Receiver<AgentExit>,
    ) -> TaskState {
        let pid = self.running.lock().get(id).and_then(|r| r.pid);
        if let Some(pid) = pid {
            let _ = self.adapter.cancel(pid).await;
        }

        let now_ms = self.clock.epoch_ms();
        let honored = tokio::time::timeout(self.config.grace_period, &mut *exit_rx)
            .await
            .is_ok();

        if honored {
            let _ = self.registry.update_state(id, TaskState::Terminated, now_ms);
            TaskState::Terminated
        } else {
            if let Some(pid) = pid {
                let _ = self.adapter.kill(pid).await;
            }
            let _ = tokio::time::timeout(self.config.grace_period, &mut *exit_rx).await;
            let now_ms = self.clock.epoch_ms();
            let _ = self.registry.update_state(id, TaskState::Killed, now_ms);
            TaskState::Killed
        }
    }

    async fn finish_without_exit(&self, id: &TaskId, state: TaskState, reason: String) {
        let now_ms = self.clock.epoch_ms();
        let _ = self.registry.set_failure_reason(id, reason);
        let _ = self.registry.update_state(id, state, now_ms);
        let _ = self
            .scheduler_signal_tx
            .send(SchedulerSignal::TaskTerminal(id.clone()))
            .await;
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
