// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier and state machine.

use crate::priority::Priority;
use crate::ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for a delegated coding task.
    #[derive(Default)]
    pub struct TaskId;
}

/// Where a task should run: an explicit absolute path, or the sentinel
/// meaning "whatever project is currently active".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectTarget {
    Active,
    Path(PathBuf),
}

impl ProjectTarget {
    pub fn from_opt(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => ProjectTarget::Path(p),
            None => ProjectTarget::Active,
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Queued,
    Started,
    Running,
    Completed,
    Failed,
    Terminated,
    Killed,
    Error,
}

impl TaskState {
    /// Terminal states from which no further (non-retry) transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed
                | TaskState::Failed
                | TaskState::Terminated
                | TaskState::Killed
                | TaskState::Error
        )
    }

    pub fn is_success(self) -> bool {
        matches!(self, TaskState::Completed)
    }

    /// Whether a task in this state owns a live child process handle
    /// (non-null iff state is `STARTED` or `RUNNING`).
    pub fn has_child_handle(self) -> bool {
        matches!(self, TaskState::Started | TaskState::Running)
    }

    /// Validates a proposed transition against the normal lifecycle graph.
    ///
    /// This intentionally excludes the retry re-enqueue path (`Failed`/`Error`
    /// -> `Queued`), which is a distinct, explicitly-configured operation
    /// (see [`Task::retry_requeue`]) rather than a normal lifecycle edge.
    pub fn can_transition_to(self, to: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, to),
            (Queued, Started)
                | (Queued, Failed) // dependency failed, never admitted
                | (Queued, Terminated) // cancelled while queued
                | (Started, Running)
                | (Started, Error) // spawn failure
                | (Started, Terminated)
                | (Started, Killed)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Terminated)
                | (Running, Killed)
                | (Running, Error)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Queued => "QUEUED",
            TaskState::Started => "STARTED",
            TaskState::Running => "RUNNING",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
            TaskState::Terminated => "TERMINATED",
            TaskState::Killed => "KILLED",
            TaskState::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// Errors returned by [`Task::transition`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("task is already in terminal state {0}")]
    AlreadyTerminal(TaskState),
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition { from: TaskState, to: TaskState },
}

/// A delegated coding task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub project_path: ProjectTarget,
    pub priority: Priority,
    pub tags: HashSet<String>,
    pub dependencies: HashSet<TaskId>,
    pub state: TaskState,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub ended_at_ms: Option<u64>,
    pub exit_code: Option<i32>,
    #[serde(skip)]
    pub stdout_buffer: RingBuffer,
    #[serde(skip)]
    pub stderr_buffer: RingBuffer,
    pub retry_count: u32,
    pub retry_limit: u32,
    pub timeout_s: Option<u64>,
    /// Human-readable reason attached when a task lands in `FAILED`/`ERROR`
    /// without a process exit code (dependency failure, spawn failure, ...).
    pub failure_reason: Option<String>,
    /// Latest resource sample, if the host exposes process counters.
    pub resource: Option<ResourceSample>,
}

/// Point-in-time CPU/memory reading for a running task's child process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub sampled_at_ms: u64,
}

impl Task {
    pub fn new(
        id: TaskId,
        description: String,
        project_path: ProjectTarget,
        priority: Priority,
        tags: HashSet<String>,
        dependencies: HashSet<TaskId>,
        retry_limit: u32,
        timeout_s: Option<u64>,
        created_at_ms: u64,
        buffer_bytes: usize,
    ) -> Self {
        Self {
            id,
            description,
            project_path,
            priority,
            tags,
            dependencies,
            state: TaskState::Queued,
            created_at_ms,
            started_at_ms: None,
            ended_at_ms: None,
            exit_code: None,
            stdout_buffer: RingBuffer::new(buffer_bytes),
            stderr_buffer: RingBuffer::new(buffer_bytes),
            retry_count: 0,
            retry_limit,
            timeout_s,
            failure_reason: None,
            resource: None,
        }
    }

    /// Apply a validated state transition, stamping timestamps as appropriate.
    ///
    /// Terminal states are immutable: calling this again on a task that is
    /// already terminal always fails, even if `to` would otherwise be a
    /// plausible edge (there are none from a terminal state in the normal
    /// graph, but this guards against future additions).
    pub fn transition(&mut self, to: TaskState, now_ms: u64) -> Result<(), TransitionError> {
        if self.state.is_terminal() {
            return Err(TransitionError::AlreadyTerminal(self.state));
        }
        if !self.state.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        match to {
            TaskState::Started => self.started_at_ms = Some(now_ms),
            TaskState::Completed | TaskState::Failed | TaskState::Terminated | TaskState::Killed
            | TaskState::Error => {
                self.ended_at_ms = Some(now_ms);
            }
            TaskState::Running | TaskState::Queued => {}
        }
        self.state = to;
        Ok(())
    }

    pub fn is_eligible_for_retry(&self) -> bool {
        self.state.is_terminal()
            && !self.state.is_success()
            && self.state != TaskState::Terminated
            && self.state != TaskState::Killed
            && self.retry_count < self.retry_limit
    }

    /// Re-enqueue a terminally-failed task for another attempt.
    ///
    /// Only valid from `Failed`/`Error`, and only when `retry_count <
    /// retry_limit`. Buffers are preserved (not cleared) so prior-attempt
    /// output remains visible; `created_at_ms` is refreshed so the retried
    /// attempt sorts at the tail of the `created_at` admission order.
    pub fn retry_requeue(&mut self, now_ms: u64) -> Result<(), TransitionError> {
        if !matches!(self.state, TaskState::Failed | TaskState::Error) {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                to: TaskState::Queued,
            });
        }
        if self.retry_count >= self.retry_limit {
            return Err(TransitionError::AlreadyTerminal(self.state));
        }
        self.retry_count += 1;
        self.created_at_ms = now_ms;
        self.started_at_ms = None;
        self.ended_at_ms = None;
        self.exit_code = None;
        self.failure_reason = None;
        self.state = TaskState::Queued;
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
