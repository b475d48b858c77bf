// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Registry (C5).

use crate::error::RegistryError;
use eto_core::{IdGen, ProjectTarget, Task, TaskId, TaskState};
use eto_core::{Priority, ResourceSample};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Lightweight projection of a [`Task`] used for listing, sized to avoid
/// copying output buffers on every `list()` call.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    pub state: TaskState,
    pub tags: HashSet<String>,
    pub created_at_ms: u64,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            priority: task.priority,
            state: task.state,
            tags: task.tags.clone(),
            created_at_ms: task.created_at_ms,
        }
    }
}

/// Filter for `list()`: both fields are AND-ed when present; an empty set
/// behaves the same as `None` (matches everything for that axis).
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub states: Option<HashSet<TaskState>>,
    pub tags: Option<HashSet<String>>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(states) = &self.states {
            if !states.is_empty() && !states.contains(&task.state) {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.is_empty() && task.tags.is_disjoint(tags) {
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
}

/// Concurrent map from task id to [`Task`].
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<Inner>>,
}

/// Fields needed to create a new task, mirroring `delegate_coding_task`'s
/// arguments.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub description: String,
    pub project_path: ProjectTarget,
    pub priority: Priority,
    pub tags: HashSet<String>,
    pub dependencies: HashSet<TaskId>,
    pub retry_limit: u32,
    pub timeout_s: Option<u64>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert a new task in `QUEUED` state.
    pub fn create(
        &self,
        fields: NewTask,
        id_gen: &impl IdGen,
        now_ms: u64,
        buffer_bytes: usize,
    ) -> Result<TaskId, RegistryError> {
        if fields.description.trim().is_empty() {
            return Err(RegistryError::EmptyDescription);
        }

        let mut inner = self.inner.write();
        for dep in &fields.dependencies {
            if !inner.tasks.contains_key(dep) {
                return Err(RegistryError::UnknownDependency(dep.to_string()));
            }
        }

        let id = TaskId::new(id_gen.next());
        let task = Task::new(
            id.clone(),
            fields.description,
            fields.project_path,
            fields.priority,
            fields.tags,
            fields.dependencies,
            fields.retry_limit,
            fields.timeout_s,
            now_ms,
            buffer_bytes,
        );
        inner.tasks.insert(id.clone(), task);
        Ok(id)
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner.read().tasks.get(id).cloned()
    }

    pub fn list(&self, filter: &TaskFilter) -> Vec<TaskSummary> {
        let inner = self.inner.read();
        let mut summaries: Vec<TaskSummary> = inner
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .map(TaskSummary::from)
            .collect();
        summaries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at_ms.cmp(&b.created_at_ms))
                .then(a.id.as_str().cmp(b.id.as_str()))
        });
        summaries
    }

    /// Apply a validated state transition under the registry lock.
    pub fn update_state(&self, id: &TaskId, to: TaskState, now_ms: u64) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.transition(to, now_ms)
            .map_err(|e| RegistryError::InvalidTransition(e.to_string()))
    }

    pub fn retry_requeue(&self, id: &TaskId, now_ms: u64) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.retry_requeue(now_ms)
            .map_err(|e| RegistryError::InvalidTransition(e.to_string()))
    }

    pub fn append_stdout(&self, id: &TaskId, bytes: &[u8]) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.stdout_buffer.append(bytes);
        Ok(())
    }

    pub fn append_stderr(&self, id: &TaskId, bytes: &[u8]) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.stderr_buffer.append(bytes);
        Ok(())
    }

    pub fn set_exit(&self, id: &TaskId, code: i32) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.exit_code = Some(code);
        Ok(())
    }

    pub fn set_failure_reason(&self, id: &TaskId, reason: impl Into<String>) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.failure_reason = Some(reason.into());
        Ok(())
    }

    pub fn set_resource(&self, id: &TaskId, sample: ResourceSample) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::TaskNotFound(id.to_string()))?;
        task.resource = Some(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tasks.is_empty()
    }

    /// Count of tasks currently in each given state, in the order given.
    pub fn count_by_states(&self, states: &[TaskState]) -> HashMap<TaskState, usize> {
        let inner = self.inner.read();
        let mut counts: HashMap<TaskState, usize> = states.iter().map(|s| (*s, 0)).collect();
        for task in inner.tasks.values() {
            if let Some(count) = counts.get_mut(&task.state) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
