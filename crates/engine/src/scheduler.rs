// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (C6): priority- and dependency-ordered admission of queued
//! tasks into a bounded concurrent execution pool.

use crate::registry::TaskRegistry;
use eto_core::{Clock, TaskId, TaskState};
use std::time::Duration;
use tokio::sync::mpsc;

/// Wake reasons for the scheduler loop.
#[derive(Debug, Clone)]
pub enum SchedulerSignal {
    Submitted,
    TaskTerminal(TaskId),
    Tick,
}

/// Result of one admission sweep: tasks to admit (already capacity-bounded
/// and ordered) and tasks whose dependency failed and must transition
/// straight to `FAILED` without ever being admitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub ready: Vec<TaskId>,
    pub dependency_failed: Vec<TaskId>,
}

/// Pure admission sweep over the current registry contents.
///
/// 1. Consider only `QUEUED` tasks.
/// 2. A task with any dependency in a terminal-non-success state is
///    immediately a dependency failure, not admitted.
/// 3. A task with any dependency not yet terminal is left waiting.
/// 4. Remaining eligible tasks are ordered `(priority DESC, created_at ASC,
///    id ASC)` and the first `capacity_free` are admitted.
pub fn sweep(registry: &TaskRegistry, capacity_free: usize) -> SweepResult {
    use crate::registry::TaskFilter;
    use std::collections::HashSet;

    let mut queued_filter = TaskFilter::default();
    let mut states = HashSet::new();
    states.insert(TaskState::Queued);
    queued_filter.states = Some(states);

    let mut eligible = Vec::new();
    let mut dependency_failed = Vec::new();

    for summary in registry.list(&queued_filter) {
        let Some(task) = registry.get(&summary.id) else {
            continue;
        };
        let mut any_waiting = false;
        let mut failed = false;
        for dep in &task.dependencies {
            match registry.get(dep) {
                Some(dep_task) if dep_task.state == TaskState::Completed => {}
                Some(dep_task) if dep_task.state.is_terminal() => {
                    failed = true;
                    break;
                }
                Some(_) => any_waiting = true,
                None => {
                    // Dependencies are validated to exist at submission time;
                    // a missing dependency here would indicate a bug, not a
                    // legitimate runtime state. Treat conservatively as
                    // waiting rather than panicking.
                    any_waiting = true;
                }
            }
        }
        if failed {
            dependency_failed.push(task.id);
        } else if !any_waiting {
            eligible.push(task);
        }
    }

    eligible.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at_ms.cmp(&b.created_at_ms))
            .then(a.id.as_str().cmp(b.id.as_str()))
    });

    SweepResult {
        ready: eligible.into_iter().take(capacity_free).map(|t| t.id).collect(),
        dependency_failed,
    }
}

/// Long-lived scheduling loop: wakes on submission, task-terminal events,
/// or a periodic safety-net timer, and admits tasks via `admitted_tx`.
pub struct Scheduler<C: Clock> {
    registry: TaskRegistry,
    clock: C,
    capacity: usize,
    tick_interval: Duration,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(registry: TaskRegistry, clock: C, capacity: usize, tick_interval: Duration) -> Self {
        Self {
            registry,
            clock,
            capacity,
            tick_interval,
        }
    }

    /// Run the scheduling loop until `signals` closes. `running_count` is
    /// queried fresh on each wake so capacity tracks tasks that have left
    /// `{STARTED, RUNNING}` since the last sweep.
    pub async fn run(
        mut self,
        mut signals: mpsc::Receiver<SchedulerSignal>,
        admitted_tx: mpsc::UnboundedSender<TaskId>,
    ) {
        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            tokio::select! {
                signal = signals.recv() => {
                    if signal.is_none() {
                        break;
                    }
                }
                _ = interval.tick() => {}
            }
            self.sweep_and_dispatch(&admitted_tx);
        }
    }

    fn sweep_and_dispatch(&mut self, admitted_tx: &mpsc::UnboundedSender<TaskId>) {
        let running = self
            .registry
            .count_by_states(&[TaskState::Started, TaskState::Running]);
        let running_count: usize = running.values().sum();
        let capacity_free = self.capacity.saturating_sub(running_count);

        let result = sweep(&self.registry, capacity_free);
        let now_ms = self.clock.epoch_ms();

        for id in result.dependency_failed {
            let _ = self.registry.set_failure_reason(&id, "dependency failed");
            let _ = self.registry.update_state(&id, TaskState::Failed, now_ms);
        }

        for id in result.ready {
            if self
                .registry
                .update_state(&id, TaskState::Started, now_ms)
                .is_ok()
            {
                let _ = admitted_tx.send(id);
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
