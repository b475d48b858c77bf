// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System Status Reporter (C8): aggregates host resource metrics, task
//! counts by state, and registry summaries on demand.
//!
//! All values are point-in-time snapshots; no historical series are kept.

use crate::registry::{ProjectRegistry, TaskRegistry};
use eto_core::TaskState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Task counts by lifecycle state, named explicitly so JSON field order is
/// stable rather than depending on `HashMap` iteration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateCounts {
    pub queued: usize,
    pub started: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub terminated: usize,
    pub killed: usize,
    pub error: usize,
}

impl TaskStateCounts {
    pub fn total(&self) -> usize {
        self.queued
            + self.started
            + self.running
            + self.completed
            + self.failed
            + self.terminated
            + self.killed
            + self.error
    }
}

/// Point-in-time snapshot returned by `get_system_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_available_bytes: u64,
    pub tasks: TaskStateCounts,
    pub project_count: usize,
    pub active_project: Option<std::path::PathBuf>,
    pub running_count: usize,
    pub capacity: usize,
    pub saturation: f32,
}

const ALL_STATES: [TaskState; 8] = [
    TaskState::Queued,
    TaskState::Started,
    TaskState::Running,
    TaskState::Completed,
    TaskState::Failed,
    TaskState::Terminated,
    TaskState::Killed,
    TaskState::Error,
];

/// Aggregates host CPU/memory (via `sysinfo`) and registry summaries into a
/// single [`SystemStatus`] snapshot. The `sysinfo::System` handle is kept
/// across calls (cheap to hold, expensive to reconstruct) but its counters
/// are always freshly refreshed before use, never cached across calls.
pub struct StatusReporter {
    system: Mutex<System>,
    capacity: usize,
}

impl StatusReporter {
    pub fn new(capacity: usize) -> Self {
        Self {
            system: Mutex::new(System::new()),
            capacity,
        }
    }

    pub fn snapshot(
        &self,
        tasks: &TaskRegistry,
        projects: &ProjectRegistry,
    ) -> SystemStatus {
        let (cpu_percent, memory_used_bytes, memory_available_bytes) = {
            let mut system = self.system.lock();
            system.refresh_cpu_usage();
            system.refresh_memory();
            let cpu_percent = if system.cpus().is_empty() {
                0.0
            } else {
                system.cpus().iter().map(|c| c.cpu_usage()).sum::<f32>()
                    / system.cpus().len() as f32
            };
            (cpu_percent, system.used_memory(), system.available_memory())
        };

        let raw_counts = tasks.count_by_states(&ALL_STATES);
        let counts = TaskStateCounts {
            queued: raw_counts.get(&TaskState::Queued).copied().unwrap_or(0),
            started: raw_counts.get(&TaskState::Started).copied().unwrap_or(0),
            running: raw_counts.get(&TaskState::Running).copied().unwrap_or(0),
            completed: raw_counts.get(&TaskState::Completed).copied().unwrap_or(0),
            failed: raw_counts.get(&TaskState::Failed).copied().unwrap_or(0),
            terminated: raw_counts.get(&TaskState::Terminated).copied().unwrap_or(0),
            killed: raw_counts.get(&TaskState::Killed).copied().unwrap_or(0),
            error: raw_counts.get(&TaskState::Error).copied().unwrap_or(0),
        };

        let running_count = counts.started + counts.running;
        let saturation = if self.capacity == 0 {
            0.0
        } else {
            running_count as f32 / self.capacity as f32
        };

        SystemStatus {
            cpu_percent,
            memory_used_bytes,
            memory_available_bytes,
            tasks: counts,
            project_count: projects.len(),
            active_project: projects.get_active(),
            running_count,
            capacity: self.capacity,
            saturation,
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
