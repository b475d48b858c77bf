// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort per-process resource sampling for the Process Supervisor.
//!
//! Reads `/proc/<pid>/stat` directly on Linux (no syscall overhead per
//! sample); falls back to the `sysinfo` crate's process table when `/proc`
//! is unavailable or parsing fails. Absence of a reading is never an error.

use eto_core::ResourceSample;
use parking_lot::Mutex;
use sysinfo::{Pid, System};

/// Samples CPU/memory usage for a single OS process. Callers are
/// responsible for not polling faster than the configured interval (the
/// Process Supervisor does this via its own sampling timer).
pub struct ResourceSampler {
    system: Mutex<System>,
}

impl ResourceSampler {
    pub fn new(_min_interval: std::time::Duration) -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Returns a fresh reading, or `None` if the process can't be found or
    /// the host exposes no usable counters. `sysinfo` is tried first since
    /// it reports both CPU and memory; the `/proc` reader is a memory-only
    /// fallback for hosts where the process table lookup itself fails.
    pub fn sample(&self, pid: u32, now_ms: u64) -> Option<ResourceSample> {
        if let Some(sample) = self.sample_via_sysinfo(pid, now_ms) {
            return Some(sample);
        }
        read_proc_stat(pid, now_ms)
    }

    fn sample_via_sysinfo(&self, pid: u32, now_ms: u64) -> Option<ResourceSample> {
        let mut system = self.system.lock();
        let sys_pid = Pid::from_u32(pid);
        system.refresh_process(sys_pid);
        let process = system.process(sys_pid)?;
        Some(ResourceSample {
            cpu_percent: process.cpu_usage(),
            memory_bytes: process.memory(),
            sampled_at_ms: now_ms,
        })
    }
}

/// Linux fast path: parse `/proc/<pid>/stat` for RSS; CPU percentage is not
/// derivable from a single snapshot without a prior sample, so this path
/// reports memory only and defers CPU to the `sysinfo` fallback.
#[cfg(target_os = "linux")]
fn read_proc_stat(pid: u32, now_ms: u64) -> Option<ResourceSample> {
    let status = std::fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    let rss_kb = status
        .lines()
        .find(|l| l.starts_with("VmRSS:"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|n| n.parse::<u64>().ok())?;
    Some(ResourceSample {
        cpu_percent: 0.0,
        memory_bytes: rss_kb * 1024,
        sampled_at_ms: now_ms,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_proc_stat(_pid: u32, _now_ms: u64) -> Option<ResourceSample> {
    None
}

#[cfg(test)]
#[path = "resource_sampler_tests.rs"]
mod tests;
