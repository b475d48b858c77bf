// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn samples_the_current_process() {
    let sampler = ResourceSampler::new(Duration::from_millis(100));
    let pid = std::process::id();

    // sysinfo needs the process table refreshed more than once to report a
    // non-zero cpu reading, but memory should be available on the first call.
    let sample = sampler.sample(pid, 1_000);
    assert!(sample.is_some(), "expected a reading for the current process");
    assert!(sample.unwrap().memory_bytes > 0);
}

#[test]
fn nonexistent_pid_yields_none() {
    let sampler = ResourceSampler::new(Duration::from_millis(100));
    // A pid this large is never a real process on any supported host.
    let sample = sampler.sample(u32::MAX - 1, 1_000);
    assert!(sample.is_none());
}

#[test]
fn sampled_at_ms_reflects_the_given_timestamp() {
    let sampler = ResourceSampler::new(Duration::from_millis(100));
    let pid = std::process::id();
    if let Some(sample) = sampler.sample(pid, 42_000) {
        assert_eq!(sample.sampled_at_ms, 42_000);
    }
}

#[cfg(target_os = "linux")]
#[test]
fn proc_fallback_parses_vmrss_for_the_current_process() {
    let sample = read_proc_stat(std::process::id(), 7);
    assert!(sample.is_some(), "expected /proc/self/status to be readable");
    let sample = sample.unwrap();
    assert!(sample.memory_bytes > 0);
    assert_eq!(sample.cpu_percent, 0.0);
    assert_eq!(sample.sampled_at_ms, 7);
}

#[cfg(target_os = "linux")]
#[test]
fn proc_fallback_on_nonexistent_pid_is_none() {
    assert!(read_proc_stat(u32::MAX - 1, 0).is_none());
}
