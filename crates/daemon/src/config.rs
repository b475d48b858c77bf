// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! All tunables are resolved once at startup into a [`Config`] so the rest
//! of the crate never touches `std::env` directly.

use std::time::Duration;

const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_BUFFER_BYTES: usize = 1 << 20;
const DEFAULT_GRACE_PERIOD_MS: u64 = 5000;
const DEFAULT_AGENT_PROGRAM: &str = "coding-agent";

/// Truthy values recognized for `AGENT_MOCK`, case-insensitive, per the
/// Open Question resolution pinning the ambiguous source semantics.
const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Coding-agent CLI program name or path (`AGENT_CLI_PATH`, default
    /// `"coding-agent"` resolved via `$PATH` at spawn time).
    pub agent_program: String,
    /// Force mock mode regardless of agent discovery (`AGENT_MOCK`).
    pub mock: bool,
    /// Bounded concurrent execution capacity (`MAX_CONCURRENCY`).
    pub max_concurrency: usize,
    /// Per-stream ring buffer capacity in bytes (`BUFFER_BYTES`).
    pub buffer_bytes: usize,
    /// Cancellation grace period between soft and hard termination
    /// (`GRACE_PERIOD_MS`).
    pub grace_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent_program: DEFAULT_AGENT_PROGRAM.to_string(),
            mock: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            buffer_bytes: DEFAULT_BUFFER_BYTES,
            grace_period: Duration::from_millis(DEFAULT_GRACE_PERIOD_MS),
        }
    }
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary lookup function, so tests
    /// don't need to mutate real process environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let agent_program = lookup("AGENT_CLI_PATH").unwrap_or(defaults.agent_program);
        let mock = lookup("AGENT_MOCK")
            .map(|v| TRUTHY.contains(&v.to_ascii_lowercase().as_str()))
            .unwrap_or(defaults.mock);
        let max_concurrency = lookup("MAX_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrency);
        let buffer_bytes = lookup("BUFFER_BYTES")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.buffer_bytes);
        let grace_period = lookup("GRACE_PERIOD_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.grace_period);

        Self {
            agent_program,
            mock,
            max_concurrency,
            buffer_bytes,
            grace_period,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
