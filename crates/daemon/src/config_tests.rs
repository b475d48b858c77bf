// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::collections::HashMap;

fn lookup_from(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
    move |key| map.get(key).map(|v| v.to_string())
}

#[test]
fn defaults_when_nothing_set() {
    let config = Config::from_lookup(lookup_from(HashMap::new()));
    assert_eq!(config.agent_program, "coding-agent");
    assert!(!config.mock);
    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.buffer_bytes, 1 << 20);
    assert_eq!(config.grace_period, Duration::from_millis(5000));
}

#[test]
fn mock_truthiness_is_case_insensitive_over_pinned_set() {
    for value in ["1", "true", "TRUE", "Yes", "oN"] {
        let mut map = HashMap::new();
        map.insert("AGENT_MOCK", value);
        let config = Config::from_lookup(lookup_from(map));
        assert!(config.mock, "{value} should be truthy");
    }

    for value in ["0", "false", "no", "off", "banana"] {
        let mut map = HashMap::new();
        map.insert("AGENT_MOCK", value);
        let config = Config::from_lookup(lookup_from(map));
        assert!(!config.mock, "{value} should not be truthy");
    }
}

#[test]
fn overrides_are_parsed() {
    let mut map = HashMap::new();
    map.insert("AGENT_CLI_PATH", "/usr/local/bin/agent");
    map.insert("MAX_CONCURRENCY", "8");
    map.insert("BUFFER_BYTES", "2048");
    map.insert("GRACE_PERIOD_MS", "1500");
    let config = Config::from_lookup(lookup_from(map));

    assert_eq!(config.agent_program, "/usr/local/bin/agent");
    assert_eq!(config.max_concurrency, 8);
    assert_eq!(config.buffer_bytes, 2048);
    assert_eq!(config.grace_period, Duration::from_millis(1500));
}

#[test]
fn invalid_numeric_overrides_fall_back_to_defaults() {
    let mut map = HashMap::new();
    map.insert("MAX_CONCURRENCY", "not-a-number");
    map.insert("BUFFER_BYTES", "0");
    let config = Config::from_lookup(lookup_from(map));

    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.buffer_bytes, 1 << 20);
}

/// Exercises the real `std::env` path directly; serialized against other
/// tests that touch `AGENT_MOCK` since process environment is global state.
#[test]
#[serial(env)]
fn from_env_reads_real_process_environment() {
    std::env::set_var("AGENT_MOCK", "YES");
    let config = Config::from_env();
    std::env::remove_var("AGENT_MOCK");
    assert!(config.mock);
}
