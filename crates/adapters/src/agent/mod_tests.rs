// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_error_display_includes_detail() {
    let err = AgentError::SpawnFailed("enoent".to_string());
    assert_eq!(err.to_string(), "spawn failed: enoent");

    let err = AgentError::SignalFailed("esrch".to_string());
    assert_eq!(err.to_string(), "signal failed: esrch");

    let err = AgentError::NotFound("/bin/agent".to_string());
    assert_eq!(err.to_string(), "agent not found: /bin/agent");
}

#[test]
fn output_stream_equality() {
    assert_eq!(OutputStream::Stdout, OutputStream::Stdout);
    assert_ne!(OutputStream::Stdout, OutputStream::Stderr);
}

#[test]
fn agent_exit_equality() {
    assert_eq!(AgentExit::Exited(0), AgentExit::Exited(0));
    assert_ne!(AgentExit::Exited(0), AgentExit::Exited(1));
    assert_ne!(AgentExit::Exited(0), AgentExit::Signaled);
}
