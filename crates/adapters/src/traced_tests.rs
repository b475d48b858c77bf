// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::{AgentExit, FakeAgentAdapter};
use std::time::Duration;

fn config() -> AgentSpawnConfig {
    AgentSpawnConfig {
        program: "mock-agent".to_string(),
        args: vec![],
        cwd: std::env::temp_dir(),
        env: vec![],
    }
}

#[tokio::test]
async fn spawn_delegates_to_inner_adapter() {
    let fake = FakeAgentAdapter::new();
    fake.set_delay(Duration::from_millis(1));
    let traced = TracedAgent::new(fake);

    let mut handle = traced.spawn(config()).await.unwrap();
    let exit = handle.exit_rx.await.unwrap();
    assert_eq!(exit, AgentExit::Exited(0));
}

#[tokio::test]
async fn cancel_and_kill_delegate_to_inner_adapter() {
    let fake = FakeAgentAdapter::new();
    fake.set_delay(Duration::from_secs(30));
    let traced = TracedAgent::new(fake.clone());

    let handle = traced.spawn(config()).await.unwrap();
    let pid = handle.pid.unwrap();
    traced.cancel(pid).await.unwrap();

    let calls = fake.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, crate::agent::AgentCall::Cancel { pid: p } if *p == pid)));
}
