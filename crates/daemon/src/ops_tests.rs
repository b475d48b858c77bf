// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::app::AppState;
use crate::config::Config;
use eto_adapters::FakeAgentAdapter;
use eto_core::{FakeClock, SequentialIdGen};
use eto_engine::status::StatusReporter;
use eto_engine::supervisor::SupervisorConfig;
use eto_engine::{ProjectRegistry, Supervisor, TaskRegistry};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

type TestState = AppState<FakeAgentAdapter, FakeClock, SequentialIdGen>;

fn test_state() -> (Arc<TestState>, mpsc::Receiver<eto_engine::SchedulerSignal>) {
    let tasks = TaskRegistry::new();
    let projects = ProjectRegistry::new();
    let adapter = Arc::new(FakeAgentAdapter::new());
    let clock = FakeClock::new();
    let (signal_tx, signal_rx) = mpsc::channel(16);
    let supervisor = Arc::new(Supervisor::new(
        tasks.clone(),
        adapter,
        clock.clone(),
        SupervisorConfig::default(),
        signal_tx.clone(),
    ));
    let status = Arc::new(StatusReporter::new(4));
    let config = Config {
        mock: true,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(
        projects,
        tasks,
        supervisor,
        status,
        clock,
        SequentialIdGen::new("task"),
        config,
        signal_tx,
    ));
    (state, signal_rx)
}

#[tokio::test]
async fn check_agent_availability_reports_mock_mode() {
    let (state, _rx) = test_state();
    let result = check_agent_availability(state, json!({})).await.unwrap();
    assert_eq!(result["available"], json!(true));
    assert_eq!(result["mock"], json!(true));
}

#[tokio::test]
async fn analyze_project_rejects_missing_path() {
    let (state, _rx) = test_state();
    let result = analyze_project(state, json!({"path": "/no/such/directory-xyz"})).await;
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn analyze_project_then_set_active_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"\n")
        .await
        .unwrap();

    let (state, _rx) = test_state();
    let analyzed = analyze_project(Arc::clone(&state), json!({"path": dir.path()}))
        .await
        .unwrap();
    assert_eq!(analyzed["kind"], json!("rust"));

    let activated = set_active_project(Arc::clone(&state), json!({"path": dir.path()})).await;
    assert!(activated.is_ok());

    let status = get_system_status(state, json!({})).await.unwrap();
    assert_eq!(status["project_count"], json!(1));
}

#[tokio::test]
async fn set_active_project_unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state();
    let result = set_active_project(state, json!({"path": dir.path()})).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn delegate_task_rejects_empty_description() {
    let (state, _rx) = test_state();
    let result = delegate_coding_task(state, json!({"description": "   "})).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::BadRequest);
}

#[tokio::test]
async fn delegate_task_then_monitor_and_list() {
    let (state, _rx) = test_state();
    let created = delegate_coding_task(Arc::clone(&state), json!({"description": "fix the bug"}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let progress = monitor_task_progress(Arc::clone(&state), json!({"id": id})).await.unwrap();
    assert_eq!(progress["state"], json!("QUEUED"));

    let listed = list_active_tasks(state, json!({})).await.unwrap();
    let tasks = listed.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], json!(id));
}

#[tokio::test]
async fn monitor_unknown_task_is_not_found() {
    let (state, _rx) = test_state();
    let result = monitor_task_progress(state, json!({"id": "does-not-exist"})).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn get_task_results_omits_output_when_not_requested() {
    let (state, _rx) = test_state();
    let created = delegate_coding_task(Arc::clone(&state), json!({"description": "task"}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let result = get_task_results(state, json!({"id": id, "include_output": false}))
        .await
        .unwrap();
    assert!(result.get("stdout").is_none());
    assert!(result.get("stderr").is_none());
}

#[tokio::test]
async fn get_task_results_includes_output_by_default() {
    let (state, _rx) = test_state();
    let created = delegate_coding_task(Arc::clone(&state), json!({"description": "task"}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let result = get_task_results(state, json!({"id": id})).await.unwrap();
    assert!(result.get("stdout").is_some());
}

#[tokio::test]
async fn cancel_task_on_queued_task_terminates_it() {
    let (state, _rx) = test_state();
    let created = delegate_coding_task(Arc::clone(&state), json!({"description": "task"}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    cancel_task(Arc::clone(&state), json!({"id": id.clone()})).await.unwrap();
    let fetched = monitor_task_progress(state, json!({"id": id})).await.unwrap();
    assert_eq!(fetched["state"], json!("TERMINATED"));
}

#[tokio::test]
async fn cancel_unknown_task_is_not_found() {
    let (state, _rx) = test_state();
    let result = cancel_task(state, json!({"id": "ghost"})).await;
    assert_eq!(result.unwrap_err().code, ErrorCode::NotFound);
}

#[tokio::test]
async fn build_dispatcher_registers_all_nine_operations() {
    let (state, _rx) = test_state();
    let dispatcher = build_dispatcher(state);
    for op in [
        "check_agent_availability",
        "analyze_project",
        "set_active_project",
        "get_system_status",
        "delegate_coding_task",
        "monitor_task_progress",
        "get_task_results",
        "list_active_tasks",
        "cancel_task",
    ] {
        assert!(dispatcher.is_registered(op), "missing operation: {op}");
    }
}
