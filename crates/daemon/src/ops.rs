// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The nine registered operations (§6): each validates its own arguments
//! via `serde_json::from_value` into a typed struct (a deserialization
//! failure becomes `BadRequest`) and delegates to the engine.

use crate::app::AppState;
use crate::dispatch::{DispatchError, Dispatcher};
use eto_adapters::AgentAdapter;
use eto_core::ring_buffer::RingBufferSnapshot;
use eto_core::{Clock, ErrorCode, IdGen, Priority, ProjectTarget, Task, TaskId, TaskState};
use eto_engine::{NewTask, TaskFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

fn bad_request(e: impl std::fmt::Display) -> DispatchError {
    DispatchError::bad_request(e.to_string())
}

fn to_value(v: impl Serialize) -> Result<Value, DispatchError> {
    serde_json::to_value(v).map_err(|e| DispatchError::new(ErrorCode::Internal, e.to_string()))
}

/// Register all nine operations against `state`.
pub fn build_dispatcher<A, C, G>(state: Arc<AppState<A, C, G>>) -> Dispatcher
where
    A: AgentAdapter,
    C: Clock,
    G: IdGen,
{
    let mut dispatcher = Dispatcher::new();

    {
        let state = Arc::clone(&state);
        dispatcher.register("check_agent_availability", move |args| {
            let state = Arc::clone(&state);
            async move { check_agent_availability(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("analyze_project", move |args| {
            let state = Arc::clone(&state);
            async move { analyze_project(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("set_active_project", move |args| {
            let state = Arc::clone(&state);
            async move { set_active_project(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("get_system_status", move |args| {
            let state = Arc::clone(&state);
            async move { get_system_status(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("delegate_coding_task", move |args| {
            let state = Arc::clone(&state);
            async move { delegate_coding_task(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("monitor_task_progress", move |args| {
            let state = Arc::clone(&state);
            async move { monitor_task_progress(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("get_task_results", move |args| {
            let state = Arc::clone(&state);
            async move { get_task_results(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("list_active_tasks", move |args| {
            let state = Arc::clone(&state);
            async move { list_active_tasks(state, args).await }
        });
    }
    {
        let state = Arc::clone(&state);
        dispatcher.register("cancel_task", move |args| {
            let state = Arc::clone(&state);
            async move { cancel_task(state, args).await }
        });
    }

    dispatcher
}

async fn check_agent_availability<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    _args: Value,
) -> Result<Value, DispatchError> {
    if state.config.mock {
        return Ok(serde_json::json!({"available": true, "mock": true}));
    }

    let probe = tokio::time::timeout(
        Duration::from_secs(3),
        Command::new(&state.config.agent_program).arg("--version").output(),
    )
    .await;

    match probe {
        Ok(Ok(output)) if output.status.success() => {
            let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let version = if raw.is_empty() { None } else { Some(raw) };
            Ok(serde_json::json!({"available": true, "version": version, "mock": false}))
        }
        _ => Ok(serde_json::json!({"available": false, "mock": false})),
    }
}

#[derive(Deserialize)]
struct AnalyzeArgs {
    path: String,
}

async fn analyze_project<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError>
where
    C: Clock,
{
    let args: AnalyzeArgs = serde_json::from_value(args).map_err(bad_request)?;
    let project = eto_engine::analyzer::analyze(std::path::Path::new(&args.path), &state.clock)
        .await
        .map_err(DispatchError::from_error)?;
    state.projects.put(project.clone());
    to_value(project)
}

#[derive(Deserialize)]
struct PathArgs {
    path: PathBuf,
}

async fn set_active_project<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError> {
    let args: PathArgs = serde_json::from_value(args).map_err(bad_request)?;
    let canonical = tokio::fs::canonicalize(&args.path).await.map_err(|_| {
        DispatchError::new(
            ErrorCode::NotFound,
            format!("project not analyzed: {}", args.path.display()),
        )
    })?;
    state
        .projects
        .set_active(&canonical)
        .map_err(DispatchError::from_error)?;
    Ok(serde_json::json!({"ok": true}))
}

async fn get_system_status<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    _args: Value,
) -> Result<Value, DispatchError> {
    to_value(state.status.snapshot(&state.tasks, &state.projects))
}

fn default_retry_limit() -> u32 {
    0
}

#[derive(Deserialize)]
struct DelegateArgs {
    description: String,
    #[serde(default)]
    project_path: Option<PathBuf>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    tags: HashSet<String>,
    #[serde(default)]
    dependencies: HashSet<String>,
    #[serde(default)]
    timeout_s: Option<u64>,
    #[serde(default = "default_retry_limit")]
    retry_limit: u32,
}

async fn delegate_coding_task<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError>
where
    C: Clock,
    G: IdGen,
{
    let args: DelegateArgs = serde_json::from_value(args).map_err(bad_request)?;
    let new_task = NewTask {
        description: args.description,
        project_path: ProjectTarget::from_opt(args.project_path),
        priority: args.priority,
        tags: args.tags,
        dependencies: args.dependencies.into_iter().map(TaskId::new).collect(),
        retry_limit: args.retry_limit,
        timeout_s: args.timeout_s,
    };

    let now_ms = state.clock.epoch_ms();
    let id = state
        .tasks
        .create(new_task, &state.id_gen, now_ms, state.config.buffer_bytes)
        .map_err(DispatchError::from_error)?;

    // Best-effort wake: a dropped signal (scheduler shutting down) just
    // means the periodic safety-net tick picks the task up instead.
    let _ = state
        .scheduler_signal_tx
        .send(eto_engine::SchedulerSignal::Submitted)
        .await;

    Ok(serde_json::json!({"id": id.as_str()}))
}

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

fn task_or_not_found<A, C, G>(
    state: &AppState<A, C, G>,
    id: &TaskId,
) -> Result<Task, DispatchError> {
    state
        .tasks
        .get(id)
        .ok_or_else(|| DispatchError::new(ErrorCode::NotFound, format!("task not found: {id}")))
}

async fn monitor_task_progress<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError> {
    let args: IdArgs = serde_json::from_value(args).map_err(bad_request)?;
    let id = TaskId::new(args.id);
    let task = task_or_not_found(&state, &id)?;

    Ok(serde_json::json!({
        "id": task.id.as_str(),
        "state": task.state,
        "created_at_ms": task.created_at_ms,
        "started_at_ms": task.started_at_ms,
        "ended_at_ms": task.ended_at_ms,
        "exit_code": task.exit_code,
        "recent_stdout": task.stdout_buffer.snapshot(),
        "recent_stderr": task.stderr_buffer.snapshot(),
        "resource": task.resource,
    }))
}

/// Full task snapshot returned by `get_task_results`; `stdout`/`stderr` are
/// omitted entirely (not just emptied) when `include_output` is false.
#[derive(Serialize)]
struct TaskResult {
    id: String,
    description: String,
    project_path: ProjectTarget,
    priority: Priority,
    tags: HashSet<String>,
    dependencies: HashSet<String>,
    state: TaskState,
    created_at_ms: u64,
    started_at_ms: Option<u64>,
    ended_at_ms: Option<u64>,
    exit_code: Option<i32>,
    retry_count: u32,
    retry_limit: u32,
    failure_reason: Option<String>,
    resource: Option<eto_core::ResourceSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<RingBufferSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<RingBufferSnapshot>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct ResultsArgs {
    id: String,
    #[serde(default = "default_true")]
    include_output: bool,
}

async fn get_task_results<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError> {
    let args: ResultsArgs = serde_json::from_value(args).map_err(bad_request)?;
    let id = TaskId::new(args.id);
    let task = task_or_not_found(&state, &id)?;

    let (stdout, stderr) = if args.include_output {
        (
            Some(task.stdout_buffer.snapshot()),
            Some(task.stderr_buffer.snapshot()),
        )
    } else {
        (None, None)
    };

    to_value(TaskResult {
        id: task.id.as_str().to_string(),
        description: task.description,
        project_path: task.project_path,
        priority: task.priority,
        tags: task.tags,
        dependencies: task.dependencies.iter().map(|d| d.as_str().to_string()).collect(),
        state: task.state,
        created_at_ms: task.created_at_ms,
        started_at_ms: task.started_at_ms,
        ended_at_ms: task.ended_at_ms,
        exit_code: task.exit_code,
        retry_count: task.retry_count,
        retry_limit: task.retry_limit,
        failure_reason: task.failure_reason,
        resource: task.resource,
        stdout,
        stderr,
    })
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    states: Option<HashSet<TaskState>>,
    #[serde(default)]
    tags: Option<HashSet<String>>,
}

async fn list_active_tasks<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError> {
    let args: ListArgs = serde_json::from_value(args).map_err(bad_request)?;
    let filter = TaskFilter {
        states: args.states,
        tags: args.tags,
    };
    to_value(state.tasks.list(&filter))
}

async fn cancel_task<A, C, G>(
    state: Arc<AppState<A, C, G>>,
    args: Value,
) -> Result<Value, DispatchError>
where
    A: AgentAdapter,
    C: Clock,
{
    let args: IdArgs = serde_json::from_value(args).map_err(bad_request)?;
    let id = TaskId::new(args.id);
    state
        .supervisor
        .cancel(&id)
        .await
        .map_err(DispatchError::from_error)?;
    Ok(serde_json::json!({"ok": true}))
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
