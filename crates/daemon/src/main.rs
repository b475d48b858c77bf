// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! etod: the Enhanced Task Orchestrator daemon.
//!
//! Reads newline-delimited JSON requests on stdin, dispatches each to the
//! registered operation, and writes newline-delimited JSON responses on
//! stdout. Stdin EOF triggers graceful shutdown: stop admitting new tasks,
//! cancel whatever is still running, give it a bounded grace period, then
//! exit.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::HashSet;
use std::sync::Arc;

use eto_adapters::{AgentAdapter, FakeAgentAdapter, SubprocessAgentAdapter, TracedAgent};
use eto_core::{Clock, IdGen, SystemClock, TaskState, UuidIdGen};
use eto_daemon::app::AppState;
use eto_daemon::config::Config;
use eto_daemon::ops::build_dispatcher;
use eto_daemon::logging;
use eto_daemon::transport::run_transport;
use eto_daemon::wire::ResponseSink;
use eto_engine::registry::TaskFilter;
use eto_engine::status::StatusReporter;
use eto_engine::supervisor::SupervisorConfig;
use eto_engine::{ProjectRegistry, Scheduler, Supervisor, TaskRegistry};
use tokio::sync::mpsc;

const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

#[tokio::main]
async fn main() {
    logging::init();
    let config = Config::from_env();

    tracing::info!(
        mock = config.mock,
        max_concurrency = config.max_concurrency,
        agent_program = %config.agent_program,
        "starting etod"
    );

    if config.mock {
        run(FakeAgentAdapter::new(), SystemClock, UuidIdGen, config).await;
    } else {
        let adapter = TracedAgent::new(SubprocessAgentAdapter::new());
        run(adapter, SystemClock, UuidIdGen, config).await;
    }
}

async fn run<A, C, G>(adapter: A, clock: C, id_gen: G, config: Config)
where
    A: AgentAdapter,
    C: Clock,
    G: IdGen,
{
    let tasks = TaskRegistry::new();
    let projects = ProjectRegistry::new();
    let status = Arc::new(StatusReporter::new(config.max_concurrency));

    let (scheduler_signal_tx, scheduler_signal_rx) = mpsc::channel(256);
    let (admitted_tx, admitted_rx) = mpsc::unbounded_channel();

    let supervisor_config = SupervisorConfig {
        agent_program: config.agent_program.clone(),
        grace_period: config.grace_period,
        ..SupervisorConfig::default()
    };
    let supervisor = Arc::new(Supervisor::new(
        tasks.clone(),
        Arc::new(adapter),
        clock.clone(),
        supervisor_config,
        scheduler_signal_tx.clone(),
    ));

    let scheduler = Scheduler::new(tasks.clone(), clock.clone(), config.max_concurrency, TICK_INTERVAL);
    tokio::spawn(scheduler.run(scheduler_signal_rx, admitted_tx));
    tokio::spawn((*supervisor).clone().run(admitted_rx));

    let state = Arc::new(AppState::new(
        projects,
        tasks.clone(),
        Arc::clone(&supervisor),
        status,
        clock,
        id_gen,
        config.clone(),
        scheduler_signal_tx,
    ));
    let dispatcher = Arc::new(build_dispatcher(state));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let sink = Arc::new(ResponseSink::new(stdout));

    run_transport(stdin, sink, dispatcher).await;

    tracing::info!("stdin closed, shutting down");
    shutdown(&tasks, &supervisor, config.grace_period).await;
    tracing::info!("etod stopped");
}

/// Cancel every non-terminal task and wait up to `grace_period` for the
/// supervisor to drive them to a terminal state before returning.
async fn shutdown<A, C>(tasks: &TaskRegistry, supervisor: &Supervisor<A, C>, grace_period: std::time::Duration)
where
    A: AgentAdapter,
    C: Clock,
{
    let mut active = HashSet::new();
    active.insert(TaskState::Queued);
    active.insert(TaskState::Started);
    active.insert(TaskState::Running);
    let filter = TaskFilter {
        states: Some(active),
        tags: None,
    };

    let in_flight = tasks.list(&filter);
    for summary in &in_flight {
        if let Err(e) = supervisor.cancel(&summary.id).await {
            tracing::warn!(task_id = %summary.id, error = %e, "cancel during shutdown failed");
        }
    }

    if in_flight.is_empty() {
        return;
    }

    let deadline = tokio::time::Instant::now() + grace_period;
    loop {
        let still_active = tasks.list(&filter).len();
        if still_active == 0 || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}
