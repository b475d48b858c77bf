// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon context: the registries, scheduler signal channel, and
//! supervisor handle every operation handler needs.

use crate::config::Config;
use eto_adapters::AgentAdapter;
use eto_core::{Clock, IdGen};
use eto_engine::status::StatusReporter;
use eto_engine::{ProjectRegistry, Supervisor, TaskRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared context threaded through every registered operation.
///
/// Generic over the agent adapter, clock, and id generator so production
/// (`SubprocessAgentAdapter`/`SystemClock`/`UuidIdGen`) and tests
/// (`FakeAgentAdapter`/`FakeClock`/`SequentialIdGen`) can share the exact
/// same handler code.
pub struct AppState<A, C, G> {
    pub projects: ProjectRegistry,
    pub tasks: TaskRegistry,
    pub supervisor: Arc<Supervisor<A, C>>,
    pub status: Arc<StatusReporter>,
    pub clock: C,
    pub id_gen: G,
    pub config: Config,
    pub scheduler_signal_tx: mpsc::Sender<eto_engine::SchedulerSignal>,
}

impl<A, C, G> AppState<A, C, G>
where
    A: AgentAdapter,
    C: Clock,
    G: IdGen,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: ProjectRegistry,
        tasks: TaskRegistry,
        supervisor: Arc<Supervisor<A, C>>,
        status: Arc<StatusReporter>,
        clock: C,
        id_gen: G,
        config: Config,
        scheduler_signal_tx: mpsc::Sender<eto_engine::SchedulerSignal>,
    ) -> Self {
        Self {
            projects,
            tasks,
            supervisor,
            status,
            clock,
            id_gen,
            config,
            scheduler_signal_tx,
        }
    }
}
