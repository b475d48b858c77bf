// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! eto-adapters: process-execution adapters for the coding-agent child
//! process.

pub mod agent;
pub mod traced;

pub use agent::{
    AgentAdapter, AgentError, AgentExit, AgentHandle, AgentSpawnConfig, OutputChunk,
    OutputStream, SubprocessAgentAdapter,
};
pub use traced::TracedAgent;

pub use agent::{AgentCall, FakeAgentAdapter};
