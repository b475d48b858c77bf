// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine crate.

use eto_core::{ErrorCode, HasErrorCode};
use thiserror::Error;

/// Errors raised by project analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("project path not found: {0}")]
    NotFound(String),
    #[error("project path not readable: {0}")]
    PermissionDenied(String),
    #[error("internal analyzer error: {0}")]
    Internal(String),
}

impl HasErrorCode for AnalyzeError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AnalyzeError::NotFound(_) => ErrorCode::NotFound,
            AnalyzeError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            AnalyzeError::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Errors raised by the project/task registries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("empty task description")]
    EmptyDescription,
    #[error("unknown dependency: {0}")]
    UnknownDependency(String),
    #[error("dependency cycle detected")]
    DependencyCycle,
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
}

impl HasErrorCode for RegistryError {
    fn error_code(&self) -> ErrorCode {
        match self {
            RegistryError::TaskNotFound(_) | RegistryError::ProjectNotFound(_) => {
                ErrorCode::NotFound
            }
            RegistryError::EmptyDescription => ErrorCode::BadRequest,
            // Dependencies are immutable once a task is created, so an
            // unknown dependency id (including a self-reference to the
            // not-yet-issued id) can never become valid later.
            RegistryError::UnknownDependency(_)
            | RegistryError::DependencyCycle
            | RegistryError::InvalidTransition(_) => ErrorCode::PreconditionFailed,
        }
    }
}

/// Errors raised by the process supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("agent unavailable: {0}")]
    AgentUnavailable(String),
    #[error("spawn error: {0}")]
    SpawnError(String),
}

impl HasErrorCode for SupervisorError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SupervisorError::TaskNotFound(_) => ErrorCode::NotFound,
            SupervisorError::AgentUnavailable(_) => ErrorCode::Unavailable,
            SupervisorError::SpawnError(_) => ErrorCode::Internal,
        }
    }
}
