// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared client-error taxonomy.
//!
//! Defined here rather than in `eto-daemon` so that `eto-engine` and
//! `eto-adapters` error types can map onto it without a dependency back on
//! the daemon crate; the daemon re-exports it for response-envelope use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error code surfaced in protocol error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    PermissionDenied,
    PreconditionFailed,
    Unavailable,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::PreconditionFailed => "PRECONDITION_FAILED",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{s}")
    }
}

/// Implemented by every crate-local error enum so the dispatcher can build
/// a response envelope without matching on concrete error types.
pub trait HasErrorCode {
    fn error_code(&self) -> ErrorCode;
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
