// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool Dispatcher (C2): named operations registered with a handler that
//! validates its own arguments and returns a result or a typed failure.
//!
//! Registration order is preserved (`IndexMap`) purely so a future
//! introspection operation could list tools deterministically; dispatch
//! itself is a plain name lookup.

use crate::protocol::Response;
use eto_core::{ErrorCode, HasErrorCode};
use indexmap::IndexMap;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// A client- or handler-raised dispatch failure, already mapped onto the
/// stable [`ErrorCode`] taxonomy.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct DispatchError {
    pub code: ErrorCode,
    pub message: String,
}

impl DispatchError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Builds a [`DispatchError`] from any handler-local error implementing
    /// [`HasErrorCode`], e.g. `RegistryError`, `AnalyzeError`.
    pub fn from_error(err: impl HasErrorCode + std::fmt::Display) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send>>;
type HandlerFn = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// One registered operation: a name plus a handler that validates its own
/// arguments (typically by `serde_json::from_value` into a typed args
/// struct, converting a deserialization failure into `BadRequest`).
#[derive(Clone)]
struct ToolSpec {
    handler: HandlerFn,
}

/// Routes named operations to their handlers and serializes the result.
#[derive(Clone, Default)]
pub struct Dispatcher {
    tools: IndexMap<String, ToolSpec>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. Re-registering the same name replaces the
    /// prior handler (useful for tests that stub a single operation).
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, DispatchError>> + Send + 'static,
    {
        let handler: HandlerFn = Arc::new(move |args| Box::pin(handler(args)));
        self.tools.insert(name.into(), ToolSpec { handler });
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Dispatch `op` with `args`, returning a ready-to-serialize envelope.
    /// Never panics: handler errors and unknown operations both become an
    /// `error` envelope, never a dropped request.
    pub async fn dispatch(&self, id: Value, op: &str, args: Value) -> Response {
        let Some(spec) = self.tools.get(op) else {
            tracing::warn!(op, "unknown operation");
            return Response::err(id, ErrorCode::BadRequest, format!("unknown operation: {op}"));
        };

        match (spec.handler)(args).await {
            Ok(result) => Response::ok(id, result),
            Err(e) if e.code == ErrorCode::Internal => {
                tracing::error!(op, error = %e.message, "internal error");
                Response::err(id, e.code, e.message)
            }
            Err(e) => {
                tracing::warn!(op, code = %e.code, error = %e.message, "request failed");
                Response::err(id, e.code, e.message)
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
