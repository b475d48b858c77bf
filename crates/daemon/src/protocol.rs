// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message envelopes for the newline-delimited JSON wire protocol.
//!
//! A request carries `{id, op, args}`; a response carries `{id}` plus
//! either `result` or `error`. Responses echo the request's `id` verbatim
//! (client-supplied, arbitrary JSON) so a client can correlate
//! out-of-order responses with in-flight requests.

use eto_core::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request from the strategic client.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub id: Value,
    pub op: String,
    #[serde(default = "default_args")]
    pub args: Value,
}

fn default_args() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Error envelope embedded in a failed [`Response`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Response to the strategic client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Response {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl Response {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorEnvelope {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
