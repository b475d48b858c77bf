// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdio transport loop: reads newline-delimited requests, dispatches each
//! on its own task so a slow operation never blocks unrelated ones, and
//! writes responses back through a single serialized sink.
//!
//! EOF on the reader (the client closed stdin) ends the read loop; the
//! function then waits for in-flight dispatches to finish writing their
//! responses before returning, so shutdown never drops a response the
//! client is still waiting on.

use crate::dispatch::Dispatcher;
use crate::protocol::{Request, Response};
use crate::wire::{lines_of, read_message, ReadOutcome, ResponseSink, WireError};
use eto_core::ErrorCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;

/// Drive the request/response loop until the reader reaches EOF.
pub async fn run_transport<R, W>(
    reader: R,
    sink: Arc<ResponseSink<W>>,
    dispatcher: Arc<Dispatcher>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut lines = lines_of(reader);
    let mut in_flight = JoinSet::new();

    loop {
        match read_message::<Request>(&mut lines).await {
            Ok(ReadOutcome::Message(request)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let sink = Arc::clone(&sink);
                in_flight.spawn(async move {
                    let response = dispatcher.dispatch(request.id, &request.op, request.args).await;
                    if let Err(e) = sink.send(&response).await {
                        tracing::error!(error = %e, "failed to write response");
                    }
                });
            }
            Ok(ReadOutcome::Malformed { raw, error }) => {
                tracing::warn!(error = %error, line = %raw, "malformed request line");
                let response = Response::err(
                    Value::Null,
                    ErrorCode::BadRequest,
                    format!("malformed request: {error}"),
                );
                if let Err(e) = sink.send(&response).await {
                    tracing::error!(error = %e, "failed to write malformed-request response");
                }
            }
            Ok(ReadOutcome::Eof) => break,
            Err(WireError::Io(e)) => {
                tracing::error!(error = %e, "transport read error");
                break;
            }
            Err(WireError::Json(_)) => unreachable!("read_message reports JSON errors as Malformed"),
        }
    }

    while in_flight.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
