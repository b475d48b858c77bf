// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format: one UTF-8 JSON object per line (Transport & Framing, C1).
//!
//! Unlike the teacher's length-prefixed binary framing, this protocol is
//! newline-delimited JSON on stdin/stdout per the external-interface
//! contract — a strategic LLM client reads/writes a line-oriented stream,
//! not a binary length prefix.

use crate::protocol::Response;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Protocol errors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line read from the transport: either a parsed request line, a
/// malformed line (logged and skipped rather than fatal), or end of
/// stream.
pub enum ReadOutcome<T> {
    Message(T),
    Malformed { raw: String, error: serde_json::Error },
    Eof,
}

/// Read the next newline-delimited JSON message from `lines`, skipping
/// blank lines (not a protocol violation, unlike malformed ones).
pub async fn read_message<T: serde::de::DeserializeOwned>(
    lines: &mut tokio::io::Lines<BufReader<impl tokio::io::AsyncRead + Unpin>>,
) -> Result<ReadOutcome<T>, WireError> {
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(ReadOutcome::Eof);
        };
        if line.trim().is_empty() {
            continue;
        }
        return Ok(match serde_json::from_str::<T>(&line) {
            Ok(msg) => ReadOutcome::Message(msg),
            Err(error) => ReadOutcome::Malformed { raw: line, error },
        });
    }
}

/// Wrap a reader into a line-buffered stream suitable for [`read_message`].
pub fn lines_of(
    reader: impl tokio::io::AsyncRead + Unpin,
) -> tokio::io::Lines<BufReader<impl tokio::io::AsyncRead + Unpin>> {
    BufReader::new(reader).lines()
}

/// A locked single-sink writer: serializes concurrent handler writes so
/// outgoing messages are never interleaved.
pub struct ResponseSink<W> {
    writer: tokio::sync::Mutex<W>,
}

impl<W: AsyncWrite + Unpin> ResponseSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
        }
    }

    pub async fn send(&self, response: &Response) -> Result<(), WireError> {
        self.send_value(response).await
    }

    /// Generic over any serializable payload, used by malformed-line
    /// error responses which may not carry a full [`Response`] (e.g. an
    /// unrecoverable id).
    pub async fn send_value(&self, value: &impl Serialize) -> Result<(), WireError> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
