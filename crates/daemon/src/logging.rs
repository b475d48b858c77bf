// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (C9): structured JSON events to stderr only.
//!
//! Stdout is the wire protocol's response channel, so logging must never
//! touch it — a stray `println!` or a misconfigured subscriber writing to
//! stdout would corrupt the newline-JSON stream the client is parsing.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber. Reads `RUST_LOG` (falling back
/// to `LOG_LEVEL`, then `info`) for the filter directive.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}
