// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn display_is_screaming_snake_case() {
    assert_eq!(ErrorCode::BadRequest.to_string(), "BAD_REQUEST");
    assert_eq!(ErrorCode::PreconditionFailed.to_string(), "PRECONDITION_FAILED");
}

#[test]
fn serde_roundtrip() {
    let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
    assert_eq!(json, "\"NOT_FOUND\"");
    let back: ErrorCode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ErrorCode::NotFound);
}
