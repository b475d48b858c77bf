// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn critical_outranks_all_others() {
    assert!(Priority::Critical > Priority::High);
    assert!(Priority::High > Priority::Normal);
    assert!(Priority::Normal > Priority::Low);
}

#[test]
fn sorting_descending_puts_critical_first() {
    let mut v = vec![Priority::Low, Priority::Critical, Priority::Normal, Priority::High];
    v.sort_by(|a, b| b.cmp(a));
    assert_eq!(
        v,
        vec![Priority::Critical, Priority::High, Priority::Normal, Priority::Low]
    );
}

#[test]
fn default_is_normal() {
    assert_eq!(Priority::default(), Priority::Normal);
}

#[test]
fn serde_roundtrip_uses_uppercase() {
    let json = serde_json::to_string(&Priority::High).unwrap();
    assert_eq!(json, "\"HIGH\"");
    let back: Priority = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Priority::High);
}
