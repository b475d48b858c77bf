// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

crate::define_id! {
    pub struct TestId;
}

#[test]
fn short_truncates_long_strings() {
    let id = TestId::new("abcdefgh");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_is_noop_for_short_strings() {
    let id = TestId::new("ab");
    assert_eq!(id.short(4), "ab");
}

#[test]
fn display_matches_inner_string() {
    let id = TestId::new("xyz");
    assert_eq!(id.to_string(), "xyz");
}

#[test]
fn sequential_id_gen_is_monotonic_and_unique() {
    let gen = SequentialIdGen::new("t");
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
    assert!(a < b, "ids should sort in generation order: {a} < {b}");
}

#[test]
fn uuid_id_gen_produces_unique_ids() {
    let gen = UuidIdGen;
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
}

#[test]
fn str_short_id_impl() {
    assert_eq!("hello world".short(5), "hello");
    assert_eq!("hi".short(5), "hi");
}
