#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::store::Store;

#[test]
fn find_returns_none_on_empty_store() {
    let mut buf = [0_u8; 128];
    let mut store = Store::init(&mut buf, 8).unwrap();
    assert_eq!(store.find(b"a"), None);
}

#[test]
fn find_locates_a_live_key() {
    let mut buf = [0_u8; 128];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1").unwrap();
    store.create(b"b", b"2").unwrap();
    assert_eq!(store.find(b"b"), Some(1));
}

#[test]
fn find_skips_tombstones() {
    let mut buf = [0_u8; 128];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1").unwrap();
    store.delete(b"a").unwrap();
    assert_eq!(store.find(b"a"), None);
}

#[test]
fn find_caches_last_hit() {
    let mut buf = [0_u8; 128];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1").unwrap();
    store.find(b"a");
    assert_eq!(store.header().last_found, 0);
}

#[test]
fn find_ignores_stale_cache_for_a_deleted_slot() {
    let mut buf = [0_u8; 128];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1").unwrap();
    store.find(b"a");
    store.delete(b"a").unwrap();
    assert_eq!(store.find(b"a"), None);
}
