#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::store::Store;

#[test]
fn allocate_grows_stack_and_heap() {
    let mut buf = [0_u8; 256];
    let mut store = Store::init(&mut buf, 8).unwrap();
    let before = store.size_used();
    let index = store.allocate(3, 5).expect("room for one entry");
    assert_eq!(index, 0);
    assert!(store.size_used() > before);
    assert_eq!(store.header().slot_count, 1);
}

#[test]
fn allocate_rejects_collision_and_rolls_back() {
    let mut buf = [0_u8; 64];
    let mut store = Store::init(&mut buf, 8).unwrap();
    let before_header = store.header();
    // A hunk this size cannot possibly fit alongside even one slot record
    // in a 64-byte buffer; the push must roll back completely.
    assert!(store.allocate(7, 1_000).is_none());
    let after_header = store.header();
    assert_eq!(before_header.slot_count, after_header.slot_count);
    assert_eq!(before_header.heap_size, after_header.heap_size);
}

#[test]
fn allocate_reuses_same_size_tombstone_without_growing() {
    let mut buf = [0_u8; 256];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1234").unwrap();
    store.create(b"b", b"5678").unwrap();
    store.delete(b"a").unwrap();

    let before = store.size_used();
    store.create(b"c", b"9999").unwrap();
    assert_eq!(store.size_used(), before);
    assert_eq!(store.count(), 2);
}

#[test]
fn allocate_prefers_lowest_index_tombstone_of_matching_size() {
    let mut buf = [0_u8; 256];
    let mut store = Store::init(&mut buf, 8).unwrap();
    store.create(b"a", b"1111").unwrap();
    store.create(b"b", b"2222").unwrap();
    store.create(b"c", b"3333").unwrap();
    store.delete(b"a").unwrap();
    store.delete(b"b").unwrap();

    // Both "a" and "b"'s tombstones are the same hunk size; reuse picks
    // slot 0 ("a"'s former slot), the lowest index.
    let index = store.allocate(1, 4).unwrap();
    assert_eq!(index, 0);
}
