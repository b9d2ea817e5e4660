#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn write_then_read_round_trips() {
    let mut buf = [0_u8; 64];
    let slot = Slot::new(0, 16, 3, 5);
    write_keyvalue(&mut buf, &slot, b"abc", b"hello");
    assert_eq!(read_value(&buf, &slot), b"hello");
    assert_eq!(read_key(&buf, &slot), b"abc");
}

#[test]
fn key_is_nul_terminated_in_the_buffer() {
    let mut buf = [0xFF_u8; 64];
    let slot = Slot::new(0, 16, 3, 5);
    write_keyvalue(&mut buf, &slot, b"abc", b"hello");
    let (_, key_end) = key_range(&slot);
    assert_eq!(buf[key_end], 0);
}

#[test]
fn update_leaves_key_untouched() {
    let mut buf = [0_u8; 64];
    let slot = Slot::new(0, 16, 3, 5);
    write_keyvalue(&mut buf, &slot, b"abc", b"hello");
    write_value(&mut buf, &slot, b"world");
    assert_eq!(read_value(&buf, &slot), b"world");
    assert_eq!(read_key(&buf, &slot), b"abc");
}

#[test]
fn key_matches_compares_stored_bytes() {
    let mut buf = [0_u8; 64];
    let slot = Slot::new(0, 16, 3, 5);
    write_keyvalue(&mut buf, &slot, b"abc", b"hello");
    assert!(key_matches(&buf, &slot, b"abc"));
    assert!(!key_matches(&buf, &slot, b"abd"));
}
