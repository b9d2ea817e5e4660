#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::header::Header;

#[test]
fn hunk_size_rounds_up_to_granule() {
    assert_eq!(hunk_size_for(8, 3, 2), 8);
    assert_eq!(hunk_size_for(8, 6, 3), 16);
    assert_eq!(hunk_size_for(8, 8, 8), 16);
}

#[test]
fn hunk_size_has_a_floor_of_one_granule() {
    assert_eq!(hunk_size_for(8, 0, 0), 8);
}

#[test]
fn push_then_pop_is_a_no_op() {
    let mut header = Header::new(1024, 8);
    let top = push(&mut header, 32);
    assert_eq!(top, 992);
    let restored = pop(&mut header, 32);
    assert_eq!(restored, 1024);
    assert_eq!(header.heap_size, 0);
}
