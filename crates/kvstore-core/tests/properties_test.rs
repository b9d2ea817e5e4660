//! Property-based invariants (spec P1-P9) checked with `proptest` over
//! randomized sequences of store operations.

use kvstore_core::Store;
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

const BUF_SIZE: usize = 4096;
const GRANULE: u32 = 8;

#[derive(Clone, Copy, Debug)]
enum Op {
    Create(u8, u8),
    Delete(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_u8..8, 1_u8..16).prop_map(|(k, v)| Op::Create(k, v)),
        (0_u8..8).prop_map(Op::Delete),
    ]
}

fn key_bytes(k: u8) -> [u8; 1] {
    [b'a' + k]
}

proptest! {
    // P1: count tracks live creates minus deletes of then-live keys.
    #[test]
    fn count_matches_creates_minus_live_deletes(ops in prop_vec(op_strategy(), 0..64)) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();
        let mut live = std::collections::BTreeSet::new();

        for op in ops {
            match op {
                Op::Create(k, v) => {
                    let key = key_bytes(k);
                    if store.create(&key, &[v]).is_ok() {
                        live.insert(k);
                    }
                }
                Op::Delete(k) => {
                    let key = key_bytes(k);
                    store.delete(&key).unwrap();
                    live.remove(&k);
                }
            }
        }

        prop_assert_eq!(store.count(), live.len());
    }

    // P2 / P4: create+read round-trips; duplicate create leaves original
    // value intact; update with a matching size overwrites it.
    #[test]
    fn create_read_update_semantics(a in 1_u8..200, b in 1_u8..200) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();

        store.create(b"k", &[a]).unwrap();
        let mut out = [0_u8; 1];
        store.read(b"k", &mut out).unwrap();
        prop_assert_eq!(out[0], a);

        prop_assert!(store.create(b"k", &[b]).is_err());
        store.read(b"k", &mut out).unwrap();
        prop_assert_eq!(out[0], a);

        store.update(b"k", &[b]).unwrap();
        store.read(b"k", &mut out).unwrap();
        prop_assert_eq!(out[0], b);
    }

    // P3: delete then read is KeyNotFound; deleting an absent key is Ok.
    #[test]
    fn delete_then_read_not_found(a in 1_u8..200) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();

        prop_assert!(store.delete(b"k").is_ok());

        store.create(b"k", &[a]).unwrap();
        store.delete(b"k").unwrap();
        let mut out = [0_u8; 1];
        prop_assert!(store.read(b"k", &mut out).is_err());
    }

    // P5: total consumption (header, live slots, and tombstoned slots
    // alike) never exceeds the buffer, and tombstone bytes are always a
    // subset of that total.
    #[test]
    fn garbage_is_subset_of_used_within_buffer(ops in prop_vec(op_strategy(), 0..64)) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();

        for op in ops {
            match op {
                Op::Create(k, v) => {
                    let key = key_bytes(k);
                    let _ = store.create(&key, &[v]);
                }
                Op::Delete(k) => {
                    let key = key_bytes(k);
                    let _ = store.delete(&key);
                }
            }
            prop_assert!(store.size_used() <= store.size());
            prop_assert!(store.garbage_size() <= store.size_used());
        }
    }

    // P6: garbage_clean zeroes tombstone space, preserves count and every
    // live pair.
    #[test]
    fn clean_preserves_live_pairs(ops in prop_vec(op_strategy(), 0..64)) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();
        let mut live = std::collections::BTreeMap::new();

        for op in ops {
            match op {
                Op::Create(k, v) => {
                    let key = key_bytes(k);
                    if store.create(&key, &[v]).is_ok() {
                        live.insert(k, v);
                    }
                }
                Op::Delete(k) => {
                    let key = key_bytes(k);
                    store.delete(&key).unwrap();
                    live.remove(&k);
                }
            }
        }

        let count_before = store.count();
        store.garbage_clean();

        prop_assert_eq!(store.garbage_size(), 0);
        prop_assert_eq!(store.count(), count_before);
        for (k, v) in &live {
            let key = key_bytes(*k);
            let mut out = [0_u8; 1];
            store.read(&key, &mut out).unwrap();
            prop_assert_eq!(out[0], *v);
        }
    }

    // P8: an iterator's value size always matches read_size of its key.
    #[test]
    fn iterator_value_size_matches_read_size(ops in prop_vec(op_strategy(), 0..64)) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();

        for op in ops {
            match op {
                Op::Create(k, v) => {
                    let key = key_bytes(k);
                    let _ = store.create(&key, &[v]);
                }
                Op::Delete(k) => {
                    let key = key_bytes(k);
                    let _ = store.delete(&key);
                }
            }
        }

        let mut cursor = store.begin();
        while !Store::equal(cursor, store.end()) {
            let key = store.key_of(cursor).to_vec();
            let size_from_iter = store.value_size_of(cursor);
            let size_from_read = store.read_size(&key).unwrap();
            prop_assert_eq!(size_from_iter, size_from_read);
            cursor = store.next(cursor);
        }
    }

    // P9: size_used never increases from a garbage_pop/garbage_clean call,
    // and never decreases from a successful create.
    #[test]
    fn size_used_monotonicity(ops in prop_vec(op_strategy(), 0..64)) {
        let mut buf = [0_u8; BUF_SIZE];
        let mut store = Store::init(&mut buf, GRANULE).unwrap();

        for op in ops {
            match op {
                Op::Create(k, v) => {
                    let key = key_bytes(k);
                    let before = store.size_used();
                    if store.create(&key, &[v]).is_ok() {
                        prop_assert!(store.size_used() >= before);
                    }
                }
                Op::Delete(k) => {
                    let key = key_bytes(k);
                    let _ = store.delete(&key);
                }
            }
        }

        let before = store.size_used();
        store.garbage_pop(usize::MAX);
        prop_assert!(store.size_used() <= before);

        let before = store.size_used();
        store.garbage_clean();
        prop_assert!(store.size_used() <= before);
    }
}
