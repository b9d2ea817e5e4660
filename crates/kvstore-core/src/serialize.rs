// SPDX-License-Identifier: MIT

//! Textual dump of keys, key/value pairs, and the tombstone list.
//!
//! Every function here writes into a caller-supplied `&mut [u8]` and
//! returns the number of bytes actually written. There is no dynamic
//! buffer: once `out` is full, further writes are silently dropped — the
//! caller gets a truncated but still well-formed-as-far-as-it-goes
//! prefix, never a panic or a partial multi-byte write. Output is meant
//! for inspection and dumping, not for being read back; there is no
//! matching parser in this crate.

use crate::kv;
use crate::store::Store;

/// How a key is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyFormat {
    /// The raw key bytes, unquoted.
    Raw,
    /// The key wrapped in double quotes.
    #[default]
    Quoted,
}

/// How a value is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// The raw value bytes, copied verbatim.
    Raw,
    /// Lower-case hex, two characters per byte, wrapped in single quotes.
    #[default]
    Hex,
}

/// Combined rendering choice for [`Store::to_text`] and
/// [`Store::keyvalue_to_text`]; the `format_flags` of spec.md §6.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextFormat {
    pub key: KeyFormat,
    pub value: ValueFormat,
}

/// A bounded, non-allocating byte sink.
///
/// Tracks how much of `out` has been filled; writes past capacity are
/// dropped rather than panicking, which is what lets every serializer
/// function below silently truncate instead of erroring out.
struct Sink<'a> {
    out: &'a mut [u8],
    len: usize,
}

impl<'a> Sink<'a> {
    fn new(out: &'a mut [u8]) -> Self {
        Self { out, len: 0 }
    }

    fn write(&mut self, bytes: &[u8]) {
        let remaining = self.out.len() - self.len;
        let n = bytes.len().min(remaining);
        self.out[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
    }

    fn write_hex_byte(&mut self, byte: u8) {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        self.write(&[HEX[(byte >> 4) as usize], HEX[(byte & 0xF) as usize]]);
    }

    fn finish(self) -> usize {
        self.len
    }
}

fn write_key(sink: &mut Sink<'_>, key: &[u8], format: KeyFormat) {
    match format {
        KeyFormat::Raw => sink.write(key),
        KeyFormat::Quoted => {
            sink.write(b"\"");
            sink.write(key);
            sink.write(b"\"");
        }
    }
}

fn write_value(sink: &mut Sink<'_>, value: &[u8], format: ValueFormat) {
    match format {
        ValueFormat::Raw => sink.write(value),
        ValueFormat::Hex => {
            sink.write(b"'");
            for byte in value {
                sink.write_hex_byte(*byte);
            }
            sink.write(b"'");
        }
    }
}

impl Store<'_> {
    /// Writes a single key, formatted per `key_format`, into `out`.
    ///
    /// Returns `0` (and writes nothing) if `key` is absent. Returns the
    /// number of bytes written otherwise, which may be less than the
    /// key's full rendered length if `out` was too small.
    pub fn key_to_text(&mut self, out: &mut [u8], key: &[u8], key_format: KeyFormat) -> usize {
        let Some(index) = self.find(key) else {
            return 0;
        };
        let slot = self.get_slot(index);
        let mut sink = Sink::new(out);
        write_key(&mut sink, kv::read_key(self.buf, &slot), key_format);
        sink.finish()
    }

    /// Writes a single `key:value` pair into `out`, formatted per `format`.
    ///
    /// Returns `0` if `key` is absent.
    pub fn keyvalue_to_text(&mut self, out: &mut [u8], key: &[u8], format: TextFormat) -> usize {
        let Some(index) = self.find(key) else {
            return 0;
        };
        let slot = self.get_slot(index);
        let mut sink = Sink::new(out);
        write_key(&mut sink, kv::read_key(self.buf, &slot), format.key);
        sink.write(b":");
        write_value(&mut sink, kv::read_value(self.buf, &slot), format.value);
        sink.finish()
    }

    /// Writes every live key as a bracketed, comma-separated array into
    /// `out`: `[k1,k2,...]`. An empty store yields `[]`.
    pub fn keys_to_text(&mut self, out: &mut [u8], key_format: KeyFormat) -> usize {
        let mut sink = Sink::new(out);
        sink.write(b"[");
        let mut first = true;
        let mut cursor = self.begin();
        while !Store::equal(cursor, self.end()) {
            if !first {
                sink.write(b",");
            }
            first = false;
            write_key(&mut sink, self.key_of(cursor), key_format);
            cursor = self.next(cursor);
        }
        sink.write(b"]");
        sink.finish()
    }

    /// Writes the tombstone list as a bracketed, comma-separated array of
    /// `{offset:size}` hunk descriptors into `out`. An empty list yields
    /// `[]`.
    pub fn garbage_list_to_text(&mut self, out: &mut [u8]) -> usize {
        let mut sink = Sink::new(out);
        sink.write(b"[");
        let mut cur = self.header().garbage_head;
        let mut first = true;
        while cur != crate::header::NONE {
            if !first {
                sink.write(b",");
            }
            first = false;
            let slot = self.get_slot(cur);
            sink.write(b"{");
            write_u32(&mut sink, slot.heap_offset);
            sink.write(b":");
            write_u32(&mut sink, slot.heap_size);
            sink.write(b"}");
            cur = slot.garbage_next;
        }
        sink.write(b"]");
        sink.finish()
    }

    /// Writes every live key/value pair as a bracketed, comma-separated
    /// array of `key:value` entries into `out`, formatted per `format`.
    pub fn to_text(&mut self, out: &mut [u8], format: TextFormat) -> usize {
        let mut sink = Sink::new(out);
        sink.write(b"[");
        let mut first = true;
        let mut cursor = self.begin();
        while !Store::equal(cursor, self.end()) {
            if !first {
                sink.write(b",");
            }
            first = false;
            write_key(&mut sink, self.key_of(cursor), format.key);
            sink.write(b":");
            write_value(&mut sink, self.value_of(cursor), format.value);
            cursor = self.next(cursor);
        }
        sink.write(b"]");
        sink.finish()
    }
}

/// Writes a `u32` in decimal, without leading zeros.
fn write_u32(sink: &mut Sink<'_>, mut value: u32) {
    let mut digits = [0_u8; 10];
    let mut n = 0;
    if value == 0 {
        sink.write(b"0");
        return;
    }
    while value > 0 {
        digits[n] = b'0' + (value % 10) as u8;
        value /= 10;
        n += 1;
    }
    digits[..n].reverse();
    sink.write(&digits[..n]);
}

#[cfg(test)]
mod serialize_test;
