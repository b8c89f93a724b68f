//! Trace records and VCD value encoding
//!
//! A [`TraceRecord`] binds one observed slot to a hierarchical name and
//! keeps the snapshot used for change detection. Encoding follows the
//! slot's kind: single-bit kinds emit `<0|1><handle>`, everything else the
//! multi-bit `b<bits> <handle>` token with the bit string zero-padded to
//! the declared width. Floats are pattern-preserving at their own width:
//! f32 as a 32-bit token, f64 and fixed-point (via the closest f64) as a
//! 64-bit token.

use std::io::{self, Write};

use crate::signal::{SignalId, SignalStore, SignalValue};

/// One observed value bound to a hierarchical name
#[derive(Debug)]
pub struct TraceRecord {
    /// Sanitized hierarchical dotted name, immutable after registration
    pub name: String,
    /// Storage identity of the observed slot
    pub signal: SignalId,
    /// Declared bit width; 0 marks a degenerate trace
    pub width: u32,
    /// Output handle, assigned once at initialization
    pub handle: String,
    /// True when an earlier trace owns this record's handle
    pub is_alias: bool,
    /// Last recorded value
    snapshot: SignalValue,
}

impl TraceRecord {
    /// Bind a trace to `signal`, snapshotting its current value.
    ///
    /// `width_hint` overrides the natural width only for the fixed-width
    /// integer kind; self-describing kinds ignore it. Hints above 64 are
    /// clamped to the storage width.
    pub(crate) fn new(
        store: &SignalStore,
        name: String,
        signal: SignalId,
        width_hint: Option<u32>,
    ) -> Self {
        let live = store.get(signal);
        let width = match live {
            SignalValue::Int(_) => width_hint.unwrap_or(64).min(64),
            other => other.natural_width(),
        };
        Self {
            name,
            signal,
            width,
            handle: String::new(),
            is_alias: false,
            snapshot: live.clone(),
        }
    }

    /// True iff this trace is active and its snapshot differs bitwise from
    /// the live value
    pub fn changed(&self, store: &SignalStore) -> bool {
        !self.is_alias && !self.snapshot.bits_eq(store.get(self.signal))
    }

    /// Copy the live value into the snapshot
    pub fn update(&mut self, store: &SignalStore) {
        self.snapshot = store.get(self.signal).clone();
    }

    /// Emit the snapshot as one VCD value-change line.
    ///
    /// `scratch` is a reusable buffer for the vector kinds, sized on
    /// demand and cleared per call.
    pub fn record<W: Write>(&self, out: &mut W, scratch: &mut String) -> io::Result<()> {
        match &self.snapshot {
            SignalValue::Bit(bit) => {
                writeln!(out, "{}{}", if *bit { '1' } else { '0' }, self.handle)
            }
            SignalValue::Int(value) => {
                let width = self.width as usize;
                writeln!(
                    out,
                    "b{:0width$b} {}",
                    value & width_mask(self.width),
                    self.handle
                )
            }
            SignalValue::F32(value) => {
                writeln!(out, "b{:032b} {}", value.to_bits(), self.handle)
            }
            SignalValue::F64(value) => {
                writeln!(out, "b{:064b} {}", value.to_bits(), self.handle)
            }
            SignalValue::Fixed(value) => {
                writeln!(out, "b{:064b} {}", value.to_f64().to_bits(), self.handle)
            }
            // 1-wide vectors take the scalar token form, matching their
            // `$var wire 1` declaration
            SignalValue::Bits(bits) => match bits.as_slice() {
                [bit] => writeln!(out, "{}{}", if *bit { '1' } else { '0' }, self.handle),
                bits => {
                    scratch.clear();
                    for &bit in bits.iter().rev() {
                        scratch.push(if bit { '1' } else { '0' });
                    }
                    writeln!(out, "b{} {}", scratch, self.handle)
                }
            },
            SignalValue::Logic(levels) => match levels.as_slice() {
                [level] => writeln!(out, "{}{}", level.to_char(), self.handle),
                levels => {
                    scratch.clear();
                    for &level in levels.iter().rev() {
                        scratch.push(level.to_char());
                    }
                    writeln!(out, "b{} {}", scratch, self.handle)
                }
            },
        }
    }

    /// Refresh the snapshot and emit it unconditionally
    pub fn update_and_record<W: Write>(
        &mut self,
        store: &SignalStore,
        out: &mut W,
        scratch: &mut String,
    ) -> io::Result<()> {
        self.update(store);
        self.record(out, scratch)
    }
}

fn width_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Fixed, Logic};

    fn record_to_string(trace: &TraceRecord) -> String {
        let mut out = Vec::new();
        let mut scratch = String::new();
        trace.record(&mut out, &mut scratch).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn with_handle(mut trace: TraceRecord, handle: &str) -> TraceRecord {
        trace.handle = handle.to_string();
        trace
    }

    #[test]
    fn test_bit_encoding() {
        let mut store = SignalStore::new();
        let id = store.bit(true);
        let trace = with_handle(
            TraceRecord::new(&store, "top.flag".into(), id, None),
            "aaaaa",
        );
        assert_eq!(record_to_string(&trace), "1aaaaa\n");
    }

    #[test]
    fn test_int_masked_and_padded() {
        let mut store = SignalStore::new();
        let id = store.int(0x1A5);
        let trace = with_handle(
            TraceRecord::new(&store, "top.byte".into(), id, Some(8)),
            "aaaab",
        );
        // Masked to 8 bits: 0xA5
        assert_eq!(record_to_string(&trace), "b10100101 aaaab\n");
    }

    #[test]
    fn test_int_zero_is_full_width() {
        let mut store = SignalStore::new();
        let id = store.int(0);
        let trace = with_handle(TraceRecord::new(&store, "top.c".into(), id, Some(8)), "aaaac");
        assert_eq!(record_to_string(&trace), "b00000000 aaaac\n");
    }

    #[test]
    fn test_signed_int_encoding() {
        let mut store = SignalStore::new();
        let id = store.int_signed(-1);
        let trace = with_handle(TraceRecord::new(&store, "top.s".into(), id, Some(4)), "aaaad");
        assert_eq!(record_to_string(&trace), "b1111 aaaad\n");
    }

    #[test]
    fn test_f32_pattern_encoding() {
        let mut store = SignalStore::new();
        let id = store.f32(1.0);
        let trace = with_handle(TraceRecord::new(&store, "top.f".into(), id, None), "aaaae");
        let expected = format!("b{:032b} aaaae\n", 1.0f32.to_bits());
        assert_eq!(record_to_string(&trace), expected);
        assert_eq!(trace.width, 32);
    }

    #[test]
    fn test_fixed_encodes_as_f64_pattern() {
        let mut store = SignalStore::new();
        let id = store.fixed(Fixed::new(0x18000, 16)); // 1.5 in Q16.16
        let trace = with_handle(TraceRecord::new(&store, "top.q".into(), id, None), "aaaaf");
        let expected = format!("b{:064b} aaaaf\n", 1.5f64.to_bits());
        assert_eq!(record_to_string(&trace), expected);
    }

    #[test]
    fn test_vector_encoding_msb_first() {
        let mut store = SignalStore::new();
        // index 0 = LSB; value is 0b0011
        let id = store.bits(vec![true, true, false, false]);
        let trace = with_handle(TraceRecord::new(&store, "top.v".into(), id, None), "aaaag");
        assert_eq!(record_to_string(&trace), "b0011 aaaag\n");
        assert_eq!(trace.width, 4);
    }

    #[test]
    fn test_logic_vector_encoding() {
        let mut store = SignalStore::new();
        let id = store.logic(vec![Logic::One, Logic::X, Logic::Z, Logic::Zero]);
        let trace = with_handle(TraceRecord::new(&store, "top.l".into(), id, None), "aaaah");
        assert_eq!(record_to_string(&trace), "b0zx1 aaaah\n");
    }

    #[test]
    fn test_single_bit_vector_uses_scalar_form() {
        let mut store = SignalStore::new();
        let id = store.bits(vec![false]);
        let trace = with_handle(TraceRecord::new(&store, "top.b1".into(), id, None), "aaaai");
        assert_eq!(trace.width, 1);
        assert_eq!(record_to_string(&trace), "0aaaai\n");
    }

    #[test]
    fn test_single_logic_vector_uses_scalar_form() {
        let mut store = SignalStore::new();
        let id = store.logic(vec![Logic::X]);
        let trace = with_handle(TraceRecord::new(&store, "top.l1".into(), id, None), "aaaaj");
        assert_eq!(record_to_string(&trace), "xaaaaj\n");

        store.set_logic(id, vec![Logic::One]);
        let mut live = with_handle(TraceRecord::new(&store, "top.l1".into(), id, None), "aaaaj");
        live.update(&store);
        assert_eq!(record_to_string(&live), "1aaaaj\n");
    }

    #[test]
    fn test_changed_and_update() {
        let mut store = SignalStore::new();
        let id = store.int(5);
        let mut trace = TraceRecord::new(&store, "top.n".into(), id, Some(16));

        assert!(!trace.changed(&store));
        store.set_int(id, 6);
        assert!(trace.changed(&store));
        trace.update(&store);
        assert!(!trace.changed(&store));
    }

    #[test]
    fn test_alias_never_changes() {
        let mut store = SignalStore::new();
        let id = store.bit(false);
        let mut trace = TraceRecord::new(&store, "top.a".into(), id, None);
        trace.is_alias = true;

        store.set_bit(id, true);
        assert!(!trace.changed(&store));
    }

    #[test]
    fn test_width_hint_only_applies_to_int() {
        let mut store = SignalStore::new();
        let int_id = store.int(0);
        let vec_id = store.bits(vec![false; 3]);

        assert_eq!(TraceRecord::new(&store, "a".into(), int_id, Some(12)).width, 12);
        assert_eq!(TraceRecord::new(&store, "b".into(), int_id, None).width, 64);
        assert_eq!(TraceRecord::new(&store, "c".into(), int_id, Some(99)).width, 64);
        // Self-describing kinds ignore the hint
        assert_eq!(TraceRecord::new(&store, "d".into(), vec_id, Some(12)).width, 3);
    }
}
