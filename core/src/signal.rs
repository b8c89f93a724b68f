//! Observed-signal arena
//!
//! Holds the live values the recorder samples. The simulation owns the
//! store and mutates slots between cycles through the typed setters; the
//! recorder only ever reads. A [`SignalId`] is both the access handle and
//! the storage identity: registering two trace names against the same id
//! makes them aliases in the dump.

/// Four-state logic level for logic-vector signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    Zero,
    One,
    /// Unknown
    X,
    /// High impedance
    Z,
}

impl Logic {
    /// Character used for this level in VCD value tokens
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }
}

/// Fixed-point value stored as raw integer bits plus a fractional bit count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    pub raw: i64,
    pub frac_bits: u32,
}

impl Fixed {
    pub fn new(raw: i64, frac_bits: u32) -> Self {
        Self { raw, frac_bits }
    }

    /// Closest double-precision representation of this value
    pub fn to_f64(self) -> f64 {
        (self.raw as f64) * 2f64.powi(-(self.frac_bits as i32))
    }
}

/// Runtime value of one observed slot
///
/// For the vector kinds, index 0 is the least-significant position.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Single-bit boolean
    Bit(bool),
    /// Fixed-width integer up to 64 bits, raw two's-complement bits.
    /// The declared width comes from the registration hint.
    Int(u64),
    F32(f32),
    F64(f64),
    /// Fixed-point, emitted as the bit pattern of its f64 conversion
    Fixed(Fixed),
    /// Arbitrary-width bit vector, width = element count
    Bits(Vec<bool>),
    /// Arbitrary-width four-state logic vector, width = element count
    Logic(Vec<Logic>),
}

impl SignalValue {
    /// Natural bit width of this kind, before any registration override
    pub fn natural_width(&self) -> u32 {
        match self {
            SignalValue::Bit(_) => 1,
            SignalValue::Int(_) => 64,
            SignalValue::F32(_) => 32,
            SignalValue::F64(_) => 64,
            SignalValue::Fixed(_) => 64,
            SignalValue::Bits(bits) => saturating_width(bits.len()),
            SignalValue::Logic(levels) => saturating_width(levels.len()),
        }
    }

    /// Short kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            SignalValue::Bit(_) => "bit",
            SignalValue::Int(_) => "int",
            SignalValue::F32(_) => "f32",
            SignalValue::F64(_) => "f64",
            SignalValue::Fixed(_) => "fixed",
            SignalValue::Bits(_) => "bits",
            SignalValue::Logic(_) => "logic",
        }
    }

    /// Bitwise equality used for change detection.
    ///
    /// Floats compare by bit pattern, so two different NaN encodings are
    /// unequal even though `==` would call them equal or unequal by IEEE
    /// rules.
    pub fn bits_eq(&self, other: &SignalValue) -> bool {
        match (self, other) {
            (SignalValue::Bit(a), SignalValue::Bit(b)) => a == b,
            (SignalValue::Int(a), SignalValue::Int(b)) => a == b,
            (SignalValue::F32(a), SignalValue::F32(b)) => a.to_bits() == b.to_bits(),
            (SignalValue::F64(a), SignalValue::F64(b)) => a.to_bits() == b.to_bits(),
            (SignalValue::Fixed(a), SignalValue::Fixed(b)) => a == b,
            (SignalValue::Bits(a), SignalValue::Bits(b)) => a == b,
            (SignalValue::Logic(a), SignalValue::Logic(b)) => a == b,
            _ => false,
        }
    }

    fn same_kind(&self, other: &SignalValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Saturating length-to-width conversion; an oversized vector must never
/// fold back to a small or degenerate width
fn saturating_width(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Opaque handle to one observed slot
///
/// Doubles as the storage identity used for alias detection: ids compare
/// equal iff they denote the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(usize);

/// Arena of observed slots
#[derive(Debug, Default)]
pub struct SignalStore {
    slots: Vec<SignalValue>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, value: SignalValue) -> SignalId {
        let id = SignalId(self.slots.len());
        self.slots.push(value);
        id
    }

    /// Create a single-bit slot
    pub fn bit(&mut self, value: bool) -> SignalId {
        self.push(SignalValue::Bit(value))
    }

    /// Create a fixed-width integer slot
    pub fn int(&mut self, value: u64) -> SignalId {
        self.push(SignalValue::Int(value))
    }

    /// Create a fixed-width integer slot from a signed value
    pub fn int_signed(&mut self, value: i64) -> SignalId {
        self.push(SignalValue::Int(value as u64))
    }

    pub fn f32(&mut self, value: f32) -> SignalId {
        self.push(SignalValue::F32(value))
    }

    pub fn f64(&mut self, value: f64) -> SignalId {
        self.push(SignalValue::F64(value))
    }

    pub fn fixed(&mut self, value: Fixed) -> SignalId {
        self.push(SignalValue::Fixed(value))
    }

    /// Create a bit-vector slot, index 0 = least-significant bit
    pub fn bits(&mut self, value: Vec<bool>) -> SignalId {
        self.push(SignalValue::Bits(value))
    }

    /// Create a logic-vector slot, index 0 = least-significant position
    pub fn logic(&mut self, value: Vec<Logic>) -> SignalId {
        self.push(SignalValue::Logic(value))
    }

    /// Read a slot's current value
    pub fn get(&self, id: SignalId) -> &SignalValue {
        &self.slots[id.0]
    }

    /// Replace a slot's value. Kind-mismatched writes are logged and ignored.
    pub fn set(&mut self, id: SignalId, value: SignalValue) {
        let slot = &mut self.slots[id.0];
        if !slot.same_kind(&value) {
            tracing::warn!(
                "signal {:?}: {} write ignored, slot holds {}",
                id,
                value.kind_name(),
                slot.kind_name()
            );
            return;
        }
        *slot = value;
    }

    pub fn set_bit(&mut self, id: SignalId, value: bool) {
        self.set(id, SignalValue::Bit(value));
    }

    pub fn set_int(&mut self, id: SignalId, value: u64) {
        self.set(id, SignalValue::Int(value));
    }

    pub fn set_int_signed(&mut self, id: SignalId, value: i64) {
        self.set(id, SignalValue::Int(value as u64));
    }

    pub fn set_f32(&mut self, id: SignalId, value: f32) {
        self.set(id, SignalValue::F32(value));
    }

    pub fn set_f64(&mut self, id: SignalId, value: f64) {
        self.set(id, SignalValue::F64(value));
    }

    pub fn set_fixed(&mut self, id: SignalId, value: Fixed) {
        self.set(id, SignalValue::Fixed(value));
    }

    pub fn set_bits(&mut self, id: SignalId, value: Vec<bool>) {
        self.set(id, SignalValue::Bits(value));
    }

    pub fn set_logic(&mut self, id: SignalId, value: Vec<Logic>) {
        self.set(id, SignalValue::Logic(value));
    }

    /// Number of slots in the arena
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
