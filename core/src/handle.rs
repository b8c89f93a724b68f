//! Output handle allocation
//!
//! VCD refers to each distinct signal by a short ASCII handle. Handles
//! here are constant-width base-26 strings over `a..=z`, allocated from a
//! monotonically increasing counter, so allocation order fully determines
//! the handle sequence.

use crate::error::TraceError;

/// Symbol positions per handle
const HANDLE_LEN: usize = 5;
const ALPHABET_LEN: u64 = 26;

/// Distinct handles available before allocation fails (26^5)
pub const HANDLE_CAPACITY: u64 = ALPHABET_LEN.pow(HANDLE_LEN as u32);

/// Deterministic base-26 handle allocator
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next handle.
    ///
    /// Fails with [`TraceError::HandlesExhausted`] once the counter
    /// reaches [`HANDLE_CAPACITY`]; handles are never reused or recycled.
    pub fn next_handle(&mut self) -> Result<String, TraceError> {
        if self.next >= HANDLE_CAPACITY {
            return Err(TraceError::HandlesExhausted);
        }

        let mut digits = [b'a'; HANDLE_LEN];
        let mut rest = self.next;
        for digit in digits.iter_mut().rev() {
            *digit = b'a' + (rest % ALPHABET_LEN) as u8;
            rest /= ALPHABET_LEN;
        }
        self.next += 1;

        Ok(digits.iter().map(|&b| b as char).collect())
    }

    /// Number of handles allocated so far
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
