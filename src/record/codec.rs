//! Record codec
//!
//! Key extraction and joined-record construction at fixed byte offsets.
//!
//! Keys are decoded by hand, one digit at a time, so the same routine serves
//! freshly read I/O buffers and reshuffled sort buffers alike.

use super::{Key, RecordLayout};

// =============================================================================
// Key Extraction
// =============================================================================

impl RecordLayout {
    /// Read the key of a standalone record
    ///
    /// Returns `None` when the record is too short, the separator is not at
    /// offset `key_width`, or the key field holds a non-digit.
    pub fn extract_key(&self, record: &[u8]) -> Option<Key> {
        if record.len() <= self.key_width {
            return None;
        }
        if record[self.separator_offset()] != self.separator {
            return None;
        }

        let field = &record[..self.key_width];
        if !field.iter().all(u8::is_ascii_digit) {
            return None;
        }

        Some(decode_digits(field))
    }

    /// Read the key of the record in `slot` of a multi-record buffer
    pub fn extract_key_at(&self, buffer: &[u8], slot: usize) -> Option<Key> {
        let width = self.record_width();
        let start = slot.checked_mul(width)?;
        let end = start.checked_add(width)?;
        buffer.get(start..end).and_then(|record| self.extract_key(record))
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Write `key` zero-padded into the first `key_width` bytes of `out`
    ///
    /// Digits are produced least-significant first, back to front. Keys wider
    /// than the field keep only their low `key_width` digits.
    pub fn encode_key(&self, key: Key, out: &mut [u8]) {
        let mut remaining = key;
        for slot in out[..self.key_width].iter_mut().rev() {
            *slot = b'0' + (remaining % 10) as u8;
            remaining /= 10;
        }
    }

    // =========================================================================
    // Joined Records
    // =========================================================================

    /// Write `key,valueA,valueB` into `out`
    ///
    /// `out` must be exactly `joined_width()` bytes; both records must carry
    /// a complete value field.
    pub fn build_joined_record(&self, key: Key, record_a: &[u8], record_b: &[u8], out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.joined_width());

        self.encode_key(key, out);

        let values = self.value_range();
        let second_separator = values.end;
        let second_value = second_separator + 1..second_separator + 1 + self.value_width;

        out[self.separator_offset()] = self.separator;
        out[values.clone()].copy_from_slice(&record_a[values.clone()]);
        out[second_separator] = self.separator;
        out[second_value].copy_from_slice(&record_b[values]);
    }

    /// Allocate and build a joined record
    pub fn joined_record(&self, key: Key, record_a: &[u8], record_b: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; self.joined_width()];
        self.build_joined_record(key, record_a, record_b, &mut out);
        out
    }
}

/// Accumulate ASCII digits, most significant first
///
/// Callers guarantee every byte is a digit and the field fits in a `Key`.
pub(crate) fn decode_digits(field: &[u8]) -> Key {
    field
        .iter()
        .fold(0, |acc, &digit| acc * 10 + Key::from(digit - b'0'))
}
