//! Record slice
//!
//! A typed view over a contiguous buffer of fixed-width records, indexed by
//! record number instead of byte offset.

use crate::error::{JoinError, Result};

use super::codec::decode_digits;
use super::{Key, RecordLayout};

/// Mutable view over whole fixed-width record slots
///
/// Construction validates every slot, so `key()` never fails afterwards.
pub struct RecordSlice<'a> {
    buffer: &'a mut [u8],
    layout: RecordLayout,
    /// One record of scratch space for swaps
    scratch: Vec<u8>,
}

impl<'a> RecordSlice<'a> {
    /// Wrap `buffer`, which must hold a whole number of valid records
    pub fn new(buffer: &'a mut [u8], layout: RecordLayout) -> Result<Self> {
        let width = layout.record_width();
        if buffer.len() % width != 0 {
            return Err(JoinError::malformed(
                "sort buffer",
                format!(
                    "{} bytes is not a whole number of {}-byte records",
                    buffer.len(),
                    width
                ),
            ));
        }

        for (slot, record) in buffer.chunks_exact(width).enumerate() {
            if layout.extract_key(record).is_none() {
                return Err(JoinError::malformed(
                    format!("record {}", slot),
                    format!("invalid key field {:?}", String::from_utf8_lossy(record)),
                ));
            }
            if record[width - 1] != layout.terminator {
                return Err(JoinError::malformed(
                    format!("record {}", slot),
                    "missing line terminator",
                ));
            }
        }

        Ok(Self {
            buffer,
            layout,
            scratch: vec![0u8; width],
        })
    }

    /// Number of records in the view
    pub fn len(&self) -> usize {
        self.buffer.len() / self.layout.record_width()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes of the record at `index`
    pub fn record(&self, index: usize) -> &[u8] {
        let width = self.layout.record_width();
        &self.buffer[index * width..(index + 1) * width]
    }

    /// Key of the record at `index`
    pub fn key(&self, index: usize) -> Key {
        decode_digits(&self.record(index)[..self.layout.key_width])
    }

    /// Exchange two record slots through the scratch slot
    pub fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let width = self.layout.record_width();
        let (a, b) = (i * width, j * width);

        self.scratch.copy_from_slice(&self.buffer[a..a + width]);
        self.buffer.copy_within(b..b + width, a);
        self.buffer[b..b + width].copy_from_slice(&self.scratch);
    }

    /// Iterate over keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        (0..self.len()).map(move |i| self.key(i))
    }
}
