//! Record Module
//!
//! Fixed-width record layout and codec.
//!
//! ## Responsibilities
//! - Declare field widths once and derive every offset from them
//! - Extract the integer key of a record at its fixed offset
//! - Build joined output records
//! - Provide a typed view over multi-record sort buffers
//!
//! ## Record Format
//! ```text
//! ┌───────────────┬─────┬──────────────────────┬────┐
//! │ Key (9 digits)│ ',' │ Value (14 bytes)     │ \n │   = 26 bytes
//! └───────────────┴─────┴──────────────────────┴────┘
//! ```
//!
//! ## Joined Record Format
//! ```text
//! ┌───────────────┬─────┬──────────────┬─────┬──────────────┐
//! │ Key (9 digits)│ ',' │ Value A (14) │ ',' │ Value B (14) │   = 39 bytes
//! └───────────────┴─────┴──────────────┴─────┴──────────────┘
//! ```
//! The terminator is appended by the writer, not stored in the joined buffer.

mod codec;
mod slice;

use std::ops::Range;

use crate::error::{JoinError, Result};

pub use slice::RecordSlice;

/// Numeric join key
pub type Key = u64;

/// Digits in the key field of the default layout
pub const DEFAULT_KEY_WIDTH: usize = 9;

/// Bytes in the value field of the default layout
pub const DEFAULT_VALUE_WIDTH: usize = 14;

/// Separator between fields
pub const FIELD_SEPARATOR: u8 = b',';

/// Terminator ending every record line
pub const LINE_TERMINATOR: u8 = b'\n';

/// Largest key width whose values always fit in a `Key`
pub const MAX_KEY_WIDTH: usize = 19;

/// Field widths of a fixed-width table
///
/// All offsets used by the codec, the sorter and the merge join are derived
/// from this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Number of zero-padded decimal digits in the key field
    pub key_width: usize,
    /// Number of bytes in the opaque value field
    pub value_width: usize,
    /// Byte between key and value
    pub separator: u8,
    /// Byte ending each record
    pub terminator: u8,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            key_width: DEFAULT_KEY_WIDTH,
            value_width: DEFAULT_VALUE_WIDTH,
            separator: FIELD_SEPARATOR,
            terminator: LINE_TERMINATOR,
        }
    }
}

impl RecordLayout {
    /// Create a layout with the default separator and terminator
    pub fn new(key_width: usize, value_width: usize) -> Self {
        Self {
            key_width,
            value_width,
            ..Self::default()
        }
    }

    /// Bytes per stored record, terminator included
    pub fn record_width(&self) -> usize {
        self.key_width + 1 + self.value_width + 1
    }

    /// Bytes per joined record, terminator excluded
    pub fn joined_width(&self) -> usize {
        self.key_width + 1 + self.value_width + 1 + self.value_width
    }

    /// Offset of the separator following the key
    pub fn separator_offset(&self) -> usize {
        self.key_width
    }

    /// Byte range of the value field within a record
    pub fn value_range(&self) -> Range<usize> {
        let start = self.key_width + 1;
        start..start + self.value_width
    }

    /// Exclusive upper bound of keys representable in `key_width` digits
    pub fn key_limit(&self) -> Key {
        (0..self.key_width).fold(1, |acc: Key, _| acc.saturating_mul(10))
    }

    /// Check the widths are usable
    pub fn validate(&self) -> Result<()> {
        if self.key_width == 0 || self.key_width > MAX_KEY_WIDTH {
            return Err(JoinError::Config(format!(
                "key width must be between 1 and {}, got {}",
                MAX_KEY_WIDTH, self.key_width
            )));
        }
        if self.value_width == 0 {
            return Err(JoinError::Config(
                "value width must be at least 1".to_string(),
            ));
        }
        if self.separator.is_ascii_digit() || self.separator == self.terminator {
            return Err(JoinError::Config(format!(
                "separator {:?} must differ from digits and the terminator",
                self.separator as char
            )));
        }
        Ok(())
    }
}
