//! Record cursor
//!
//! Buffered sequential reader of fixed-width records that can save its
//! position and return to it later. A restore moves relative to the current
//! position, so rewinding within the read buffer costs no I/O, while a saved
//! position any number of records back is still reachable.

use std::io::{BufReader, ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use crate::error::{JoinError, Result};

/// Opaque position returned by `RecordCursor::save`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedPosition(u64);

/// Positional reader over fixed-width records
pub struct RecordCursor<R> {
    inner: BufReader<R>,
    /// Bytes per record
    width: usize,
    /// Byte offset of the next record to read
    position: u64,
    /// Source reported in errors
    path: PathBuf,
}

impl<R: Read + Seek> RecordCursor<R> {
    /// Wrap a reader positioned at the first record
    pub fn new(inner: R, width: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: BufReader::new(inner),
            width,
            position: 0,
            path: path.into(),
        }
    }

    /// Read the next record into `buf`
    ///
    /// Returns `Ok(false)` at a clean end of input. A record cut short by the
    /// end of input is a `MalformedRecord` error.
    pub fn read_record(&mut self, buf: &mut [u8]) -> Result<bool> {
        debug_assert_eq!(buf.len(), self.width);

        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(JoinError::input(&self.path, e)),
            }
        }

        if filled == 0 {
            return Ok(false);
        }
        if filled < buf.len() {
            return Err(JoinError::malformed(
                self.path.display().to_string(),
                format!(
                    "truncated record at byte {}: {} of {} bytes",
                    self.position,
                    filled,
                    self.width
                ),
            ));
        }

        self.position += self.width as u64;
        Ok(true)
    }

    /// Remember the current position
    pub fn save(&self) -> SavedPosition {
        SavedPosition(self.position)
    }

    /// Return to a previously saved position
    pub fn restore(&mut self, saved: SavedPosition) -> Result<()> {
        let offset = saved.0 as i64 - self.position as i64;
        self.inner
            .seek_relative(offset)
            .map_err(|e| JoinError::input(&self.path, e))?;
        self.position = saved.0;
        Ok(())
    }

    /// Number of whole records consumed so far
    pub fn records_read(&self) -> u64 {
        self.position / self.width as u64
    }

    /// Source reported in errors
    pub fn path(&self) -> &Path {
        &self.path
    }
}
