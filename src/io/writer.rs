//! Record writer
//!
//! Buffered writer of fixed-width records and joined rows.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{JoinError, Result};

/// Writes whole records, appending the line terminator where needed
///
/// Every write failure is reported as `OutputUnwritable` for the writer's path.
pub struct RecordWriter<W: Write> {
    inner: W,
    terminator: u8,
    /// Destination reported in errors
    path: PathBuf,
    /// Number of records written
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, terminator: u8, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            terminator,
            path: path.into(),
            written: 0,
        }
    }

    /// Write a stored record that already ends with its terminator
    pub fn write_record(&mut self, record: &[u8]) -> Result<()> {
        self.inner.write_all(record).map_err(|e| self.failed(e))?;
        self.written += 1;
        Ok(())
    }

    /// Write a joined row followed by the terminator
    pub fn write_line(&mut self, row: &[u8]) -> Result<()> {
        self.inner
            .write_all(row)
            .and_then(|_| self.inner.write_all(&[self.terminator]))
            .map_err(|e| self.failed(e))?;
        self.written += 1;
        Ok(())
    }

    /// Write a run of stored records in one call
    pub fn write_block(&mut self, block: &[u8], records: usize) -> Result<()> {
        self.inner.write_all(block).map_err(|e| self.failed(e))?;
        self.written += records as u64;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| self.failed(e))
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    fn failed(&self, source: io::Error) -> JoinError {
        JoinError::output(&self.path, source)
    }
}
