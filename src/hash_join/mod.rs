//! Hash Join Module
//!
//! In-memory equi-join for tables whose build side fits in RAM.
//!
//! ## Responsibilities
//! - Build: stream table A into a key → values multimap
//! - Probe: stream table B and emit one row per stored value under its key
//!
//! ## Cost
//! Time O(|A| + |B| * average fan-out), memory O(|A|).
//!
//! Lines are split at the field separator rather than at fixed offsets, so
//! the hash join also accepts tables whose values are not padded.

mod table;

pub use table::BuildTable;

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{JoinError, Result};
use crate::io;
use crate::record::RecordLayout;

/// Counters for one hash join run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashJoinStats {
    /// Lines read from the build side
    pub build_rows: u64,
    /// Lines read from the probe side
    pub probe_rows: u64,
    /// Joined rows written
    pub rows_emitted: u64,
}

/// Hash join engine
pub struct HashJoin {
    table: BuildTable,
    separator: char,
    terminator: u8,
}

impl HashJoin {
    pub fn new(layout: &RecordLayout) -> Self {
        Self {
            table: BuildTable::new(),
            separator: layout.separator as char,
            terminator: layout.terminator,
        }
    }

    /// The build-side multimap
    pub fn table(&self) -> &BuildTable {
        &self.table
    }

    // =========================================================================
    // Build Phase
    // =========================================================================

    /// Add one build-side line
    pub fn build_line(&mut self, line: &str, line_no: u64) -> Result<()> {
        let (key, value) = self.split(line, "build table", line_no)?;
        self.table.insert(key, value);
        Ok(())
    }

    /// Load the build side from a reader, returning the line count
    pub fn build<R: BufRead>(&mut self, reader: R) -> Result<u64> {
        let mut rows = 0;
        for line in reader.lines() {
            rows += 1;
            self.build_line(&line?, rows)?;
        }
        Ok(rows)
    }

    /// Load the build side from a table file
    pub fn build_from_file(&mut self, path: &Path) -> Result<u64> {
        let mut rows = 0;
        io::read_from(path, |line| {
            rows += 1;
            self.build_line(line, rows)?;
            Ok(true)
        })?;

        tracing::debug!(
            "Built hash table from {}: {} keys, {} values",
            path.display(),
            self.table.key_count(),
            self.table.value_count()
        );
        Ok(rows)
    }

    // =========================================================================
    // Probe Phase
    // =========================================================================

    /// Emit every joined row for one probe-side line, returning the row count
    pub fn probe_line<W: Write>(&self, line: &str, line_no: u64, out: &mut W) -> Result<u64> {
        let (key, value_b) = self.split(line, "probe table", line_no)?;

        let matches = self.table.get(key);
        for value_a in matches {
            write!(out, "{key}{sep}{value_a}{sep}{value_b}", sep = self.separator)?;
            out.write_all(&[self.terminator])?;
        }
        Ok(matches.len() as u64)
    }

    /// Stream the probe side from a reader into `out`
    pub fn probe<R: BufRead, W: Write>(&self, reader: R, out: &mut W) -> Result<HashJoinStats> {
        let mut stats = HashJoinStats::default();
        for line in reader.lines() {
            stats.probe_rows += 1;
            stats.rows_emitted += self.probe_line(&line?, stats.probe_rows, out)?;
        }
        out.flush()?;
        Ok(stats)
    }

    /// Join two table files into `output`
    pub fn join_files(
        layout: &RecordLayout,
        path_a: &Path,
        path_b: &Path,
        output: &Path,
    ) -> Result<HashJoinStats> {
        let mut join = HashJoin::new(layout);
        let build_rows = join.build_from_file(path_a)?;

        let mut stats = HashJoinStats {
            build_rows,
            ..HashJoinStats::default()
        };
        io::read_from_write_to(path_b, output, |line, writer| {
            stats.probe_rows += 1;
            stats.rows_emitted += join
                .probe_line(line, stats.probe_rows, writer)
                .map_err(|e| match e {
                    JoinError::Io(source) => JoinError::output(output, source),
                    other => other,
                })?;
            Ok(true)
        })?;

        tracing::info!(
            "Hash join of {} and {} wrote {} rows to {}",
            path_a.display(),
            path_b.display(),
            stats.rows_emitted,
            output.display()
        );
        Ok(stats)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Split a line into its key and value fields
    fn split<'l>(&self, line: &'l str, side: &str, line_no: u64) -> Result<(&'l str, &'l str)> {
        let (key, rest) = line.split_once(self.separator).ok_or_else(|| {
            JoinError::malformed(format!("{} line {}", side, line_no), "missing separator")
        })?;
        let value = rest.split(self.separator).next().unwrap_or(rest);

        if key.is_empty() || value.is_empty() {
            return Err(JoinError::malformed(
                format!("{} line {}", side, line_no),
                "empty key or value field",
            ));
        }
        Ok((key, value))
    }
}
