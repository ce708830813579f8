//! Merge Join Module
//!
//! Streaming equi-join of two tables already sorted by key.
//!
//! ## Algorithm
//! Each side holds a current record. Unequal keys advance the smaller side.
//! On equal keys the pair is emitted, then duplicates are fanned out:
//!
//! ```text
//!   A: a1 a2 a3        B: b1 b2
//!      ^                  ^        emit a1·b1
//!   save B, scan B:  a1·b2         (stop at first other key)
//!   save A, scan A:  a2·b1 a3·b1
//!   restore both, advance each by one → (a2, b2)
//! ```
//!
//! Advancing both sides after the fan-out walks a duplicate group along its
//! diagonal, so every pair of the group is emitted once while both sides stay
//! inside the group.
//!
//! Cursors rewind relative to their read position. A duplicate group that
//! fits in the read buffer is replayed without touching the file, and a
//! group of any length can still be scanned ahead and replayed.

use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::error::{JoinError, Result};
use crate::io::{create_output, open_input, RecordCursor, RecordWriter};
use crate::record::{Key, RecordLayout};

/// Counters for one merge join run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeJoinStats {
    /// Joined rows written
    pub rows_emitted: u64,
    /// Equal-key steps of the main loop
    pub matches: u64,
}

/// Merge join engine
pub struct MergeJoin {
    layout: RecordLayout,
}

impl MergeJoin {
    pub fn new(layout: RecordLayout) -> Self {
        Self { layout }
    }

    /// Join two sorted table files into `output`
    pub fn join_files(&self, path_a: &Path, path_b: &Path, output: &Path) -> Result<MergeJoinStats> {
        let a = open_input(path_a)?;
        let b = open_input(path_b)?;
        let out = BufWriter::new(create_output(output)?);

        let stats = self.join_sources(a, b, out, [path_a, path_b, output])?;

        tracing::info!(
            "Merge join of {} and {} wrote {} rows to {}",
            path_a.display(),
            path_b.display(),
            stats.rows_emitted,
            output.display()
        );
        Ok(stats)
    }

    /// Join two sorted record streams into `out`
    pub fn join<RA, RB, W>(&self, a: RA, b: RB, out: W) -> Result<MergeJoinStats>
    where
        RA: Read + Seek,
        RB: Read + Seek,
        W: Write,
    {
        let labels = [Path::new("table A"), Path::new("table B"), Path::new("output")];
        self.join_sources(a, b, out, labels)
    }

    /// Join with `[a, b, out]` labels used to attribute errors
    fn join_sources<RA, RB, W>(
        &self,
        a: RA,
        b: RB,
        out: W,
        [path_a, path_b, output]: [&Path; 3],
    ) -> Result<MergeJoinStats>
    where
        RA: Read + Seek,
        RB: Read + Seek,
        W: Write,
    {
        let mut side_a = JoinSide::new(a, self.layout, path_a);
        let mut side_b = JoinSide::new(b, self.layout, path_b);
        let mut writer = RecordWriter::new(out, self.layout.terminator, output);
        let mut row = vec![0u8; self.layout.joined_width()];
        let mut stats = MergeJoinStats::default();

        side_a.advance()?;
        side_b.advance()?;

        while let (Some(key_a), Some(key_b)) = (side_a.key, side_b.key) {
            if key_a < key_b {
                side_a.advance()?;
                continue;
            }
            if key_a > key_b {
                side_b.advance()?;
                continue;
            }

            let key = key_a;
            stats.matches += 1;
            self.emit(&mut writer, &mut row, key, &side_a.current, &side_b.current)?;

            // Fan out B duplicates against the current A record
            let saved_b = side_b.cursor.save();
            while side_b.read_lookahead()? == Some(key) {
                self.emit(&mut writer, &mut row, key, &side_a.current, &side_b.lookahead)?;
            }

            // Fan out A duplicates against the current B record
            let saved_a = side_a.cursor.save();
            while side_a.read_lookahead()? == Some(key) {
                self.emit(&mut writer, &mut row, key, &side_a.lookahead, &side_b.current)?;
            }

            side_a.cursor.restore(saved_a)?;
            side_a.advance()?;
            side_b.cursor.restore(saved_b)?;
            side_b.advance()?;
        }

        stats.rows_emitted = writer.written();
        writer.finish()?;
        Ok(stats)
    }

    fn emit<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
        row: &mut [u8],
        key: Key,
        record_a: &[u8],
        record_b: &[u8],
    ) -> Result<()> {
        self.layout.build_joined_record(key, record_a, record_b, row);
        writer.write_line(row)
    }
}

/// One input of the merge join: cursor plus current and lookahead records
struct JoinSide<R> {
    cursor: RecordCursor<R>,
    layout: RecordLayout,
    current: Vec<u8>,
    /// Key of `current`, `None` once exhausted
    key: Option<Key>,
    lookahead: Vec<u8>,
}

impl<R: Read + Seek> JoinSide<R> {
    fn new(inner: R, layout: RecordLayout, path: &Path) -> Self {
        let width = layout.record_width();
        Self {
            cursor: RecordCursor::new(inner, width, path),
            layout,
            current: vec![0u8; width],
            key: None,
            lookahead: vec![0u8; width],
        }
    }

    /// Replace the current record with the next one
    fn advance(&mut self) -> Result<()> {
        self.key = if self.cursor.read_record(&mut self.current)? {
            Some(self.checked_key(&self.current)?)
        } else {
            None
        };
        Ok(())
    }

    /// Read the next record into the lookahead buffer, returning its key
    fn read_lookahead(&mut self) -> Result<Option<Key>> {
        if self.cursor.read_record(&mut self.lookahead)? {
            Ok(Some(self.checked_key(&self.lookahead)?))
        } else {
            Ok(None)
        }
    }

    fn checked_key(&self, record: &[u8]) -> Result<Key> {
        self.layout.extract_key(record).ok_or_else(|| {
            JoinError::malformed(
                self.cursor.path().display().to_string(),
                format!(
                    "invalid key in record {}: {:?}",
                    self.cursor.records_read(),
                    String::from_utf8_lossy(record)
                ),
            )
        })
    }
}
