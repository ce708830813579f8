//! External sorter
//!
//! Sorts a table larger than memory in three phases:
//! 1. Segmentation: fill the buffer, quicksort it, write a segment
//! 2. Merge levels: merge adjacent segment pairs until one remains
//! 3. Finalize: rename the last segment over the table, remove temporaries

use std::fs;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{JoinError, Result};
use crate::io::{create_output, open_input, RecordWriter};
use crate::record::{RecordLayout, RecordSlice};

use super::quicksort::quicksort;
use super::segment::{merge_segment_path, segment_path, SegmentRegistry, SortedRun};

/// Counters for one sort run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Records in the table
    pub records: u64,
    /// Segments written by the segmentation phase
    pub segments: usize,
    /// Merge levels performed
    pub merge_levels: usize,
}

/// Sorts table files in place with a bounded buffer
///
/// The buffer is allocated once and reused by every `sort_file` call.
pub struct ExternalSorter {
    layout: RecordLayout,
    buffer: Vec<u8>,
}

impl ExternalSorter {
    /// Create a sorter and allocate its buffer
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let bytes = config.sort_buffer_bytes();
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(bytes)
            .map_err(|_| JoinError::OutOfMemory { bytes })?;
        buffer.resize(bytes, 0);

        Ok(Self {
            layout: config.layout,
            buffer,
        })
    }

    /// Sort `table` in place by key
    pub fn sort_file(&mut self, table: &Path) -> Result<SortStats> {
        let mut registry = SegmentRegistry::new(table);
        let mut stats = SortStats::default();

        // Phase 1: sorted segments
        let segments = self.segment(table, &mut registry, &mut stats)?;
        stats.segments = segments.len();

        // Phase 2: pairwise merge levels
        let mut runs = segments
            .iter()
            .map(|path| SortedRun::open(path, self.layout))
            .collect::<Result<Vec<_>>>()?;

        while runs.len() > 1 {
            stats.merge_levels += 1;
            runs = self.merge_level(table, runs, stats.merge_levels, &mut registry)?;
        }

        // Phase 3: replace the table and clean up
        if let Some(last) = runs.pop() {
            let last = last.into_path();
            replace_table(&last, table)?;
            registry.remove(&last)?;
        }
        let removed = registry.cleanup()?;

        tracing::info!(
            "Sorted {}: {} records, {} segments, {} merge levels, {} temporary files removed",
            table.display(),
            stats.records,
            stats.segments,
            stats.merge_levels,
            removed
        );
        Ok(stats)
    }

    // =========================================================================
    // Phase 1: Segmentation
    // =========================================================================

    /// Split `table` into sorted segments of at most one buffer each
    fn segment(
        &mut self,
        table: &Path,
        registry: &mut SegmentRegistry,
        stats: &mut SortStats,
    ) -> Result<Vec<PathBuf>> {
        let mut reader = open_input(table)?;
        let mut segments = Vec::new();

        loop {
            let filled = fill(&mut reader, &mut self.buffer).map_err(|e| JoinError::input(table, e))?;
            if filled == 0 {
                break;
            }

            let chunk = segments.len() + 1;
            let mut records = RecordSlice::new(&mut self.buffer[..filled], self.layout)
                .map_err(|e| in_chunk(e, table, chunk))?;
            quicksort(&mut records);
            let count = records.len();

            let path = segment_path(table, chunk);
            registry.register(path.clone());

            let mut writer = RecordWriter::new(
                BufWriter::new(create_output(&path)?),
                self.layout.terminator,
                &path,
            );
            writer.write_block(&self.buffer[..filled], count)?;
            writer.finish()?;

            tracing::debug!("Wrote {} records to temporary segment {}", count, path.display());
            stats.records += count as u64;
            segments.push(path);

            if filled < self.buffer.len() {
                break;
            }
        }

        Ok(segments)
    }

    // =========================================================================
    // Phase 2: Merge Levels
    // =========================================================================

    /// Merge adjacent pairs of runs, carrying an unpaired last run over
    fn merge_level(
        &self,
        table: &Path,
        runs: Vec<SortedRun>,
        level: usize,
        registry: &mut SegmentRegistry,
    ) -> Result<Vec<SortedRun>> {
        let mut next = Vec::with_capacity(runs.len() / 2 + 1);
        let mut runs = runs.into_iter();
        let mut index = 0;

        while let Some(mut left) = runs.next() {
            let Some(mut right) = runs.next() else {
                next.push(left);
                break;
            };

            index += 1;
            let path = merge_segment_path(table, index, level);
            registry.register(path.clone());

            let mut writer = RecordWriter::new(
                BufWriter::new(create_output(&path)?),
                self.layout.terminator,
                &path,
            );
            merge_pair(&mut left, &mut right, &mut writer)?;
            let written = writer.written();
            writer.finish()?;

            registry.remove(&left.into_path())?;
            registry.remove(&right.into_path())?;

            tracing::debug!(
                "Merged {} records to segment {}, level = {}",
                written,
                path.display(),
                level
            );
            next.push(SortedRun::open(&path, self.layout)?);
        }

        Ok(next)
    }
}

/// Two-way merge; equal keys take the left run first
pub fn merge_pair<W: Write>(
    left: &mut SortedRun,
    right: &mut SortedRun,
    out: &mut RecordWriter<W>,
) -> Result<()> {
    loop {
        match (left.key(), right.key()) {
            (Some(a), Some(b)) if a <= b => {
                out.write_record(left.current())?;
                left.advance()?;
            }
            (Some(_), Some(_)) | (None, Some(_)) => {
                out.write_record(right.current())?;
                right.advance()?;
            }
            (Some(_), None) => {
                out.write_record(left.current())?;
                left.advance()?;
            }
            (None, None) => return Ok(()),
        }
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Read until `buf` is full or the input ends
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Move the fully written `segment` over `table`
///
/// Both live in the same directory, so the table is swapped in one step and
/// never holds a partial result.
fn replace_table(segment: &Path, table: &Path) -> Result<()> {
    fs::rename(segment, table).map_err(|e| JoinError::output(table, e))
}

/// Prefix a malformed-record context with the table and chunk
fn in_chunk(err: JoinError, table: &Path, chunk: usize) -> JoinError {
    match err {
        JoinError::MalformedRecord { context, reason } => JoinError::malformed(
            format!("{} chunk {} {}", table.display(), chunk, context),
            reason,
        ),
        other => other,
    }
}
