//! Temporary segments
//!
//! Naming, reading and lifecycle of the sorted temporary files produced by
//! one external sort run.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{JoinError, Result};
use crate::io::{open_input, RecordCursor};
use crate::record::{Key, RecordLayout};

// =============================================================================
// Naming
// =============================================================================

/// Parsed temporary segment file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentName {
    /// Sequence number within its level, starting at 1
    pub index: usize,
    /// Merge level, `None` for initial segmentation output
    pub level: Option<usize>,
}

/// Path of initial segment `index`: `<table>.<index>.tmp`
pub fn segment_path(table: &Path, index: usize) -> PathBuf {
    suffixed(table, &format!(".{}.tmp", index))
}

/// Path of merge output `index` at `level`: `<table>.<index>.tmp.<level>`
pub fn merge_segment_path(table: &Path, index: usize, level: usize) -> PathBuf {
    suffixed(table, &format!(".{}.tmp.{}", index, level))
}

/// Parse a temporary segment name belonging to `table`
///
/// "input_A.csv.3.tmp" → index 3, no level
/// "input_A.csv.2.tmp.4" → index 2, level 4
pub fn parse_segment_name(table: &Path, candidate: &Path) -> Option<SegmentName> {
    let table_name = table.file_name()?.to_str()?;
    let name = candidate.file_name()?.to_str()?;

    let rest = name.strip_prefix(table_name)?.strip_prefix('.')?;
    let (index, rest) = rest.split_once(".tmp")?;
    let index = parse_number(index)?;

    let level = match rest {
        "" => None,
        level => Some(parse_number(level.strip_prefix('.')?)?),
    };

    Some(SegmentName { index, level })
}

fn parse_number(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn suffixed(table: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(table.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

// =============================================================================
// Registry
// =============================================================================

/// Tracks every temporary file of one sort run
///
/// Files still registered when the registry is dropped are removed, so a run
/// that fails part way leaves nothing behind.
#[derive(Debug)]
pub struct SegmentRegistry {
    table: PathBuf,
    /// Registered files not yet removed
    live: Vec<PathBuf>,
}

impl SegmentRegistry {
    pub fn new(table: &Path) -> Self {
        Self {
            table: table.to_path_buf(),
            live: Vec::new(),
        }
    }

    /// Record a temporary file about to be created
    pub fn register(&mut self, path: PathBuf) {
        self.live.push(path);
    }

    /// Delete one temporary file and forget it
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        remove_if_exists(path)?;
        self.live.retain(|p| p != path);
        tracing::trace!("Removed temporary segment {}", path.display());
        Ok(())
    }

    /// Delete every temporary file of this table, returning how many were removed
    ///
    /// Besides registered files this sweeps the table's directory for any
    /// segment name of the table, whatever its level.
    pub fn cleanup(&mut self) -> Result<usize> {
        let mut removed = 0;

        for path in std::mem::take(&mut self.live) {
            if remove_if_exists(&path)? {
                tracing::debug!("Cleaning temporary file {}", path.display());
                removed += 1;
            }
        }

        let dir = match self.table.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let entries = fs::read_dir(&dir).map_err(|e| JoinError::input(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| JoinError::input(&dir, e))?.path();
            if path.is_file() && parse_segment_name(&self.table, &path).is_some() {
                if remove_if_exists(&path)? {
                    tracing::debug!("Cleaning stale temporary file {}", path.display());
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

impl Drop for SegmentRegistry {
    fn drop(&mut self) {
        for path in &self.live {
            if let Err(e) = remove_if_exists(path) {
                tracing::warn!("Failed to remove temporary file {}: {}", path.display(), e);
            }
        }
    }
}

/// Remove a file, treating "already gone" as success
fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(JoinError::output(path, e)),
    }
}

// =============================================================================
// Sorted Run Reader
// =============================================================================

/// Read cursor over a sorted segment, holding its current record
pub struct SortedRun {
    path: PathBuf,
    cursor: RecordCursor<File>,
    layout: RecordLayout,
    current: Vec<u8>,
    /// Key of `current`, `None` once the run is exhausted
    key: Option<Key>,
}

impl SortedRun {
    /// Open a segment and load its first record
    pub fn open(path: &Path, layout: RecordLayout) -> Result<Self> {
        let file = open_input(path)?;
        let cursor = RecordCursor::new(file, layout.record_width(), path);

        let mut run = Self {
            path: path.to_path_buf(),
            cursor,
            layout,
            current: vec![0u8; layout.record_width()],
            key: None,
        };
        run.advance()?;
        Ok(run)
    }

    /// Move to the next record
    pub fn advance(&mut self) -> Result<()> {
        if !self.cursor.read_record(&mut self.current)? {
            self.key = None;
            return Ok(());
        }

        match self.layout.extract_key(&self.current) {
            Some(key) => {
                self.key = Some(key);
                Ok(())
            }
            None => Err(JoinError::malformed(
                self.path.display().to_string(),
                format!("invalid key in record {}", self.cursor.records_read()),
            )),
        }
    }

    /// Key of the current record, `None` when exhausted
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    /// Bytes of the current record
    pub fn current(&self) -> &[u8] {
        &self.current
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the reader, returning the segment path
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
