//! Line reader
//!
//! Reads a text file line by line and hands each line to a callback. The
//! callback returns `Ok(false)` to stop early; any error aborts the read.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{JoinError, Result};

use super::{create_output, open_input};

/// Outcome of a line-oriented pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Lines handed to the callback
    pub lines: u64,
    /// Whether the callback asked to stop before end of file
    pub stopped_early: bool,
}

/// Feed every line of `path` to `process`
pub fn read_from<F>(path: &Path, process: F) -> Result<LineStats>
where
    F: FnMut(&str) -> Result<bool>,
{
    let reader = BufReader::new(open_input(path)?);
    let stats = for_each_line(reader, path, process)?;

    tracing::debug!("Successfully read {} lines from {}", stats.lines, path.display());
    Ok(stats)
}

/// Feed every line of `src` to `process` together with a writer on `dst`
///
/// `dst` is created (or truncated) even when `src` is empty.
pub fn read_from_write_to<F>(src: &Path, dst: &Path, mut process: F) -> Result<LineStats>
where
    F: FnMut(&str, &mut BufWriter<std::fs::File>) -> Result<bool>,
{
    let reader = BufReader::new(open_input(src)?);
    let mut writer = BufWriter::new(create_output(dst)?);

    let stats = for_each_line(reader, src, |line| process(line, &mut writer))?;
    writer.flush().map_err(|e| JoinError::output(dst, e))?;

    tracing::debug!(
        "Successfully read {} lines from {} and wrote to {}",
        stats.lines,
        src.display(),
        dst.display()
    );
    Ok(stats)
}

/// Drive `process` over the lines of any buffered reader
fn for_each_line<R, F>(reader: R, path: &Path, mut process: F) -> Result<LineStats>
where
    R: BufRead,
    F: FnMut(&str) -> Result<bool>,
{
    let mut stats = LineStats::default();

    for line in reader.lines() {
        let line = line.map_err(|e| JoinError::input(path, e))?;
        stats.lines += 1;

        if !process(&line)? {
            stats.stopped_early = true;
            break;
        }
    }

    Ok(stats)
}
