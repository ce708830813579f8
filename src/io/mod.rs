//! I/O Module
//!
//! File access shared by both join strategies.
//!
//! ## Responsibilities
//! - Line-oriented reading with a callback (hash join)
//! - Positional fixed-width record reading with save/restore (sort, merge join)
//! - Buffered fixed-width record writing

mod cursor;
mod lines;
mod writer;

pub use cursor::{RecordCursor, SavedPosition};
pub use lines::{read_from, read_from_write_to, LineStats};
pub use writer::RecordWriter;

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{JoinError, Result};

/// Open an input table, classifying the failure by kind
pub fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| JoinError::input(path, e))
}

/// Create or truncate an output file
pub fn create_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| JoinError::output(path, e))
}
