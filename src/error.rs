//! Error types for diskjoin
//!
//! Provides a unified error type for all join, sort and generator operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using JoinError
pub type Result<T> = std::result::Result<T, JoinError>;

/// Unified error type for diskjoin operations
#[derive(Debug, Error)]
pub enum JoinError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File {} not found", path.display())]
    InputNotFound { path: PathBuf },

    #[error("File {} can not be opened for reading: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File {} can not be opened for writing: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Memory Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory allocating {bytes} byte sort buffer")]
    OutOfMemory { bytes: usize },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Malformed record in {context}: {reason}")]
    MalformedRecord { context: String, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl JoinError {
    /// Classify a failure to open or read an input table
    pub fn input(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            JoinError::InputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            JoinError::InputUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Wrap a failure to create or write an output file
    pub fn output(path: &Path, source: io::Error) -> Self {
        JoinError::OutputUnwritable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Build a malformed-record error
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        JoinError::MalformedRecord {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
