//! Configuration for diskjoin
//!
//! Centralized configuration with sensible defaults. Every component takes
//! its settings from a `Config` at construction instead of global constants.

use crate::error::{JoinError, Result};
use crate::record::RecordLayout;

/// Default number of records held in memory by one sort run
pub const DEFAULT_SORT_BUFFER_RECORDS: usize = 131_072;

/// Main configuration for a join run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Fixed-width layout shared by both input tables
    pub layout: RecordLayout,

    // -------------------------------------------------------------------------
    // External Sort Configuration
    // -------------------------------------------------------------------------
    /// Memory budget of the external sorter, in records
    ///
    /// The sort buffer occupies `sort_buffer_records * layout.record_width()`
    /// bytes for the duration of a sort run.
    pub sort_buffer_records: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: RecordLayout::default(),
            sort_buffer_records: DEFAULT_SORT_BUFFER_RECORDS,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration describes a usable run
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if self.sort_buffer_records == 0 {
            return Err(JoinError::Config(
                "sort buffer must hold at least one record".to_string(),
            ));
        }

        if self
            .sort_buffer_records
            .checked_mul(self.layout.record_width())
            .is_none()
        {
            return Err(JoinError::Config(format!(
                "sort buffer of {} records overflows the address space",
                self.sort_buffer_records
            )));
        }

        Ok(())
    }

    /// Size of the sort buffer in bytes
    pub fn sort_buffer_bytes(&self) -> usize {
        self.sort_buffer_records * self.layout.record_width()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the record layout
    pub fn layout(mut self, layout: RecordLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set the sort memory budget (in records)
    pub fn sort_buffer_records(mut self, records: usize) -> Self {
        self.config.sort_buffer_records = records;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
