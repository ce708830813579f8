//! Engine Module
//!
//! Top-level driver that runs a join with the requested strategy.
//!
//! ## Strategies
//! - `InMemory`: hash join, table A held in memory
//! - `OnDisk`: external sort of both tables (in place), then merge join

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::hash_join::HashJoin;
use crate::merge_join::MergeJoin;
use crate::sort::{ExternalSorter, SortStats};

/// Join strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Hash join; the build side must fit in memory
    InMemory,
    /// Sort-merge join; both inputs are sorted in place first
    OnDisk,
}

/// Summary of a completed join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinReport {
    pub strategy: Strategy,
    /// Joined rows written to the output
    pub rows_emitted: u64,
    /// Sort of table A (on-disk strategy only)
    pub sort_a: Option<SortStats>,
    /// Sort of table B (on-disk strategy only)
    pub sort_b: Option<SortStats>,
}

/// Runs joins with one configuration
pub struct Joiner {
    config: Config,
}

impl Joiner {
    /// Create a joiner, rejecting invalid configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Join `path_a` with `path_b` into `output`
    pub fn join(
        &self,
        strategy: Strategy,
        path_a: &Path,
        path_b: &Path,
        output: &Path,
    ) -> Result<JoinReport> {
        match strategy {
            Strategy::InMemory => self.hash_join(path_a, path_b, output),
            Strategy::OnDisk => self.sort_merge_join(path_a, path_b, output),
        }
    }

    /// Hash join
    pub fn hash_join(&self, path_a: &Path, path_b: &Path, output: &Path) -> Result<JoinReport> {
        let stats = HashJoin::join_files(&self.config.layout, path_a, path_b, output)?;

        Ok(JoinReport {
            strategy: Strategy::InMemory,
            rows_emitted: stats.rows_emitted,
            sort_a: None,
            sort_b: None,
        })
    }

    /// Sort both tables in place, then merge join them
    ///
    /// Both input files are rewritten in key order as a side effect.
    pub fn sort_merge_join(&self, path_a: &Path, path_b: &Path, output: &Path) -> Result<JoinReport> {
        let mut sorter = ExternalSorter::new(&self.config)?;
        let sort_a = sorter.sort_file(path_a)?;
        let sort_b = sorter.sort_file(path_b)?;
        drop(sorter);

        let stats = MergeJoin::new(self.config.layout).join_files(path_a, path_b, output)?;

        Ok(JoinReport {
            strategy: Strategy::OnDisk,
            rows_emitted: stats.rows_emitted,
            sort_a: Some(sort_a),
            sort_b: Some(sort_b),
        })
    }
}
