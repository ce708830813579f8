//! Sort Module
//!
//! External merge sort for tables larger than the memory budget.
//!
//! ## Responsibilities
//! - Cut a table into buffer-sized chunks and quicksort each in memory
//! - Persist sorted chunks as temporary segments next to the table
//! - Merge segments pairwise, level by level, until one remains
//! - Copy the result over the table and delete every temporary file
//!
//! ## Temporary Files
//! ```text
//! input_A.csv.1.tmp       segmentation output #1
//! input_A.csv.2.tmp       segmentation output #2
//! input_A.csv.1.tmp.1     level 1 merge of #1 and #2
//! ...
//! ```
//! With N segments the merge phase runs ceil(log2(N)) levels.

mod quicksort;
mod segment;
mod sorter;

pub use quicksort::quicksort;
pub use segment::{
    merge_segment_path, parse_segment_name, segment_path, SegmentName, SegmentRegistry,
    SortedRun,
};
pub use sorter::{merge_pair, ExternalSorter, SortStats};
