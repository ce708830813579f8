//! # diskjoin
//!
//! Equi-join of two fixed-width text tables with:
//! - In-memory hash join for tables that fit in RAM
//! - External merge sort with a bounded record buffer
//! - Streaming merge join with save/restore duplicate fan-out
//! - Random table generator for testing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Joiner (engine)                         │
//! │              Strategy::InMemory | Strategy::OnDisk           │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!         ┌─────────────┐               ┌──────────────┐
//!         │  HashJoin   │               │ExternalSorter│ (A, then B)
//!         │ (BuildTable)│               └──────┬───────┘
//!         └──────┬──────┘                      │
//!                │                             ▼
//!                │                      ┌──────────────┐
//!                │                      │  MergeJoin   │
//!                │                      └──────┬───────┘
//!                ▼                             ▼
//!         ┌─────────────────────────────────────────────┐
//!         │   record (layout, codec)  ·  io (cursor)    │
//!         └─────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod io;
pub mod hash_join;
pub mod sort;
pub mod merge_join;
pub mod generator;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{JoinError, Result};
pub use config::Config;
pub use engine::{JoinReport, Joiner, Strategy};
pub use record::{Key, RecordLayout};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of diskjoin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
