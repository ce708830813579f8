//! Table generator
//!
//! Writes random fixed-width tables for testing and benchmarking.

use std::io::BufWriter;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{JoinError, Result};
use crate::io::{create_output, RecordWriter};
use crate::record::{Key, RecordLayout};

/// Characters a generated value is drawn from
pub const VALUE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Every value position `i` with `i % GROUP_WIDTH == GROUP_WIDTH - 1` holds a dash
const GROUP_WIDTH: usize = 5;

/// Random table generator
pub struct TableGenerator {
    layout: RecordLayout,
    rng: StdRng,
}

impl TableGenerator {
    /// Generator seeded from system entropy
    pub fn new(layout: RecordLayout) -> Self {
        Self {
            layout,
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed, for reproducible tables
    pub fn with_seed(layout: RecordLayout, seed: u64) -> Self {
        Self {
            layout,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Write `row_count` records with keys drawn from `[0, key_interval)`
    pub fn generate(&mut self, path: &Path, row_count: u64, key_interval: Key) -> Result<()> {
        self.layout.validate()?;
        if key_interval == 0 || key_interval > self.layout.key_limit() {
            return Err(JoinError::Config(format!(
                "key interval must be between 1 and {}, got {}",
                self.layout.key_limit(),
                key_interval
            )));
        }

        let mut writer = RecordWriter::new(
            BufWriter::new(create_output(path)?),
            self.layout.terminator,
            path,
        );
        let mut record = vec![0u8; self.layout.record_width()];

        for _ in 0..row_count {
            let key = self.rng.gen_range(0..key_interval);
            self.fill_record(key, &mut record);
            writer.write_record(&record)?;
        }
        writer.finish()?;

        tracing::info!("Successfully wrote {} rows to {}", row_count, path.display());
        Ok(())
    }

    /// Encode one random record for `key` into `record`
    fn fill_record(&mut self, key: Key, record: &mut [u8]) {
        self.layout.encode_key(key, record);
        record[self.layout.separator_offset()] = self.layout.separator;

        let values = self.layout.value_range();
        for (i, slot) in record[values.clone()].iter_mut().enumerate() {
            *slot = if i % GROUP_WIDTH == GROUP_WIDTH - 1 {
                b'-'
            } else {
                VALUE_ALPHABET[self.rng.gen_range(0..VALUE_ALPHABET.len())]
            };
        }
        record[values.end] = self.layout.terminator;
    }
}
