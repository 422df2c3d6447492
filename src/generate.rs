//! Generate synthetic gene files for benchmarking the tree.
//!
//! Two layouts:
//! - random starts, which build a reasonably shallow tree, and
//! - sorted starts, which build the degenerate right-spine chain and show
//!   the linear worst case of the unbalanced tree.
//!
//! Output is reproducible for a given seed.

use crate::bed::{write_records, GeneError};
use crate::interval::{keys, GeneRecord};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

const CHROMOSOMES: [&str; 24] = [
    "Chr1", "Chr2", "Chr3", "Chr4", "Chr5", "Chr6", "Chr7", "Chr8", "Chr9", "Chr10", "Chr11",
    "Chr12", "Chr13", "Chr14", "Chr15", "Chr16", "Chr17", "Chr18", "Chr19", "Chr20", "Chr21",
    "Chr22", "ChrX", "ChrY",
];

const GENE_TYPES: [&str; 6] = [
    "Protein Coding",
    "miRNA",
    "lncRNA",
    "Regulatory",
    "Pseudogene",
    "snoRNA",
];

/// Generator settings.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub count: usize,
    pub seed: u64,
    /// Starts are drawn from `[0, max_position)`.
    pub max_position: i64,
    /// Interval lengths are drawn from `[1, max_length]`.
    pub max_length: i64,
    /// Emit records in increasing start order (worst case for the tree).
    pub sorted_starts: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            seed: 42,
            max_position: 10_000_000,
            max_length: 5_000,
            sorted_starts: false,
        }
    }
}

impl GenerateConfig {
    /// Check that every generated end fits in an `i64`.
    pub fn validate(&self) -> Result<(), GeneError> {
        if self.max_position < 1 {
            return Err(GeneError::Config(format!(
                "max position must be at least 1, got {}",
                self.max_position
            )));
        }
        if self.max_length < 1 {
            return Err(GeneError::Config(format!(
                "max length must be at least 1, got {}",
                self.max_length
            )));
        }
        // Largest end is (max_position - 1) + max_length
        if (self.max_position - 1).checked_add(self.max_length).is_none() {
            return Err(GeneError::Config(format!(
                "max position ({}) plus max length ({}) exceeds the coordinate range",
                self.max_position, self.max_length
            )));
        }
        Ok(())
    }
}

/// Generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateCommand {
    pub config: GenerateConfig,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Build the records in memory.
    pub fn records(&self) -> Result<Vec<GeneRecord>, GeneError> {
        let cfg = &self.config;
        cfg.validate()?;
        let mut rng = SmallRng::seed_from_u64(cfg.seed);
        let (max_position, max_length) = (cfg.max_position, cfg.max_length);

        let mut records: Vec<GeneRecord> = (0..cfg.count)
            .map(|i| {
                let start = rng.gen_range(0..max_position);
                let end = start + rng.gen_range(1..=max_length);
                let chrom = CHROMOSOMES[rng.gen_range(0..CHROMOSOMES.len())];
                let gene_type = GENE_TYPES[rng.gen_range(0..GENE_TYPES.len())];
                GeneRecord::new(start, end, format!("GENE{}", i + 1))
                    .with_attr(keys::CHROMOSOME, chrom)
                    .with_attr(keys::TYPE, gene_type)
            })
            .collect();

        if cfg.sorted_starts {
            records.sort();
        }
        Ok(records)
    }

    /// Write the generated records to `path`.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<usize, GeneError> {
        let started = Instant::now();
        let records = self.records()?;

        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writeln!(
            writer,
            "# generated: count={} seed={} sorted_starts={}",
            self.config.count, self.config.seed, self.config.sorted_starts
        )?;
        write_records(&mut writer, &records)?;
        writer.flush()?;

        info!(
            "Generated {} genes into {} in {:.2?}",
            records.len(),
            path.as_ref().display(),
            started.elapsed()
        );
        Ok(records.len())
    }
}
