//! Command-line interface for bac-mapper.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **pairs**: Find overlapping clone pairs from digest fingerprints
//! - **assemble**: Build a physical map from the overlaps
//! - **coverage**: Summarize the coverage of the assembled map
//!
//! ## Usage
//!
//! ```text
//! # Overlaps among clones of one library
//! bac-mapper pairs clones.tsv
//!
//! # Relative sizing tolerance, stricter overlap calls
//! bac-mapper pairs clones.tsv --tolerance-fraction 0.02 --min-matches 5
//!
//! # Map across libraries digested with the same enzyme
//! bac-mapper assemble clones.tsv --libraries libraries.tsv --cross-library --enzyme HindIII
//!
//! # JSON output for scripting
//! bac-mapper coverage clones.tsv --format json --region-length 2000000
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::MappingConfig;
use crate::core::clone::BacClone;
use crate::core::library::{narrow_down_libraries, only_single_cutters, LibraryCatalog};
use crate::matching::matcher::Tolerance;
use crate::parsing;

pub mod assemble;
pub mod coverage;
pub mod pairs;

#[derive(Parser)]
#[command(name = "bac-mapper")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Build physical maps of BAC clones from restriction digest fingerprints")]
#[command(
    long_about = "bac-mapper infers which BAC clones overlap from their restriction fragment lengths and orders them into map segments (contigs).\n\nIt provides:\n- Tolerance-based fingerprint matching\n- Conflict-aware, deterministic map assembly\n- Coverage statistics per segment and library"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find overlapping clone pairs
    Pairs(pairs::PairsArgs),

    /// Assemble clones into a physical map
    Assemble(assemble::AssembleArgs),

    /// Report coverage statistics of the assembled map
    Coverage(coverage::CoverageArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Inputs and matching options shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Clone table (TSV or CSV, optionally gzipped)
    #[arg(required = true)]
    pub clones: PathBuf,

    /// Library table with digest conventions
    #[arg(long)]
    pub libraries: Option<PathBuf>,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Absolute sizing tolerance in base pairs
    #[arg(long, conflicts_with = "tolerance_fraction")]
    pub tolerance_bp: Option<u64>,

    /// Relative sizing tolerance (e.g. 0.02 for 2%)
    #[arg(long)]
    pub tolerance_fraction: Option<f64>,

    /// Corresponding fragments needed to report a pair
    #[arg(long)]
    pub min_matches: Option<usize>,

    /// Matched fraction needed to confirm an overlap
    #[arg(long)]
    pub min_fraction: Option<f64>,

    /// Reject pairs whose sized fragment counts differ by more than this
    #[arg(long)]
    pub max_count_diff: Option<usize>,

    /// Compare clones from different libraries
    #[arg(long)]
    pub cross_library: bool,

    /// Keep only clones from libraries digested with this enzyme (needs --libraries)
    #[arg(long, requires = "libraries")]
    pub enzyme: Option<String>,

    /// Drop fragments of clones from libraries that are not single-cutter digests
    #[arg(long, requires = "libraries")]
    pub single_cutters_only: bool,

    /// Run the pairwise scan on a single thread
    #[arg(long)]
    pub sequential: bool,
}

/// Clones, library metadata and configuration ready for a run
pub struct Inputs {
    pub clones: Vec<BacClone>,
    pub libraries: LibraryCatalog,
    pub config: MappingConfig,
}

impl InputArgs {
    /// Read the input tables and merge configuration with flag overrides
    ///
    /// # Errors
    ///
    /// Returns an error if a table or the configuration cannot be read, or the
    /// resulting configuration is out of range.
    pub fn load(&self) -> anyhow::Result<Inputs> {
        let mut config = match &self.config {
            Some(path) => MappingConfig::load_from_file(path)
                .with_context(|| format!("Loading config {}", path.display()))?,
            None => MappingConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;

        let libraries = match &self.libraries {
            Some(path) => parsing::libraries::parse_library_file(path)
                .with_context(|| format!("Reading library table {}", path.display()))?,
            None => LibraryCatalog::new(),
        };

        let mut clones = parsing::clones::parse_clone_file(&self.clones)
            .with_context(|| format!("Reading clone table {}", self.clones.display()))?;
        if let Some(enzyme) = &self.enzyme {
            clones = narrow_down_libraries(&clones, &libraries, enzyme);
        }
        if self.single_cutters_only {
            clones = only_single_cutters(&clones, &libraries);
        }

        info!(
            "Loaded {} clones from {} ({} libraries described)",
            clones.len(),
            self.clones.display(),
            libraries.len()
        );

        Ok(Inputs {
            clones,
            libraries,
            config,
        })
    }

    fn apply_overrides(&self, config: &mut MappingConfig) {
        let pairing = &mut config.pairing;
        if let Some(bp) = self.tolerance_bp {
            pairing.tolerance = Tolerance::Absolute(bp);
        }
        if let Some(fraction) = self.tolerance_fraction {
            pairing.tolerance = Tolerance::Relative(fraction);
        }
        if let Some(count) = self.min_matches {
            pairing.min_match_count = count;
        }
        if let Some(fraction) = self.min_fraction {
            pairing.min_match_fraction = fraction;
        }
        if let Some(diff) = self.max_count_diff {
            pairing.max_fragment_count_difference = Some(diff);
        }
        if self.cross_library {
            pairing.allow_cross_library = true;
        }
        if self.sequential {
            pairing.parallel = false;
        }
    }
}

/// RFC 3339 timestamp stamped on JSON output
pub(crate) fn created_at() -> String {
    chrono::Utc::now().to_rfc3339()
}
