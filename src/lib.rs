//! # bac-mapper
//!
//! A library for building physical maps of BAC clones from restriction digest
//! fingerprints.
//!
//! Each clone is digested with a restriction enzyme and its fragments are sized
//! on a gel. Two clones that cover overlapping stretches of the genome share
//! fragments of (nearly) the same length. `bac-mapper` finds those shared
//! fragments, decides which clone pairs overlap, and lays the overlapping
//! clones out along map segments (contigs).
//!
//! ## Features
//!
//! - **Tolerance-based matching**: Absolute or relative sizing error per band
//! - **Evidence classes**: Pairs are confirmed, ambiguous or rejected
//! - **Conflict-aware assembly**: Strongest evidence first, contradictions are
//!   reported instead of silently merged
//! - **Coverage statistics**: Per segment, per library and for sequenced clones
//!
//! ## Example
//!
//! ```rust
//! use bac_mapper::{analyze_coverage, assemble_map, find_pairs};
//! use bac_mapper::{AssemblyConfig, BacClone, LibraryCatalog, PairConfig};
//!
//! let clones = vec![
//!     BacClone::new("A", "RP11", vec![1000, 2000, 3000, 4000]),
//!     BacClone::new("B", "RP11", vec![2000, 3000, 4000, 5000]),
//! ];
//!
//! let libraries = LibraryCatalog::new();
//! let pairs = find_pairs(&clones, &libraries, &PairConfig::default());
//! let map = assemble_map(&clones, &pairs.relations, &AssemblyConfig::default()).unwrap();
//!
//! assert_eq!(map.segments.len(), 1);
//! assert_eq!(analyze_coverage(&map).placed_clones, 2);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Clones, fragment sets, libraries and errors
//! - [`matching`]: Fragment matching and pairwise overlap relations
//! - [`assembly`]: Merging confirmed overlaps into map segments
//! - [`coverage`]: Summary statistics over an assembled map
//! - [`parsing`]: Readers for clone and library tables
//! - [`config`]: JSON configuration
//! - [`cli`]: Command-line interface implementation

pub mod assembly;
pub mod cli;
pub mod config;
pub mod core;
pub mod coverage;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use assembly::assembler::{assemble_map, AssemblyConfig, MapAssembler, MergeDecision};
pub use assembly::segment::{MapSegment, PhysicalMap};
pub use config::MappingConfig;
pub use core::clone::BacClone;
pub use core::error::MappingError;
pub use core::fragment::{Fragment, FragmentSet};
pub use core::library::{DigestConvention, LibraryCatalog};
pub use core::types::*;
pub use coverage::{analyze_coverage, CoverageStats};
pub use matching::matcher::{FragmentMatcher, MatchReport, Tolerance};
pub use matching::pairs::{
    find_pairs, OverlapEvidence, OverlapRelation, PairConfig, PairFinder, PairSet,
};
