//! Coverage statistics over an assembled physical map.
//!
//! [`analyze_coverage`](stats::analyze_coverage) is a pure function of a
//! [`PhysicalMap`](crate::assembly::segment::PhysicalMap). It reports:
//!
//! - placed clone counts per segment and overall
//! - total span covered (segments do not overlap by construction)
//! - average fragment-derived clone length
//! - placed/unplaced counts per library
//! - sequenced versus fingerprint-only clones
//!
//! Ratios over an empty map are `None` rather than an error.

pub mod stats;

pub use stats::{analyze_coverage, CoverageStats};
