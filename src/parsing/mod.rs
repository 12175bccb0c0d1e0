//! Readers for clone and library tables.
//!
//! Storage of clone records belongs to whatever database or pipeline produced
//! them; these readers accept the plain tabular exports such systems write.
//!
//! - **Clone tables**: one clone per line
//! - **Library tables**: digest convention per library
//! - **Attribute columns**: `key=value;key=value` strings
//!
//! Files ending in `.csv` are comma-delimited, everything else tab-delimited.
//! A `.gz` suffix is decompressed transparently. Lines starting with `#` are
//! comments and a leading header line is skipped.
//!
//! ## Clone table columns
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | name | Clone name | Yes |
//! | library | Library identifier | Yes |
//! | fragments | Fragment lengths in digest order; `?` for unsized bands | Yes |
//! | sequenced | `yes`/`no` | No |
//! | attributes | `key=value;...` | No |
//!
//! ## Library table columns
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | library | Library identifier | Yes |
//! | enzyme | Restriction enzyme used for fingerprinting | Yes |
//! | single_cutter | `yes`/`no`, default `yes` | No |
//!
//! ## Example
//!
//! ```rust
//! use bac_mapper::parsing::clones::parse_clone_text;
//!
//! let clones = parse_clone_text("RP11-1A1\tRP11\t1200,3400,560\tno\n", '\t').unwrap();
//! assert_eq!(clones[0].fragments.len(), 3);
//! ```

pub mod attributes;
pub mod clones;
pub mod libraries;
