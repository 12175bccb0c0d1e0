//! Core data types for fingerprint-based physical mapping.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Fragment`](fragment::Fragment), [`FragmentSet`](fragment::FragmentSet): a clone's restriction digest
//! - [`BacClone`](clone::BacClone): a clone with its library, fingerprint and placement
//! - [`LibraryCatalog`](library::LibraryCatalog): digest conventions per library
//! - [`CloneId`](types::CloneId), [`LibraryId`](types::LibraryId), [`RelationClass`](types::RelationClass)
//! - [`MappingError`](error::MappingError): the error taxonomy of the mapping core
//!
//! ## Fragment lengths
//!
//! Fragment lengths are measured in base pairs. Bands that were visible on the
//! gel but could not be sized are kept as unsized fragments: they count towards
//! the clone's band total but never serve as matching evidence.

pub mod clone;
pub mod error;
pub mod fragment;
pub mod library;
pub mod types;
