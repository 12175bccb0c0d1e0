//! Map assembly: turning pairwise overlaps into ordered map segments.
//!
//! - [`MapAssembler`](assembler::MapAssembler): incremental, score-ordered merging of confirmed overlaps
//! - [`MergeDecision`](assembler::MergeDecision): the tagged outcome of offering one relation
//! - [`PhysicalMap`](segment::PhysicalMap), [`MapSegment`](segment::MapSegment): the assembled result
//!
//! ## Algorithm
//!
//! Every clone starts as its own segment. Confirmed relations are offered in
//! descending order of match count (then matched fraction, then clone names).
//! A relation joins two segments unless a rejected pair would end up inside
//! the merged segment; a relation between clones that already share a segment
//! must agree with their placement. Relations that fail either check are
//! downgraded to ambiguous and reported, never fatal.
//!
//! Offsets come from the relation's offset hint when the digests allow one,
//! otherwise from the shared band length. Segments hold at least two clones;
//! single clones are reported as unplaced.

pub mod assembler;
pub mod segment;
