use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assembly::segment::PhysicalMap;
use crate::core::types::LibraryId;
use crate::utils::validation::{count_to_f64, length_to_f64};

/// Per-segment summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub index: usize,
    pub clones: usize,
    pub sequenced: usize,
    pub span: u64,
    /// Summed member clone lengths (the segment's redundant coverage)
    pub clone_length: u64,
}

/// Placement counts for one library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub placed: usize,
    pub unplaced: usize,
}

/// Sequenced versus fingerprint-only clones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedStats {
    /// Sequenced clones placed on a segment
    pub placed: usize,
    /// Sequenced clones left unplaced
    pub unplaced: usize,
    /// Placed clones whose position comes from fingerprints only
    pub placed_only: usize,
    /// Summed length of placed sequenced clones
    pub placed_length: u64,
}

/// Summary statistics over a physical map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub segment_count: usize,
    pub placed_clones: usize,
    pub unplaced_clones: usize,
    pub input_clones: usize,

    /// Sum of segment spans
    pub total_span: u64,

    /// Mean fragment-derived length of placed clones; `None` without placed clones
    pub average_clone_length: Option<f64>,

    /// Unplaced clones over input clones; `None` for an empty input
    pub unplaced_fraction: Option<f64>,

    pub per_segment: Vec<SegmentStats>,
    pub per_library: BTreeMap<LibraryId, LibraryStats>,
    pub sequenced: SequencedStats,
}

impl CoverageStats {
    /// Fraction of a region of `region_length` bp covered by segments.
    ///
    /// Returns `None` for a zero-length region.
    #[must_use]
    pub fn coverage_of(&self, region_length: u64) -> Option<f64> {
        if region_length == 0 {
            return None;
        }
        Some(length_to_f64(self.total_span) / length_to_f64(region_length))
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.input_clones > 0
    }
}

/// Compute coverage statistics for an assembled map
#[must_use]
pub fn analyze_coverage(map: &PhysicalMap) -> CoverageStats {
    let mut per_library: BTreeMap<LibraryId, LibraryStats> = BTreeMap::new();
    let mut sequenced = SequencedStats::default();

    let per_segment: Vec<SegmentStats> = map
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| SegmentStats {
            index,
            clones: segment.len(),
            sequenced: segment.clones.iter().filter(|c| c.sequenced).count(),
            span: segment.span,
            clone_length: segment.total_clone_length(),
        })
        .collect();

    let mut placed_length = 0u64;
    for clone in map.placed_clones() {
        per_library.entry(clone.library.clone()).or_default().placed += 1;
        placed_length = placed_length.saturating_add(clone.length);
        if clone.sequenced {
            sequenced.placed += 1;
            sequenced.placed_length = sequenced.placed_length.saturating_add(clone.length);
        } else {
            sequenced.placed_only += 1;
        }
    }
    for clone in &map.unplaced {
        per_library
            .entry(clone.library.clone())
            .or_default()
            .unplaced += 1;
        if clone.sequenced {
            sequenced.unplaced += 1;
        }
    }

    let placed_clones = map.placed_count();
    let unplaced_clones = map.unplaced.len();
    let input_clones = placed_clones + unplaced_clones;

    let average_clone_length =
        (placed_clones > 0).then(|| length_to_f64(placed_length) / count_to_f64(placed_clones));
    let unplaced_fraction =
        (input_clones > 0).then(|| count_to_f64(unplaced_clones) / count_to_f64(input_clones));

    CoverageStats {
        segment_count: map.segments.len(),
        placed_clones,
        unplaced_clones,
        input_clones,
        total_span: per_segment
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.span)),
        average_clone_length,
        unplaced_fraction,
        per_segment,
        per_library,
        sequenced,
    }
}
