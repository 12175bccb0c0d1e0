use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::assembly::assembler::MergeDecision;
use crate::core::clone::{BacClone, Placement};
use crate::core::types::{CloneId, LibraryId};
use crate::matching::pairs::OverlapRelation;

/// A clone with its position inside a map segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedClone {
    pub id: CloneId,
    pub library: LibraryId,

    /// Offset in base pairs from the segment's leftmost clone
    pub start: u64,

    /// Fragment-derived length
    pub length: u64,

    pub sequenced: bool,
}

impl PlacedClone {
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }
}

/// An ordered run of overlapping clones (a contig)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSegment {
    /// Clones sorted by offset, then name
    pub clones: Vec<PlacedClone>,

    /// Distance from the leftmost start to the rightmost end
    pub span: u64,

    /// Libraries that contributed clones
    pub libraries: BTreeSet<LibraryId>,
}

impl MapSegment {
    /// Build a segment from clones placed at signed offsets.
    ///
    /// Offsets are shifted so the leftmost clone starts at zero.
    #[must_use]
    pub fn from_offsets(members: Vec<(i64, PlacedClone)>) -> Self {
        let origin = members.iter().map(|(offset, _)| *offset).min().unwrap_or(0);
        let mut clones: Vec<PlacedClone> = members
            .into_iter()
            .map(|(offset, mut clone)| {
                clone.start = offset.abs_diff(origin);
                clone
            })
            .collect();
        clones.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        let span = clones.iter().map(PlacedClone::end).max().unwrap_or(0);
        let libraries = clones.iter().map(|c| c.library.clone()).collect();

        Self {
            clones,
            span,
            libraries,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &CloneId) -> bool {
        self.clones.iter().any(|c| &c.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &CloneId) -> Option<&PlacedClone> {
        self.clones.iter().find(|c| &c.id == id)
    }

    /// Sum of member clone lengths; never less than the span
    #[must_use]
    pub fn total_clone_length(&self) -> u64 {
        self.clones
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.length))
    }
}

/// Why a clone did not make it onto any segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnplacedReason {
    /// No confirmed overlap joined the clone to another clone
    NoConfirmedOverlap,
    /// The clone's fingerprint cannot be compared
    InvalidFragmentData { reason: String },
}

/// A clone left off the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedClone {
    pub id: CloneId,
    pub library: LibraryId,
    pub length: u64,
    pub sequenced: bool,
    pub reason: UnplacedReason,
}

/// A relation that did not contribute to the map, with the decision that kept it out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDiagnostic {
    /// The relation with its final classification
    pub relation: OverlapRelation,
    pub decision: MergeDecision,
}

/// All segments of one mapping run, plus what could not be placed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMap {
    /// Segments, largest first
    pub segments: Vec<MapSegment>,

    /// Clones without a segment, sorted by name
    pub unplaced: Vec<UnplacedClone>,

    /// Excluded and downgraded relations
    pub diagnostics: Vec<RelationDiagnostic>,
}

impl PhysicalMap {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of clones placed on segments
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.segments.iter().map(MapSegment::len).sum()
    }

    /// Number of clones the map was built from
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.placed_count() + self.unplaced.len()
    }

    pub fn placed_clones(&self) -> impl Iterator<Item = &PlacedClone> {
        self.segments.iter().flat_map(|s| s.clones.iter())
    }

    /// Placed clones whose full sequence is known
    pub fn sequenced_clones(&self) -> impl Iterator<Item = &PlacedClone> {
        self.placed_clones().filter(|c| c.sequenced)
    }

    /// Placed clones positioned from fingerprints alone
    pub fn placed_only_clones(&self) -> impl Iterator<Item = &PlacedClone> {
        self.placed_clones().filter(|c| !c.sequenced)
    }

    #[must_use]
    pub fn placement_of(&self, id: &CloneId) -> Option<Placement> {
        self.segments
            .iter()
            .enumerate()
            .find_map(|(index, segment)| {
                segment.get(id).map(|c| Placement {
                    segment: index,
                    start: c.start,
                    end: c.end(),
                })
            })
    }

    /// Record each clone's placement (or clear it when unplaced)
    pub fn apply_placements(&self, clones: &mut [BacClone]) {
        for clone in clones {
            clone.placement = self.placement_of(&clone.id);
        }
    }
}
