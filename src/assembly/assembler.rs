use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use disjoint_sets::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assembly::segment::{
    MapSegment, PhysicalMap, PlacedClone, RelationDiagnostic, UnplacedClone, UnplacedReason,
};
use crate::core::clone::BacClone;
use crate::core::error::MappingError;
use crate::core::types::{CloneId, RelationClass};
use crate::matching::pairs::{OverlapEvidence, OverlapRelation};

/// Default allowed disagreement, in base pairs, between a placement and an offset hint
pub const DEFAULT_OFFSET_SLACK: u64 = 1_000;

/// Configuration for map assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// How far an already-placed pair may sit from its offset hint
    pub offset_slack: u64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            offset_slack: DEFAULT_OFFSET_SLACK,
        }
    }
}

/// Why a confirmed relation was kept out of the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    /// Merging would put a rejected pair into one segment
    RejectedPairInSegment { clone_a: CloneId, clone_b: CloneId },

    /// Both clones already share a segment at positions the evidence disagrees with
    InconsistentPlacement { hinted: Option<i64>, placed: i64 },

    /// One of the clones has no usable fingerprint
    UnusableClone { clone: CloneId },
}

/// Outcome of offering one relation to the assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeDecision {
    /// Two segments were joined; the second clone's segment moved by `shift` bp
    Merged { shift: i64 },

    /// Both clones already share a segment consistently with the evidence
    Redundant,

    /// Confirmed relation excluded and downgraded to ambiguous
    Downgraded { reason: ConflictReason },

    /// Relation not eligible for assembly because of its class
    Rejected { class: RelationClass },
}

impl MergeDecision {
    #[must_use]
    pub fn contributes(&self) -> bool {
        matches!(self, Self::Merged { .. } | Self::Redundant)
    }
}

/// Evolving segment partition during assembly
struct Layout<'c> {
    clones: Vec<&'c BacClone>,
    usable: Vec<bool>,
    partition: UnionFind<usize>,
    /// Start of each clone relative to its segment's frame
    offsets: Vec<i64>,
    /// Members of each segment, keyed by the segment's root
    members: HashMap<usize, Vec<usize>>,
    /// Rejected pairs as clone indices, in canonical relation order
    rejected: Vec<(usize, usize)>,
}

impl<'c> Layout<'c> {
    fn new(clones: Vec<&'c BacClone>) -> Self {
        let usable = clones
            .iter()
            .map(|c| c.fragments.validate(&c.id).is_ok())
            .collect();
        let members = (0..clones.len()).map(|i| (i, vec![i])).collect();
        Self {
            usable,
            partition: UnionFind::new(clones.len()),
            offsets: vec![0; clones.len()],
            members,
            rejected: Vec::new(),
            clones,
        }
    }

    fn length(&self, index: usize) -> i64 {
        i64::try_from(self.clones[index].length()).unwrap_or(i64::MAX)
    }

    /// Where `b` should start relative to `a`, kept within the overlap range
    fn desired_offset(&self, a: usize, b: usize, evidence: &OverlapEvidence) -> i64 {
        let (len_a, len_b) = (self.length(a), self.length(b));
        match evidence.offset_hint {
            Some(hint) => hint.clamp(-len_b, len_a),
            None => {
                let shared = i64::try_from(evidence.shared_length)
                    .unwrap_or(i64::MAX)
                    .min(len_a)
                    .min(len_b);
                len_a - shared
            }
        }
    }

    /// Decide what to do with a relation between clones `a` and `b`
    fn decide_merge(
        &self,
        a: usize,
        b: usize,
        evidence: &OverlapEvidence,
        class: RelationClass,
        config: &AssemblyConfig,
    ) -> MergeDecision {
        if class != RelationClass::Confirmed {
            return MergeDecision::Rejected { class };
        }
        for &index in &[a, b] {
            if !self.usable[index] {
                return MergeDecision::Downgraded {
                    reason: ConflictReason::UnusableClone {
                        clone: self.clones[index].id.clone(),
                    },
                };
            }
        }

        let (root_a, root_b) = (self.partition.find(a), self.partition.find(b));
        if root_a == root_b {
            let placed = self.offsets[b].saturating_sub(self.offsets[a]);
            let consistent = match evidence.offset_hint {
                Some(hint) => placed.abs_diff(hint) <= config.offset_slack,
                None => placed <= self.length(a) && -placed <= self.length(b),
            };
            return if consistent {
                MergeDecision::Redundant
            } else {
                MergeDecision::Downgraded {
                    reason: ConflictReason::InconsistentPlacement {
                        hinted: evidence.offset_hint,
                        placed,
                    },
                }
            };
        }

        let blocking = self.rejected.iter().find(|&&(x, y)| {
            let (root_x, root_y) = (self.partition.find(x), self.partition.find(y));
            (root_x == root_a && root_y == root_b) || (root_x == root_b && root_y == root_a)
        });
        if let Some(&(x, y)) = blocking {
            return MergeDecision::Downgraded {
                reason: ConflictReason::RejectedPairInSegment {
                    clone_a: self.clones[x].id.clone(),
                    clone_b: self.clones[y].id.clone(),
                },
            };
        }

        let shift = self.offsets[a]
            .saturating_add(self.desired_offset(a, b, evidence))
            .saturating_sub(self.offsets[b]);
        MergeDecision::Merged { shift }
    }

    /// Move `b`'s segment by `shift` and join it with `a`'s
    fn merge(&mut self, a: usize, b: usize, shift: i64) {
        let (root_a, root_b) = (self.partition.find(a), self.partition.find(b));
        let moved = self.members.remove(&root_b).unwrap_or_default();
        for &m in &moved {
            self.offsets[m] = self.offsets[m].saturating_add(shift);
        }
        let mut joined = self.members.remove(&root_a).unwrap_or_default();
        joined.extend(moved);

        self.partition.union(root_a, root_b);
        self.members.insert(self.partition.find(a), joined);
    }

    fn into_map(self, diagnostics: Vec<RelationDiagnostic>) -> PhysicalMap {
        let mut segments = Vec::new();
        let mut unplaced = Vec::new();

        for group in self.members.values() {
            if group.len() > 1 {
                let members = group
                    .iter()
                    .map(|&i| {
                        let clone = self.clones[i];
                        let placed = PlacedClone {
                            id: clone.id.clone(),
                            library: clone.library.clone(),
                            start: 0,
                            length: clone.length(),
                            sequenced: clone.sequenced,
                        };
                        (self.offsets[i], placed)
                    })
                    .collect();
                segments.push(MapSegment::from_offsets(members));
                continue;
            }

            for &i in group {
                let clone = self.clones[i];
                let reason = match clone.fragments.validate(&clone.id) {
                    Err(MappingError::InvalidFragmentData { reason, .. }) => {
                        UnplacedReason::InvalidFragmentData { reason }
                    }
                    _ => UnplacedReason::NoConfirmedOverlap,
                };
                unplaced.push(UnplacedClone {
                    id: clone.id.clone(),
                    library: clone.library.clone(),
                    length: clone.length(),
                    sequenced: clone.sequenced,
                    reason,
                });
            }
        }

        segments.sort_by(|x, y| {
            y.len()
                .cmp(&x.len())
                .then_with(|| first_id(x).cmp(&first_id(y)))
        });
        unplaced.sort_by(|x, y| x.id.cmp(&y.id));

        PhysicalMap {
            segments,
            unplaced,
            diagnostics,
        }
    }
}

fn first_id(segment: &MapSegment) -> Option<&CloneId> {
    segment.clones.iter().map(|c| &c.id).min()
}

/// Order in which relations are offered: strongest evidence first
fn by_strength(x: &OverlapRelation, y: &OverlapRelation) -> Ordering {
    y.evidence
        .matched
        .cmp(&x.evidence.matched)
        .then_with(|| y.evidence.fraction.total_cmp(&x.evidence.fraction))
        .then_with(|| x.key().cmp(&y.key()))
}

/// Canonicalize relations and keep one per clone pair.
///
/// For duplicated pairs a rejection wins over other classes, then the
/// stronger evidence.
fn canonical_relations(relations: &[OverlapRelation]) -> Vec<OverlapRelation> {
    let mut canonical: Vec<OverlapRelation> = relations
        .iter()
        .filter_map(|r| {
            let relation =
                OverlapRelation::new(r.clone_a.clone(), r.clone_b.clone(), r.evidence, r.class);
            if relation.is_none() {
                warn!("Ignoring self-relation on '{}'", r.clone_a);
            }
            relation
        })
        .collect();

    canonical.sort_by(|x, y| {
        x.key()
            .cmp(&y.key())
            .then_with(|| Reverse(x.class).cmp(&Reverse(y.class)))
            .then_with(|| by_strength(x, y))
            .then_with(|| x.evidence.shared_length.cmp(&y.evidence.shared_length))
            .then_with(|| x.evidence.offset_hint.cmp(&y.evidence.offset_hint))
    });
    canonical.dedup_by(|later, first| {
        let duplicate = later.key() == first.key();
        if duplicate {
            debug!(
                "Dropping duplicate relation {}-{}",
                later.clone_a, later.clone_b
            );
        }
        duplicate
    });
    canonical
}

/// Builds a physical map from overlap relations
#[derive(Debug, Clone, Default)]
pub struct MapAssembler {
    config: AssemblyConfig,
}

impl MapAssembler {
    #[must_use]
    pub fn new(config: AssemblyConfig) -> Self {
        Self { config }
    }

    /// Merge confirmed overlaps, strongest first, into ordered segments.
    ///
    /// Relations that would enclose a rejected pair or contradict existing
    /// placements are downgraded to ambiguous and reported in the map's
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::UnknownCloneReference` if a relation names a
    /// clone missing from `clones`.
    pub fn assemble(
        &self,
        clones: &[BacClone],
        relations: &[OverlapRelation],
    ) -> Result<PhysicalMap, MappingError> {
        let mut index: HashMap<&CloneId, usize> = HashMap::with_capacity(clones.len());
        let mut kept: Vec<&BacClone> = Vec::with_capacity(clones.len());
        for clone in clones {
            if index.contains_key(&clone.id) {
                warn!("Duplicate clone '{}' ignored", clone.id);
                continue;
            }
            index.insert(&clone.id, kept.len());
            kept.push(clone);
        }

        let lookup = |id: &CloneId| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| MappingError::UnknownCloneReference(id.clone()))
        };
        for relation in relations {
            lookup(&relation.clone_a)?;
            lookup(&relation.clone_b)?;
        }

        let relations = canonical_relations(relations);
        let mut layout = Layout::new(kept);
        let mut diagnostics = Vec::new();
        let mut confirmed = Vec::new();

        for relation in relations {
            let (a, b) = (lookup(&relation.clone_a)?, lookup(&relation.clone_b)?);
            match relation.class {
                RelationClass::Confirmed => confirmed.push(relation),
                class => {
                    if class == RelationClass::Rejected {
                        layout.rejected.push((a, b));
                    }
                    diagnostics.push(RelationDiagnostic {
                        relation,
                        decision: MergeDecision::Rejected { class },
                    });
                }
            }
        }
        confirmed.sort_by(by_strength);

        let mut merges = 0usize;
        for mut relation in confirmed {
            let (a, b) = (lookup(&relation.clone_a)?, lookup(&relation.clone_b)?);
            let decision =
                layout.decide_merge(a, b, &relation.evidence, relation.class, &self.config);
            match decision {
                MergeDecision::Merged { shift } => {
                    layout.merge(a, b, shift);
                    merges += 1;
                }
                MergeDecision::Redundant => {}
                MergeDecision::Downgraded { ref reason } => {
                    debug!(
                        "Downgrading {}-{}: {:?}",
                        relation.clone_a, relation.clone_b, reason
                    );
                    relation.class = RelationClass::Ambiguous;
                    diagnostics.push(RelationDiagnostic { relation, decision });
                }
                MergeDecision::Rejected { .. } => {
                    diagnostics.push(RelationDiagnostic { relation, decision });
                }
            }
        }

        let map = layout.into_map(diagnostics);
        info!(
            "Assembled {} segments from {} merges: {} clones placed, {} unplaced, {} relations excluded",
            map.segments.len(),
            merges,
            map.placed_count(),
            map.unplaced.len(),
            map.diagnostics.len()
        );
        Ok(map)
    }
}

/// Assemble a physical map with the given configuration
///
/// # Errors
///
/// Returns `MappingError::UnknownCloneReference` if a relation names a clone
/// missing from `clones`.
pub fn assemble_map(
    clones: &[BacClone],
    relations: &[OverlapRelation],
    config: &AssemblyConfig,
) -> Result<PhysicalMap, MappingError> {
    MapAssembler::new(config.clone()).assemble(clones, relations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clone(name: &str, length: u64) -> BacClone {
        BacClone::new(name, "L", vec![length])
    }

    fn relation(a: &str, b: &str, matched: usize, class: RelationClass) -> OverlapRelation {
        OverlapRelation::new(a, b, OverlapEvidence::with_matched(matched), class).unwrap()
    }

    fn members(segment: &MapSegment) -> Vec<&str> {
        let mut ids: Vec<&str> = segment.clones.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_chain_of_overlaps_forms_one_segment() {
        let clones = vec![clone("A", 1_000), clone("B", 1_000), clone("C", 1_000)];
        let relations = vec![
            OverlapRelation::new(
                "A",
                "B",
                OverlapEvidence::with_matched(4).with_offset_hint(400),
                RelationClass::Confirmed,
            )
            .unwrap(),
            OverlapRelation::new(
                "B",
                "C",
                OverlapEvidence::with_matched(4).with_offset_hint(300),
                RelationClass::Confirmed,
            )
            .unwrap(),
        ];

        let map = assemble_map(&clones, &relations, &AssemblyConfig::default()).unwrap();
        assert_eq!(map.segments.len(), 1);
        let starts: Vec<(&str, u64)> = map.segments[0]
            .clones
            .iter()
            .map(|c| (c.id.as_str(), c.start))
            .collect();
        assert_eq!(starts, vec![("A", 0), ("B", 400), ("C", 700)]);
        assert_eq!(map.segments[0].span, 1_700);
        assert!(map.unplaced.is_empty());
        assert!(map.diagnostics.is_empty());
    }

    #[test]
    fn test_rejected_pair_blocks_merge() {
        let clones = vec![clone("A", 1_000), clone("B", 1_000), clone("C", 1_000)];
        let relations = vec![
            relation("A", "B", 5, RelationClass::Confirmed),
            relation("B", "C", 4, RelationClass::Confirmed),
            relation("A", "C", 3, RelationClass::Rejected),
        ];

        let map = assemble_map(&clones, &relations, &AssemblyConfig::default()).unwrap();
        assert_eq!(map.segments.len(), 1);
        assert_eq!(members(&map.segments[0]), vec!["A", "B"]);
        assert_eq!(map.unplaced.len(), 1);
        assert_eq!(map.unplaced[0].id.as_str(), "C");

        let downgraded: Vec<&RelationDiagnostic> = map
            .diagnostics
            .iter()
            .filter(|d| matches!(d.decision, MergeDecision::Downgraded { .. }))
            .collect();
        assert_eq!(downgraded.len(), 1);
        assert_eq!(downgraded[0].relation.key(), (&"B".into(), &"C".into()));
        assert_eq!(downgraded[0].relation.class, RelationClass::Ambiguous);
        assert_eq!(
            downgraded[0].decision,
            MergeDecision::Downgraded {
                reason: ConflictReason::RejectedPairInSegment {
                    clone_a: "A".into(),
                    clone_b: "C".into(),
                }
            }
        );
    }

    #[test]
    fn test_inconsistent_cycle_is_downgraded() {
        let clones = vec![clone("A", 1_000), clone("B", 1_000), clone("C", 1_000)];
        let hinted = |a: &str, b: &str, matched: usize, offset: i64| {
            OverlapRelation::new(
                a,
                b,
                OverlapEvidence::with_matched(matched).with_offset_hint(offset),
                RelationClass::Confirmed,
            )
            .unwrap()
        };
        let relations = vec![
            hinted("A", "B", 6, 200),
            hinted("B", "C", 5, 200),
            // Places C before A, contradicting A < B < C
            hinted("A", "C", 4, -500),
        ];

        let map = assemble_map(&clones, &relations, &AssemblyConfig { offset_slack: 50 }).unwrap();
        assert_eq!(map.segments.len(), 1);
        assert_eq!(map.diagnostics.len(), 1);
        assert_eq!(
            map.diagnostics[0].decision,
            MergeDecision::Downgraded {
                reason: ConflictReason::InconsistentPlacement {
                    hinted: Some(-500),
                    placed: 400,
                }
            }
        );
    }

    #[test]
    fn test_unknown_clone_is_fatal() {
        let clones = vec![clone("A", 1_000)];
        let relations = vec![relation("A", "Z", 4, RelationClass::Confirmed)];
        let err = assemble_map(&clones, &relations, &AssemblyConfig::default()).unwrap_err();
        assert_eq!(err, MappingError::UnknownCloneReference("Z".into()));
    }

    #[test]
    fn test_ambiguous_relations_are_not_merged() {
        let clones = vec![clone("A", 1_000), clone("B", 1_000)];
        let relations = vec![relation("A", "B", 4, RelationClass::Ambiguous)];
        let map = assemble_map(&clones, &relations, &AssemblyConfig::default()).unwrap();
        assert!(map.segments.is_empty());
        assert_eq!(map.unplaced.len(), 2);
        assert_eq!(
            map.diagnostics[0].decision,
            MergeDecision::Rejected {
                class: RelationClass::Ambiguous
            }
        );
    }

    #[test]
    fn test_empty_fingerprint_is_unplaced() {
        let clones = vec![BacClone::new("E", "L", Vec::<u64>::new())];
        let map = assemble_map(&clones, &[], &AssemblyConfig::default()).unwrap();
        assert!(map.segments.is_empty());
        assert!(matches!(
            map.unplaced[0].reason,
            UnplacedReason::InvalidFragmentData { .. }
        ));
    }

    #[test]
    fn test_relation_to_unusable_clone_is_downgraded() {
        let clones = vec![
            clone("A", 1_000),
            BacClone::new("E", "L", Vec::<u64>::new()),
        ];
        let relations = vec![relation("A", "E", 5, RelationClass::Confirmed)];

        let map = assemble_map(&clones, &relations, &AssemblyConfig::default()).unwrap();

        assert!(map.segments.is_empty());
        assert_eq!(map.diagnostics.len(), 1);
        let diagnostic = &map.diagnostics[0];
        assert_eq!(diagnostic.relation.class, RelationClass::Ambiguous);
        assert_eq!(
            diagnostic.decision,
            MergeDecision::Downgraded {
                reason: ConflictReason::UnusableClone {
                    clone: CloneId::new("E")
                }
            }
        );

        let unplaced: Vec<&str> = map.unplaced.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(unplaced, vec!["A", "E"]);
        assert_eq!(map.unplaced[0].reason, UnplacedReason::NoConfirmedOverlap);
        assert!(matches!(
            map.unplaced[1].reason,
            UnplacedReason::InvalidFragmentData { .. }
        ));
    }

    #[test]
    fn test_duplicate_relations_prefer_rejection() {
        let relations = vec![
            relation("A", "B", 9, RelationClass::Confirmed),
            relation("B", "A", 3, RelationClass::Rejected),
        ];
        let canonical = canonical_relations(&relations);
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0].class, RelationClass::Rejected);
    }
}
