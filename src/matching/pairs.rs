use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::clone::BacClone;
use crate::core::error::MappingError;
use crate::core::library::LibraryCatalog;
use crate::core::types::{CloneId, RelationClass};
use crate::matching::matcher::{FragmentMatcher, MatchReport, Tolerance};

/// Default minimum number of corresponding fragments to call an overlap
pub const DEFAULT_MIN_MATCH_COUNT: usize = 3;

/// Configuration for the pair finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    /// Sizing tolerance for fragment correspondence
    pub tolerance: Tolerance,

    /// Corresponding fragments needed before any relation is reported
    pub min_match_count: usize,

    /// Matched fraction (of the smaller fingerprint) needed to confirm an overlap
    pub min_match_fraction: f64,

    /// Largest allowed difference in sized fragment counts; pairs beyond it are rejected
    pub max_fragment_count_difference: Option<usize>,

    /// Compare clones from different libraries
    pub allow_cross_library: bool,

    /// Spread the pairwise scan over the rayon thread pool
    pub parallel: bool,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            min_match_count: DEFAULT_MIN_MATCH_COUNT,
            min_match_fraction: 0.0,
            max_fragment_count_difference: None,
            allow_cross_library: false,
            parallel: true,
        }
    }
}

/// Match evidence for an ordered pair of clones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapEvidence {
    /// Number of corresponding fragments
    pub matched: usize,

    /// Matched fragments over the smaller sized fragment count
    pub fraction: f64,

    /// Summed length of matched bands
    pub shared_length: u64,

    /// Where the second clone starts in the first clone's coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_hint: Option<i64>,
}

impl OverlapEvidence {
    /// Evidence with only a match count, e.g. for curated relations
    #[must_use]
    pub fn with_matched(matched: usize) -> Self {
        Self {
            matched,
            fraction: 1.0,
            shared_length: 0,
            offset_hint: None,
        }
    }

    #[must_use]
    pub fn with_offset_hint(mut self, offset: i64) -> Self {
        self.offset_hint = Some(offset);
        self
    }

    /// The same evidence seen from the other clone
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            offset_hint: self.offset_hint.map(|o| -o),
            ..self
        }
    }
}

impl From<&MatchReport> for OverlapEvidence {
    fn from(report: &MatchReport) -> Self {
        Self {
            matched: report.matched,
            fraction: report.fraction,
            shared_length: report.shared_length,
            offset_hint: report.offset_hint,
        }
    }
}

/// Overlap relation between two distinct clones.
///
/// Stored in one canonical direction: `clone_a < clone_b`, with the evidence
/// oriented from `clone_a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRelation {
    pub clone_a: CloneId,
    pub clone_b: CloneId,
    #[serde(flatten)]
    pub evidence: OverlapEvidence,
    pub class: RelationClass,
}

impl OverlapRelation {
    /// Relate `a` and `b` with evidence oriented from `a`.
    ///
    /// Returns `None` for a self-pair.
    pub fn new(
        a: impl Into<CloneId>,
        b: impl Into<CloneId>,
        evidence: OverlapEvidence,
        class: RelationClass,
    ) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return None;
        }
        let relation = if a < b {
            Self {
                clone_a: a,
                clone_b: b,
                evidence,
                class,
            }
        } else {
            Self {
                clone_a: b,
                clone_b: a,
                evidence: evidence.reversed(),
                class,
            }
        };
        Some(relation)
    }

    #[must_use]
    pub fn involves(&self, id: &CloneId) -> bool {
        &self.clone_a == id || &self.clone_b == id
    }

    /// Evidence oriented from `from`, if `from` is part of the relation
    #[must_use]
    pub fn evidence_from(&self, from: &CloneId) -> Option<OverlapEvidence> {
        if from == &self.clone_a {
            Some(self.evidence)
        } else if from == &self.clone_b {
            Some(self.evidence.reversed())
        } else {
            None
        }
    }

    #[must_use]
    pub fn key(&self) -> (&CloneId, &CloneId) {
        (&self.clone_a, &self.clone_b)
    }
}

/// Output of a pairwise scan: relations plus the errors met along the way
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairSet {
    /// Relations sorted by clone pair
    pub relations: Vec<OverlapRelation>,

    /// Invalid clones and incomparable pairs
    pub errors: Vec<MappingError>,
}

impl PairSet {
    #[must_use]
    pub fn count(&self, class: RelationClass) -> usize {
        self.relations.iter().filter(|r| r.class == class).count()
    }
}

/// Enumerate every unordered pair of distinct clone indices
#[must_use]
pub fn make_pairs(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect()
}

/// Classify a pair whose match count cleared the minimum
#[must_use]
pub fn classify(report: &MatchReport, config: &PairConfig) -> RelationClass {
    let count_difference = report.usable_a.abs_diff(report.usable_b);
    if config
        .max_fragment_count_difference
        .is_some_and(|max| count_difference > max)
    {
        RelationClass::Rejected
    } else if report.fraction < config.min_match_fraction {
        RelationClass::Ambiguous
    } else {
        RelationClass::Confirmed
    }
}

/// Scans a clone collection for overlapping pairs
pub struct PairFinder<'a> {
    libraries: &'a LibraryCatalog,
    config: PairConfig,
}

impl<'a> PairFinder<'a> {
    /// Create a pair finder with default configuration
    pub fn new(libraries: &'a LibraryCatalog) -> Self {
        Self {
            libraries,
            config: PairConfig::default(),
        }
    }

    pub fn with_config(libraries: &'a LibraryCatalog, config: PairConfig) -> Self {
        Self { libraries, config }
    }

    #[must_use]
    pub fn config(&self) -> &PairConfig {
        &self.config
    }

    /// Compare every pair of clones and keep those that share enough bands
    #[must_use]
    pub fn find_pairs(&self, clones: &[BacClone]) -> PairSet {
        let mut errors = Vec::new();
        let mut seen: HashSet<&CloneId> = HashSet::new();
        let mut valid: Vec<&BacClone> = Vec::with_capacity(clones.len());

        for clone in clones {
            if !seen.insert(&clone.id) {
                warn!("Duplicate clone '{}' ignored", clone.id);
                continue;
            }
            match clone.fragments.validate(&clone.id) {
                Ok(()) => valid.push(clone),
                Err(e) => {
                    debug!("{e}");
                    errors.push(e);
                }
            }
        }

        let candidates = make_pairs(valid.len());
        let outcomes: Vec<Result<Option<OverlapRelation>, MappingError>> = if self.config.parallel
        {
            candidates
                .par_iter()
                .map(|&(i, j)| self.evaluate(valid[i], valid[j]))
                .collect()
        } else {
            candidates
                .iter()
                .map(|&(i, j)| self.evaluate(valid[i], valid[j]))
                .collect()
        };

        let mut relations = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Some(relation)) => relations.push(relation),
                Ok(None) => {}
                Err(e) => {
                    debug!("Pair skipped: {e}");
                    errors.push(e);
                }
            }
        }
        relations.sort_by(|x, y| x.key().cmp(&y.key()));

        info!(
            "Compared {} candidate pairs across {} clones: {} relations, {} errors",
            candidates.len(),
            valid.len(),
            relations.len(),
            errors.len()
        );

        PairSet { relations, errors }
    }

    /// Compare a single pair
    ///
    /// # Errors
    ///
    /// Returns `MappingError::IncompatibleDigestConvention` for a cross-library
    /// pair that may not be compared, or `MappingError::InvalidFragmentData`
    /// if either fingerprint is unusable.
    pub fn evaluate(
        &self,
        a: &BacClone,
        b: &BacClone,
    ) -> Result<Option<OverlapRelation>, MappingError> {
        let comparable = self.config.allow_cross_library
            && self.libraries.comparable(&a.library, &b.library);
        if a.library != b.library && !comparable {
            return Err(MappingError::IncompatibleDigestConvention {
                clone_a: a.id.clone(),
                library_a: a.library.clone(),
                clone_b: b.id.clone(),
                library_b: b.library.clone(),
            });
        }

        let report = FragmentMatcher::new(self.config.tolerance).compare(a, b)?;
        if report.matched == 0 || report.matched < self.config.min_match_count {
            return Ok(None);
        }

        let class = classify(&report, &self.config);
        Ok(OverlapRelation::new(
            a.id.clone(),
            b.id.clone(),
            OverlapEvidence::from(&report),
            class,
        ))
    }
}

/// Find overlap relations among `clones` with the given configuration
#[must_use]
pub fn find_pairs(clones: &[BacClone], libraries: &LibraryCatalog, config: &PairConfig) -> PairSet {
    PairFinder::with_config(libraries, config.clone()).find_pairs(clones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::DigestConvention;

    fn config(min_match_count: usize) -> PairConfig {
        PairConfig {
            min_match_count,
            parallel: false,
            ..PairConfig::default()
        }
    }

    #[test]
    fn test_make_pairs() {
        assert_eq!(make_pairs(0), vec![]);
        assert_eq!(make_pairs(1), vec![]);
        assert_eq!(make_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_relation_is_canonical() {
        let evidence = OverlapEvidence::with_matched(4).with_offset_hint(250);
        let forward =
            OverlapRelation::new("A", "B", evidence, RelationClass::Confirmed).unwrap();
        let backward =
            OverlapRelation::new("B", "A", evidence.reversed(), RelationClass::Confirmed).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.clone_a.as_str(), "A");
        assert_eq!(
            forward.evidence_from(&"B".into()).unwrap().offset_hint,
            Some(-250)
        );
    }

    #[test]
    fn test_self_relation_is_refused() {
        assert!(OverlapRelation::new(
            "A",
            "A",
            OverlapEvidence::with_matched(3),
            RelationClass::Confirmed
        )
        .is_none());
    }

    #[test]
    fn test_find_pairs_confirms_shared_bands() {
        let clones = vec![
            BacClone::new("b1", "RP11", vec![100, 200, 300, 500]),
            BacClone::new("b2", "RP11", vec![100, 205, 300, 900]),
            BacClone::new("b3", "RP11", vec![1_500, 2_500, 3_500]),
        ];
        let pairs = find_pairs(&clones, &LibraryCatalog::new(), &config(3));

        assert!(pairs.errors.is_empty());
        assert_eq!(pairs.relations.len(), 1);
        let relation = &pairs.relations[0];
        assert_eq!(relation.key(), (&"b1".into(), &"b2".into()));
        assert_eq!(relation.evidence.matched, 3);
        assert_eq!(relation.class, RelationClass::Confirmed);
    }

    #[test]
    fn test_classification_thresholds() {
        let clones = vec![
            BacClone::new("a", "L", vec![100, 200, 300, 400, 500, 600]),
            BacClone::new("b", "L", vec![100, 200, 300]),
        ];
        let libraries = LibraryCatalog::new();

        let mut cfg = config(3);
        cfg.max_fragment_count_difference = Some(2);
        let pairs = find_pairs(&clones, &libraries, &cfg);
        assert_eq!(pairs.relations[0].class, RelationClass::Rejected);

        let mut cfg = config(2);
        cfg.min_match_fraction = 1.0;
        let clones = vec![
            BacClone::new("a", "L", vec![100, 200, 300, 400]),
            BacClone::new("b", "L", vec![100, 200, 300, 999]),
        ];
        let pairs = find_pairs(&clones, &libraries, &cfg);
        assert_eq!(pairs.relations[0].class, RelationClass::Ambiguous);
    }

    #[test]
    fn test_cross_library_requires_opt_in() {
        let clones = vec![
            BacClone::new("a", "RP11", vec![100, 200, 300]),
            BacClone::new("b", "CTD", vec![100, 200, 300]),
        ];
        let libraries = LibraryCatalog::new()
            .with_library("RP11", DigestConvention::new("HindIII"))
            .with_library("CTD", DigestConvention::new("HindIII"));

        let pairs = find_pairs(&clones, &libraries, &config(3));
        assert!(pairs.relations.is_empty());
        assert!(matches!(
            pairs.errors.as_slice(),
            [MappingError::IncompatibleDigestConvention { .. }]
        ));

        let mut cfg = config(3);
        cfg.allow_cross_library = true;
        let pairs = find_pairs(&clones, &libraries, &cfg);
        assert_eq!(pairs.relations.len(), 1);
        assert!(pairs.errors.is_empty());

        let libraries = LibraryCatalog::new()
            .with_library("RP11", DigestConvention::new("HindIII"))
            .with_library("CTD", DigestConvention::new("EcoRI"));
        let pairs = find_pairs(&clones, &libraries, &cfg);
        assert!(pairs.relations.is_empty());
        assert_eq!(pairs.errors.len(), 1);
    }

    #[test]
    fn test_invalid_clone_is_reported_once() {
        let clones = vec![
            BacClone::new("empty", "L", Vec::<u64>::new()),
            BacClone::new("a", "L", vec![100, 200, 300]),
            BacClone::new("b", "L", vec![100, 200, 300]),
        ];
        let pairs = find_pairs(&clones, &LibraryCatalog::new(), &config(3));
        assert_eq!(pairs.relations.len(), 1);
        assert_eq!(pairs.errors.len(), 1);
        assert!(matches!(
            &pairs.errors[0],
            MappingError::InvalidFragmentData { clone, .. } if clone.as_str() == "empty"
        ));
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let clones: Vec<BacClone> = (0..12u64)
            .map(|i| {
                BacClone::new(
                    format!("c{i:02}"),
                    "L",
                    vec![1_000 + i * 100, 1_100 + i * 100, 1_200 + i * 100, 5_000],
                )
            })
            .collect();
        let libraries = LibraryCatalog::new();
        let sequential = find_pairs(&clones, &libraries, &config(2));
        let mut cfg = config(2);
        cfg.parallel = true;
        let parallel = find_pairs(&clones, &libraries, &cfg);
        assert_eq!(sequential.relations, parallel.relations);
        assert!(!sequential.relations.is_empty());
    }
}
