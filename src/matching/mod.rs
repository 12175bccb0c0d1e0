//! Fingerprint matching and pair finding.
//!
//! - [`FragmentMatcher`](matcher::FragmentMatcher): tolerance-based band correspondence between two clones
//! - [`PairFinder`](pairs::PairFinder): pairwise scan producing classified [`OverlapRelation`](pairs::OverlapRelation)s
//!
//! ## Matching
//!
//! Gel sizing is noisy, so two bands correspond when their lengths differ by
//! no more than the configured [`Tolerance`](matcher::Tolerance). Each band is
//! used at most once; candidate band pairs are assigned closest first, which
//! keeps repeated small fragments from inflating the score.
//!
//! ## Classification
//!
//! Pairs with fewer corresponding bands than `min_match_count` produce no
//! relation. The rest are:
//!
//! | Condition | Class |
//! |-----------|-------|
//! | sized band counts differ by more than `max_fragment_count_difference` | rejected |
//! | matched fraction below `min_match_fraction` | ambiguous |
//! | otherwise | confirmed |
//!
//! ## Example
//!
//! ```rust
//! use bac_mapper::{find_pairs, BacClone, LibraryCatalog, PairConfig, RelationClass};
//!
//! let clones = vec![
//!     BacClone::new("RP11-1A1", "RP11", vec![100, 200, 300, 500]),
//!     BacClone::new("RP11-2B2", "RP11", vec![100, 205, 300, 900]),
//! ];
//! let pairs = find_pairs(&clones, &LibraryCatalog::new(), &PairConfig::default());
//!
//! assert_eq!(pairs.relations.len(), 1);
//! assert_eq!(pairs.relations[0].class, RelationClass::Confirmed);
//! ```

pub mod matcher;
pub mod pairs;
