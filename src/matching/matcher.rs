use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::clone::BacClone;
use crate::core::error::MappingError;
use crate::core::fragment::FragmentSet;
use crate::utils::validation::{count_to_f64, length_to_f64};

/// Default absolute sizing tolerance in base pairs
pub const DEFAULT_TOLERANCE_BP: u64 = 5;

/// How far apart two fragment lengths may be and still count as the same band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// Fixed window: `|a - b| <= bp`
    Absolute(u64),
    /// Relative window: `|a - b| <= fraction * max(a, b)`
    Relative(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Absolute(DEFAULT_TOLERANCE_BP)
    }
}

impl Tolerance {
    /// Whether two lengths correspond under this tolerance
    #[must_use]
    pub fn accepts(self, a: u64, b: u64) -> bool {
        let diff = a.abs_diff(b);
        match self {
            Self::Absolute(bp) => diff <= bp,
            Self::Relative(fraction) => {
                length_to_f64(diff) <= fraction * length_to_f64(a.max(b))
            }
        }
    }

    /// Inclusive range of lengths that may correspond to `length`.
    ///
    /// The range may be slightly wider than what [`Tolerance::accepts`] allows;
    /// callers still check each candidate.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn window(self, length: u64) -> (u64, u64) {
        match self {
            Self::Absolute(bp) => (length.saturating_sub(bp), length.saturating_add(bp)),
            Self::Relative(fraction) => {
                if fraction >= 1.0 {
                    return (0, u64::MAX);
                }
                let fraction = fraction.max(0.0);
                let len = length as f64;
                let lower = (len * (1.0 - fraction)).floor().max(0.0) as u64;
                let upper = (len / (1.0 - fraction)).ceil();
                let upper = if upper >= u64::MAX as f64 {
                    u64::MAX
                } else {
                    upper as u64
                };
                (lower, upper)
            }
        }
    }
}

/// One band of clone A assigned to one band of clone B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentPair {
    /// Fragment index in A (digest order)
    pub a: usize,
    /// Fragment index in B (digest order)
    pub b: usize,
    /// Absolute length difference in base pairs
    pub difference: u64,
}

/// Evidence that two fingerprints share bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Number of corresponding fragments; each band is used at most once
    pub matched: usize,

    /// Sized fragments in A
    pub usable_a: usize,

    /// Sized fragments in B
    pub usable_b: usize,

    /// `matched` divided by the smaller usable fragment count
    pub fraction: f64,

    /// Summed length of the shorter band of each matched pair
    pub shared_length: u64,

    /// Where B's first base sits in A's coordinates, if cut positions allow it
    pub offset_hint: Option<i64>,

    /// The fragment assignment, ordered by A's fragment index
    pub pairs: Vec<FragmentPair>,
}

impl MatchReport {
    /// The same evidence read from B's side
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut pairs: Vec<FragmentPair> = self
            .pairs
            .iter()
            .map(|p| FragmentPair {
                a: p.b,
                b: p.a,
                difference: p.difference,
            })
            .collect();
        pairs.sort_by_key(|p| (p.a, p.b));

        Self {
            matched: self.matched,
            usable_a: self.usable_b,
            usable_b: self.usable_a,
            fraction: self.fraction,
            shared_length: self.shared_length,
            offset_hint: self.offset_hint.map(|o| -o),
            pairs,
        }
    }
}

/// Compares clone fingerprints under a sizing tolerance
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentMatcher {
    tolerance: Tolerance,
}

impl FragmentMatcher {
    #[must_use]
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Count the fragments of `a` that correspond to a distinct fragment of `b`.
    ///
    /// Candidate band pairs are assigned greedily, closest length difference
    /// first, then by position in the set with fewer sized fragments. The
    /// comparison is symmetric: `compare(b, a)` is `compare(a, b).reversed()`.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidFragmentData` if either clone has no
    /// sized fragments.
    pub fn compare(&self, a: &BacClone, b: &BacClone) -> Result<MatchReport, MappingError> {
        a.fragments.validate(&a.id)?;
        b.fragments.validate(&b.id)?;

        if drives_assignment(a, b) {
            Ok(self.assign(&a.fragments, &b.fragments))
        } else {
            Ok(self.assign(&b.fragments, &a.fragments).reversed())
        }
    }

    /// Greedy assignment with `short` as the tie-breaking side
    fn assign(&self, short: &FragmentSet, long: &FragmentSet) -> MatchReport {
        let mut long_sorted: Vec<(usize, u64)> = long.sized().collect();
        long_sorted.sort_by_key(|&(pos, len)| (len, pos));

        // (difference, short position, long position)
        let mut candidates: Vec<(u64, usize, usize)> = Vec::new();
        for (short_pos, short_len) in short.sized() {
            let (lo, hi) = self.tolerance.window(short_len);
            let start = long_sorted.partition_point(|&(_, len)| len < lo);
            for &(long_pos, long_len) in long_sorted[start..]
                .iter()
                .take_while(|&&(_, len)| len <= hi)
            {
                if self.tolerance.accepts(short_len, long_len) {
                    candidates.push((short_len.abs_diff(long_len), short_pos, long_pos));
                }
            }
        }
        candidates.sort_unstable();

        let mut short_used = vec![false; short.len()];
        let mut long_used = vec![false; long.len()];
        let mut pairs = Vec::new();
        for (difference, short_pos, long_pos) in candidates {
            if short_used[short_pos] || long_used[long_pos] {
                continue;
            }
            short_used[short_pos] = true;
            long_used[long_pos] = true;
            pairs.push(FragmentPair {
                a: short_pos,
                b: long_pos,
                difference,
            });
        }
        pairs.sort_by_key(|p| (p.a, p.b));

        let shared_length = pairs
            .iter()
            .filter_map(|p| {
                let a = short.fragments()[p.a].length()?;
                let b = long.fragments()[p.b].length()?;
                Some(a.min(b))
            })
            .fold(0u64, u64::saturating_add);

        let usable_a = short.usable_count();
        let usable_b = long.usable_count();
        let fraction = count_to_f64(pairs.len()) / count_to_f64(usable_a.min(usable_b).max(1));

        MatchReport {
            matched: pairs.len(),
            usable_a,
            usable_b,
            fraction,
            shared_length,
            offset_hint: offset_hint(short, long, &pairs),
            pairs,
        }
    }
}

/// Decide which clone leads the assignment so that both call orders agree
fn drives_assignment(a: &BacClone, b: &BacClone) -> bool {
    let by_count = a.fragments.usable_count().cmp(&b.fragments.usable_count());
    let ordering = by_count.then_with(|| a.id.cmp(&b.id)).then_with(|| {
        let lens_a: Vec<(usize, u64)> = a.fragments.sized().collect();
        let lens_b: Vec<(usize, u64)> = b.fragments.sized().collect();
        lens_a.cmp(&lens_b)
    });
    ordering != Ordering::Greater
}

/// Median of `start_a - start_b` over matched bands with known cut positions.
///
/// For an even count the two middle values are averaged, truncating toward
/// zero, so reversing the pair exactly negates the hint.
fn offset_hint(a: &FragmentSet, b: &FragmentSet, pairs: &[FragmentPair]) -> Option<i64> {
    let cuts_a = a.cut_positions();
    let cuts_b = b.cut_positions();

    let mut deltas: Vec<i64> = pairs
        .iter()
        .filter_map(|p| {
            let start_a = i64::try_from(cuts_a[p.a]?).ok()?;
            let start_b = i64::try_from(cuts_b[p.b]?).ok()?;
            Some(start_a - start_b)
        })
        .collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        let sum = i128::from(deltas[mid - 1]) + i128::from(deltas[mid]);
        i64::try_from(sum / 2).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fragment::Fragment;

    fn clone(name: &str, lengths: Vec<u64>) -> BacClone {
        BacClone::new(name, "lib", lengths)
    }

    #[test]
    fn test_tolerance_accepts() {
        let abs = Tolerance::Absolute(5);
        assert!(abs.accepts(200, 205));
        assert!(abs.accepts(205, 200));
        assert!(!abs.accepts(200, 206));

        let rel = Tolerance::Relative(0.02);
        assert!(rel.accepts(1000, 1020));
        assert!(!rel.accepts(1000, 1030));
    }

    #[test]
    fn test_relative_window_covers_accepted_lengths() {
        let rel = Tolerance::Relative(0.05);
        let (lo, hi) = rel.window(1000);
        for other in 900..1100 {
            if rel.accepts(1000, other) {
                assert!(lo <= other && other <= hi, "{other} outside {lo}..={hi}");
            }
        }
    }

    #[test]
    fn test_three_of_four_bands_match() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(5));
        let a = clone("a", vec![100, 200, 300, 500]);
        let b = clone("b", vec![100, 205, 300, 900]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.matched, 3);
        assert!((report.fraction - 0.75).abs() < 1e-9);
        assert_eq!(report.shared_length, 600);
        let matched: Vec<(usize, usize)> = report.pairs.iter().map(|p| (p.a, p.b)).collect();
        assert_eq!(matched, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_band_is_not_reused() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(5));
        let a = clone("a", vec![100, 100, 100]);
        let b = clone("b", vec![101, 400]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_closest_band_wins() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(5));
        let a = clone("a", vec![100]);
        let b = clone("b", vec![104, 101]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.pairs, vec![FragmentPair { a: 0, b: 1, difference: 1 }]);
    }

    #[test]
    fn test_compare_is_symmetric() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(3));
        let a = clone("a", vec![500, 120, 120, 800, 310]);
        let b = clone("b", vec![121, 312, 640, 118]);

        let ab = matcher.compare(&a, &b).unwrap();
        let ba = matcher.compare(&b, &a).unwrap();
        assert_eq!(ab.matched, ba.matched);
        assert_eq!(ab, ba.reversed());
        assert_eq!(ab.offset_hint, ba.offset_hint.map(|o| -o));
    }

    #[test]
    fn test_offset_hint_from_cut_positions() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(0));
        // b starts at a's third band
        let a = clone("a", vec![1000, 2000, 3000, 4000]);
        let b = clone("b", vec![3000, 4000, 5000]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.matched, 2);
        assert_eq!(report.offset_hint, Some(3000));
    }

    #[test]
    fn test_unsized_bands_are_not_evidence() {
        let matcher = FragmentMatcher::default();
        let a = BacClone::new(
            "a",
            "lib",
            FragmentSet::new(vec![Fragment::unsized_band(), Fragment::sized(300)]),
        );
        let b = clone("b", vec![300, 700]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.usable_a, 1);
        assert_eq!(report.offset_hint, None);
    }

    #[test]
    fn test_empty_set_is_invalid() {
        let matcher = FragmentMatcher::default();
        let a = clone("a", vec![]);
        let b = clone("b", vec![300]);

        let err = matcher.compare(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidFragmentData { ref clone, .. } if clone.as_str() == "a"
        ));
    }

    #[test]
    fn test_huge_fragments_do_not_overflow() {
        let matcher = FragmentMatcher::new(Tolerance::Absolute(5));
        let a = clone("a", vec![u64::MAX, u64::MAX, 100, 200, 300]);
        let b = clone("b", vec![u64::MAX, u64::MAX, 100, 200, 300]);

        let report = matcher.compare(&a, &b).unwrap();
        assert_eq!(report.matched, 5);
        assert_eq!(report.shared_length, u64::MAX);
        assert_eq!(report.offset_hint, Some(0));
    }
}
