use serde::{Deserialize, Serialize};

use crate::core::error::MappingError;
use crate::core::types::CloneId;
use crate::utils::validation::MAX_FRAGMENT_LENGTH;

/// A single restriction fragment. `None` marks a band that was seen on the
/// gel but could not be sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(Option<u64>);

impl Fragment {
    #[must_use]
    pub fn sized(length: u64) -> Self {
        Self(Some(length))
    }

    #[must_use]
    pub fn unsized_band() -> Self {
        Self(None)
    }

    /// Length in base pairs, if the fragment was sized
    #[must_use]
    pub fn length(self) -> Option<u64> {
        self.0
    }

    #[must_use]
    pub fn is_sized(self) -> bool {
        self.0.is_some()
    }
}

/// The restriction digest fingerprint of one clone.
///
/// Fragments keep the order in which the digest was read. Matching treats the
/// set as a multiset; the order is only used to derive cut positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    #[must_use]
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Build a fragment set from raw signed lengths as delivered by a digest
    /// source.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidFragmentData` if any length is negative
    /// or longer than `MAX_FRAGMENT_LENGTH`.
    pub fn from_lengths(clone: &CloneId, lengths: &[i64]) -> Result<Self, MappingError> {
        let fragments = lengths
            .iter()
            .enumerate()
            .map(|(i, &length)| match u64::try_from(length) {
                Err(_) => Err(MappingError::invalid_fragments(
                    clone,
                    format!("fragment {} has negative length {length}", i + 1),
                )),
                Ok(len) if len > MAX_FRAGMENT_LENGTH => Err(MappingError::invalid_fragments(
                    clone,
                    format!(
                        "fragment {} length {length} exceeds maximum of {MAX_FRAGMENT_LENGTH}",
                        i + 1
                    ),
                )),
                Ok(len) => Ok(Fragment::sized(len)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fragments })
    }

    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments that carry a length and can serve as evidence
    #[must_use]
    pub fn usable_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_sized()).count()
    }

    /// Sized fragments together with their position in digest order
    pub fn sized(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.fragments
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.length().map(|len| (i, len)))
    }

    /// Fragment-derived clone length: the sum of all sized fragments,
    /// saturating at `u64::MAX`
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.sized()
            .fold(0u64, |total, (_, len)| total.saturating_add(len))
    }

    /// Start offset of each fragment within the clone, in digest order.
    ///
    /// A fragment that follows an unsized band, or whose start would not fit
    /// in a `u64`, has no known start.
    #[must_use]
    pub fn cut_positions(&self) -> Vec<Option<u64>> {
        let mut positions = Vec::with_capacity(self.fragments.len());
        let mut cursor = Some(0u64);
        for fragment in &self.fragments {
            positions.push(cursor);
            cursor = match (cursor, fragment.length()) {
                (Some(start), Some(len)) => start.checked_add(len),
                _ => None,
            };
        }
        positions
    }

    /// Check that the set can take part in a comparison.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::InvalidFragmentData` if the set is empty or has
    /// no sized fragments.
    pub fn validate(&self, clone: &CloneId) -> Result<(), MappingError> {
        if self.fragments.is_empty() {
            return Err(MappingError::invalid_fragments(clone, "no fragments"));
        }
        if self.usable_count() == 0 {
            return Err(MappingError::invalid_fragments(clone, "no sized fragments"));
        }
        Ok(())
    }
}

impl From<Vec<u64>> for FragmentSet {
    fn from(lengths: Vec<u64>) -> Self {
        Self::new(lengths.into_iter().map(Fragment::sized).collect())
    }
}

impl From<&[u64]> for FragmentSet {
    fn from(lengths: &[u64]) -> Self {
        Self::new(lengths.iter().copied().map(Fragment::sized).collect())
    }
}
