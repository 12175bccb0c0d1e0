use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clone::BacClone;
use crate::core::fragment::FragmentSet;
use crate::core::types::LibraryId;

/// How a library's clones were digested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestConvention {
    /// Restriction enzyme (or enzyme combination) used for fingerprinting
    pub enzyme: String,

    /// Digest cuts exactly once per site occurrence
    #[serde(default = "default_single_cutter")]
    pub single_cutter: bool,
}

fn default_single_cutter() -> bool {
    true
}

impl DigestConvention {
    pub fn new(enzyme: impl Into<String>) -> Self {
        Self {
            enzyme: enzyme.into(),
            single_cutter: true,
        }
    }

    #[must_use]
    pub fn with_single_cutter(mut self, single_cutter: bool) -> Self {
        self.single_cutter = single_cutter;
        self
    }

    /// Enzyme names compare case-insensitively
    #[must_use]
    pub fn same_enzyme(&self, other: &Self) -> bool {
        self.enzyme.eq_ignore_ascii_case(&other.enzyme)
    }
}

/// Library metadata keyed by library identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryCatalog {
    libraries: BTreeMap<LibraryId, DigestConvention>,
}

impl LibraryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: LibraryId, convention: DigestConvention) {
        self.libraries.insert(id, convention);
    }

    #[must_use]
    pub fn with_library(mut self, id: impl Into<String>, convention: DigestConvention) -> Self {
        self.insert(LibraryId::new(id), convention);
        self
    }

    #[must_use]
    pub fn get(&self, id: &LibraryId) -> Option<&DigestConvention> {
        self.libraries.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LibraryId, &DigestConvention)> {
        self.libraries.iter()
    }

    /// Whether digests from two libraries may be compared.
    ///
    /// Libraries without metadata are assumed comparable; narrowing clones to
    /// a single convention beforehand is the caller's job.
    #[must_use]
    pub fn comparable(&self, a: &LibraryId, b: &LibraryId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Some(conv_a), Some(conv_b)) => conv_a.same_enzyme(conv_b),
            _ => true,
        }
    }
}

/// Keep only clones whose library was digested with `enzyme`.
///
/// Clones from libraries missing from the catalog are dropped.
#[must_use]
pub fn narrow_down_libraries(
    clones: &[BacClone],
    catalog: &LibraryCatalog,
    enzyme: &str,
) -> Vec<BacClone> {
    let kept: Vec<BacClone> = clones
        .iter()
        .filter(|clone| {
            catalog
                .get(&clone.library)
                .is_some_and(|conv| conv.enzyme.eq_ignore_ascii_case(enzyme))
        })
        .cloned()
        .collect();
    debug!(
        "Narrowed {} clones to {} digested with {enzyme}",
        clones.len(),
        kept.len()
    );
    kept
}

/// Strip fragments from clones whose library is not a single-cutter digest.
///
/// Stripped clones are kept so that later stages report them as having no
/// usable fragments. Libraries missing from the catalog are left untouched.
#[must_use]
pub fn only_single_cutters(clones: &[BacClone], catalog: &LibraryCatalog) -> Vec<BacClone> {
    clones
        .iter()
        .map(|clone| {
            let mut clone = clone.clone();
            if catalog
                .get(&clone.library)
                .is_some_and(|conv| !conv.single_cutter)
            {
                debug!(
                    "Dropping fragments of {}: not a single-cutter digest",
                    clone.id
                );
                clone.fragments = FragmentSet::default();
            }
            clone
        })
        .collect()
}
