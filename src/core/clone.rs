use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::fragment::FragmentSet;
use crate::core::types::{CloneId, LibraryId};

/// Position of a clone on the assembled map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Index of the map segment holding the clone
    pub segment: usize,

    /// Start offset in base pairs, relative to the segment's leftmost clone
    pub start: u64,

    /// End offset (exclusive)
    pub end: u64,
}

/// A BAC clone with its digest fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacClone {
    /// Clone name
    pub id: CloneId,

    /// Library the clone was picked from
    pub library: LibraryId,

    /// Restriction digest fragments in digest order
    pub fragments: FragmentSet,

    /// Full sequence of the clone is known
    #[serde(default)]
    pub sequenced: bool,

    /// Free-form attributes carried over from the clone record
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Set once the clone has been placed on a map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl BacClone {
    pub fn new(
        id: impl Into<String>,
        library: impl Into<String>,
        fragments: impl Into<FragmentSet>,
    ) -> Self {
        Self {
            id: CloneId::new(id),
            library: LibraryId::new(library),
            fragments: fragments.into(),
            sequenced: false,
            attributes: BTreeMap::new(),
            placement: None,
        }
    }

    #[must_use]
    pub fn with_sequenced(mut self, sequenced: bool) -> Self {
        self.sequenced = sequenced;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Fragment-derived insert length
    #[must_use]
    pub fn length(&self) -> u64 {
        self.fragments.total_length()
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}
