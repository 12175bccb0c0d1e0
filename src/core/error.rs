use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{CloneId, LibraryId};

/// Errors raised by the mapping core
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingError {
    /// Malformed or empty fragment input. Fatal to a single comparison only.
    #[error("Invalid fragment data for clone '{clone}': {reason}")]
    InvalidFragmentData { clone: CloneId, reason: String },

    /// A relation names a clone that was not supplied to the assembler
    #[error("Relation references unknown clone '{0}'")]
    UnknownCloneReference(CloneId),

    /// Two clones come from libraries whose digests cannot be compared
    #[error(
        "Clones '{clone_a}' ({library_a}) and '{clone_b}' ({library_b}) use incompatible digest conventions"
    )]
    IncompatibleDigestConvention {
        clone_a: CloneId,
        library_a: LibraryId,
        clone_b: CloneId,
        library_b: LibraryId,
    },
}

impl MappingError {
    pub(crate) fn invalid_fragments(clone: &CloneId, reason: impl Into<String>) -> Self {
        Self::InvalidFragmentData {
            clone: clone.clone(),
            reason: reason.into(),
        }
    }
}
