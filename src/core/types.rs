use serde::{Deserialize, Serialize};

/// Unique identifier (name) of a BAC clone
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloneId(pub String);

impl CloneId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CloneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CloneId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of the clone library a clone was picked from
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryId(pub String);

impl LibraryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LibraryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LibraryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Classification of an overlap relation between two clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationClass {
    /// Enough corresponding fragments to call an overlap
    Confirmed,
    /// Shared fragments, but not enough evidence to place the pair together
    Ambiguous,
    /// Evidence that the two clones must not share a segment
    Rejected,
}

impl std::fmt::Display for RelationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Ambiguous => write!(f, "ambiguous"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}
