//! Centralized validation and helper functions.

/// Maximum number of clones allowed in a single clone table (DOS protection)
pub const MAX_CLONES: usize = 100_000;

/// Maximum number of fragments accepted for a single clone
pub const MAX_FRAGMENTS_PER_CLONE: usize = 10_000;

/// Maximum length (bp) accepted for a single fragment
pub const MAX_FRAGMENT_LENGTH: u64 = 1_000_000_000;

/// Safely convert usize to f64 for fraction calculations
///
/// Clone and fragment counts stay far below the f64 mantissa limit.
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Same as [`count_to_f64`] for base-pair lengths
#[inline]
#[must_use]
pub fn length_to_f64(length: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        length as f64
    }
}

/// Check if adding another clone would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new clone.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_clone_limit(count: usize) -> Option<String> {
    if count >= MAX_CLONES {
        Some(format!(
            "Too many clones: adding another would exceed maximum of {MAX_CLONES}"
        ))
    } else {
        None
    }
}

/// Validate a clone name: non-empty, no whitespace or control characters.
///
/// # Examples
///
/// ```
/// use bac_mapper::utils::validation::is_valid_clone_name;
///
/// assert!(is_valid_clone_name("RP11-145E5"));
/// assert!(!is_valid_clone_name(""));
/// assert!(!is_valid_clone_name("RP11 145E5"));
/// ```
#[must_use]
pub fn is_valid_clone_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}
