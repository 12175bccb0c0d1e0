use std::collections::BTreeMap;

/// An attribute value, with the midpoint when the value is a `start-end` range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub value: String,
    pub mid: Option<u64>,
}

/// Split `key=value;key=value` into a map.
///
/// Keys without `=` map to an empty value; empty entries are skipped. Later
/// duplicates overwrite earlier ones.
#[must_use]
pub fn split_attributes(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (entry.to_string(), String::new()),
        })
        .collect()
}

/// Like [`split_attributes`], also resolving the midpoint of range values
#[must_use]
pub fn split_attributes_with_mids(text: &str) -> BTreeMap<String, Attribute> {
    split_attributes(text)
        .into_iter()
        .map(|(key, value)| {
            let mid = range_mid(&value);
            (key, Attribute { value, mid })
        })
        .collect()
}

/// Midpoint of `start-end` or `start..end`, ignoring thousands separators
#[must_use]
pub fn range_mid(value: &str) -> Option<u64> {
    let (start, end) = value
        .split_once("..")
        .or_else(|| value.split_once('-'))?;
    let parse = |s: &str| s.trim().replace(',', "").parse::<u64>().ok();
    let (start, end) = (parse(start)?, parse(end)?);
    let (lo, hi) = (start.min(end), start.max(end));
    Some(lo + (hi - lo) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_attributes() {
        let attrs = split_attributes(" location=1000-3000; note = end clone ;flag;;");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["location"], "1000-3000");
        assert_eq!(attrs["note"], "end clone");
        assert_eq!(attrs["flag"], "");
        assert!(split_attributes("").is_empty());
    }

    #[test]
    fn test_split_attributes_with_mids() {
        let attrs = split_attributes_with_mids("location=1,000-3,000;chrom=7;span=500..100");
        assert_eq!(attrs["location"].mid, Some(2_000));
        assert_eq!(attrs["chrom"].mid, None);
        assert_eq!(attrs["span"].mid, Some(300));
        assert_eq!(attrs["location"].value, "1,000-3,000");
    }
}
