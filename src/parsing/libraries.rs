use std::path::Path;

use crate::core::library::{DigestConvention, LibraryCatalog};
use crate::core::types::LibraryId;
use crate::parsing::clones::{delimiter_for, parse_flag, read_text, ParseError};

/// Parse a library table file (TSV or CSV, optionally gzipped)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the content is invalid.
pub fn parse_library_file(path: &Path) -> Result<LibraryCatalog, ParseError> {
    let text = read_text(path)?;
    parse_library_text(&text, delimiter_for(path))
}

/// Parse library records with columns: library, enzyme, [single_cutter]
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 2 fields, an
/// empty identifier or enzyme, or an unreadable single-cutter flag.
pub fn parse_library_text(text: &str, delimiter: char) -> Result<LibraryCatalog, ParseError> {
    let mut catalog = LibraryCatalog::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if first == "library" || first == "id" {
                continue;
            }
        }

        let line_num = i + 1;

        if fields.len() < 2 || fields[0].is_empty() || fields[1].is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} needs a library identifier and an enzyme"
            )));
        }

        let single_cutter = match fields.get(2) {
            Some(flag) if !flag.is_empty() => parse_flag(flag).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Invalid single-cutter flag on line {line_num}: '{flag}'"
                ))
            })?,
            _ => true,
        };

        catalog.insert(
            LibraryId::new(fields[0]),
            DigestConvention::new(fields[1]).with_single_cutter(single_cutter),
        );
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_library_text() {
        let tsv = "# libraries
library\tenzyme\tsingle_cutter
RP11\tEcoRI\tyes
CH17\tHindIII\tno
CTD\tEcoRI
";
        let catalog = parse_library_text(tsv, '\t').unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get(&"RP11".into()).unwrap().single_cutter);
        assert!(!catalog.get(&"CH17".into()).unwrap().single_cutter);
        assert!(catalog.get(&"CTD".into()).unwrap().single_cutter);
        assert!(catalog.comparable(&"RP11".into(), &"CTD".into()));
    }

    #[test]
    fn test_missing_enzyme() {
        let err = parse_library_text("RP11\n", '\t').unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }
}
