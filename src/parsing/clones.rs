use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::debug;

use crate::core::clone::BacClone;
use crate::core::error::MappingError;
use crate::core::fragment::{Fragment, FragmentSet};
use crate::core::types::{CloneId, LibraryId};
use crate::parsing::attributes::split_attributes;
use crate::utils::validation::{check_clone_limit, is_valid_clone_name, MAX_FRAGMENTS_PER_CLONE};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: {source}")]
    InvalidFragments {
        line: usize,
        #[source]
        source: MappingError,
    },

    #[error("Too many clones: {0} exceeds maximum allowed (100000)")]
    TooManyClones(usize),
}

/// Tokens marking a band that was seen but not sized
const UNSIZED_TOKENS: &[&str] = &["?", "-", "na", "nan", "unknown"];

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a text file, transparently decompressing gzip
pub(crate) fn read_text(path: &Path) -> Result<String, ParseError> {
    if is_gzipped(path) {
        let mut text = String::new();
        GzDecoder::new(std::fs::File::open(path)?).read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Guess the delimiter from the file extension: `.csv` is comma, anything else tab
pub(crate) fn delimiter_for(path: &Path) -> char {
    let name = path.to_string_lossy().to_lowercase();
    let name = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bgz"))
        .unwrap_or(&name);
    if name.ends_with(".csv") {
        ','
    } else {
        '\t'
    }
}

/// Parse a clone table file (TSV or CSV, optionally gzipped)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_clone_file(path: &Path) -> Result<Vec<BacClone>, ParseError> {
    let text = read_text(path)?;
    parse_clone_text(&text, delimiter_for(path))
}

/// Parse clone records with columns: name, library, fragments, [sequenced], [attributes]
///
/// Fragments are separated by whitespace, or by commas when the column
/// delimiter is not a comma. `?`, `-` and `NA` mark unsized bands. An empty
/// fragment column yields a clone without fragments, which later stages
/// report as unusable.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for missing columns, bad names or
/// non-numeric values, `ParseError::InvalidFragments` for negative lengths,
/// or `ParseError::TooManyClones` if the limit is exceeded.
pub fn parse_clone_text(text: &str, delimiter: char) -> Result<Vec<BacClone>, ParseError> {
    let mut clones = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        // Check if first non-empty/non-comment line is a header
        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if first == "name" || first == "clone" || first == "id" {
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if fields.len() < 3 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 3 fields"
            )));
        }

        let name = fields[0];
        if !is_valid_clone_name(name) {
            return Err(ParseError::InvalidFormat(format!(
                "Invalid clone name on line {line_num}: '{name}'"
            )));
        }
        let id = CloneId::new(name);

        let fragments = parse_fragments(&id, fields[2], delimiter)
            .map_err(|e| match e {
                FragmentError::NotANumber(token) => ParseError::InvalidFormat(format!(
                    "Invalid fragment length on line {line_num}: '{token}'"
                )),
                FragmentError::TooMany(count) => ParseError::InvalidFormat(format!(
                    "Line {line_num} has {count} fragments, more than {MAX_FRAGMENTS_PER_CLONE}"
                )),
                FragmentError::Mapping(source) => ParseError::InvalidFragments {
                    line: line_num,
                    source,
                },
            })?;

        let sequenced = match fields.get(3) {
            Some(flag) => parse_flag(flag).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Invalid sequenced flag on line {line_num}: '{flag}'"
                ))
            })?,
            None => false,
        };

        let attributes = fields
            .get(4)
            .map(|text| split_attributes(text))
            .unwrap_or_default();

        // Check clone limit for DOS protection
        if check_clone_limit(clones.len()).is_some() {
            return Err(ParseError::TooManyClones(clones.len()));
        }

        clones.push(BacClone {
            id,
            library: LibraryId::new(fields[1]),
            fragments,
            sequenced,
            attributes,
            placement: None,
        });
    }

    debug!("Parsed {} clone records", clones.len());
    Ok(clones)
}

enum FragmentError {
    NotANumber(String),
    TooMany(usize),
    Mapping(MappingError),
}

fn parse_fragments(
    id: &CloneId,
    column: &str,
    delimiter: char,
) -> Result<FragmentSet, FragmentError> {
    let tokens: Vec<&str> = column
        .split(|c: char| c.is_whitespace() || (c == ',' && delimiter != ','))
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() > MAX_FRAGMENTS_PER_CLONE {
        return Err(FragmentError::TooMany(tokens.len()));
    }

    let mut fragments = Vec::with_capacity(tokens.len());
    for token in tokens {
        if UNSIZED_TOKENS.contains(&token.to_lowercase().as_str()) {
            fragments.push(Fragment::unsized_band());
            continue;
        }
        let length: i64 = token
            .parse()
            .map_err(|_| FragmentError::NotANumber(token.to_string()))?;
        let sized = FragmentSet::from_lengths(id, &[length]).map_err(FragmentError::Mapping)?;
        fragments.extend_from_slice(sized.fragments());
    }
    Ok(FragmentSet::new(fragments))
}

/// Parse yes/no style flags; an empty field is `false`
pub(crate) fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "" | "0" | "n" | "no" | "false" => Some(false),
        "1" | "y" | "yes" | "true" => Some(true),
        _ => None,
    }
}
