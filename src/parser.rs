//! Job descriptor parsing for orcaprep.
//!
//! This module validates the descriptor path and extracts the requested
//! parallelism degree from an ORCA input file. Two notations are recognized,
//! tried in priority order:
//!
//! 1. **Inline keyword line**: a line whose first non-blank character is `!`
//!    containing `PAL<N>`, e.g.
//!
//!    ```text
//!    ! B3LYP def2-TZVP PAL8 TightSCF
//!    ```
//!
//! 2. **%pal block**: a line starting with `%pal` opens a settings block that
//!    is closed by a bare `end`; the processor count is given by `nprocs <N>`
//!    either on the opener line or inside the block:
//!
//!    ```text
//!    %pal
//!      nprocs 16
//!    end
//!    ```
//!
//! All matching is case-insensitive. Each notation is implemented as a
//! matcher function over the descriptor's line sequence returning
//! `Option<u32>`; the matchers are tried in order and the first hit wins.
//! When neither notation matches, the degree defaults to 1.
//!
//! # Mixed notations
//!
//! When a descriptor carries both notations, the inline `PAL` keyword is
//! authoritative regardless of where it appears in the file: the inline
//! matcher runs over the whole line sequence before the block matcher is
//! consulted. So for
//!
//! ```text
//! %pal nprocs 8 end
//! ! B3LYP PAL2
//! ```
//!
//! the degree is 2, even though the `%pal` block comes first. ORCA itself
//! treats the two notations as aliases and sane inputs use only one.
//!
//! # Examples
//!
//! ```no_run
//! use orcaprep::parser::parse_descriptor;
//! use std::path::Path;
//!
//! let descriptor = parse_descriptor(Path::new("ZnHis4.in"))?;
//! assert!(descriptor.nprocs >= 1);
//! # Ok::<(), orcaprep::parser::ParseError>(())
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref PAL_INLINE_RE: Regex = Regex::new(r"(?i)\bPAL\s*([0-9]+)").unwrap();
    static ref NPROCS_RE: Regex = Regex::new(r"(?i)\bnprocs\s*([0-9]+)").unwrap();
}

/// Error type for descriptor parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// I/O error when reading the descriptor
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Descriptor path does not reference an existing regular file
    #[error("descriptor not found or not a regular file: {0}")]
    NotAFile(PathBuf),
}

/// Type alias for parse operation results
type Result<T> = std::result::Result<T, ParseError>;

/// A validated job descriptor with its extracted parallelism degree.
///
/// `nprocs` sizes both the PBS `ppn` request and the MPI process count;
/// the generated job always occupies a single node.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Path to the descriptor file as given on the command line
    pub path: PathBuf,
    /// Requested parallelism degree (>= 1)
    pub nprocs: u32,
}

/// Validates the descriptor path and extracts the parallelism degree.
///
/// # Arguments
///
/// * `path` - Path to the ORCA input file
///
/// # Returns
///
/// Returns a [`Descriptor`] on success, or a [`ParseError`] if the path does
/// not name an existing regular file or cannot be read. A descriptor with no
/// parallelism directive parses successfully with `nprocs == 1`.
pub fn parse_descriptor(path: &Path) -> Result<Descriptor> {
    if !path.is_file() {
        return Err(ParseError::NotAFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(Descriptor {
        path: path.to_path_buf(),
        nprocs: extract_nprocs(&content),
    })
}

/// Extracts the parallelism degree from descriptor text.
///
/// Matchers are tried in priority order against the full line sequence; the
/// first non-empty result wins. Returns 1 when no directive is found.
pub fn extract_nprocs(content: &str) -> u32 {
    let lines: Vec<&str> = content.lines().collect();
    let matchers: [fn(&[&str]) -> Option<u32>; 2] = [match_inline_pal, match_pal_block];
    matchers
        .iter()
        .find_map(|matcher| matcher(&lines))
        .unwrap_or(1)
}

/// Inline notation: `! ... PAL<N> ...` on a keyword line.
fn match_inline_pal(lines: &[&str]) -> Option<u32> {
    for line in lines {
        let trimmed = line.trim();
        if !trimmed.starts_with('!') {
            continue;
        }
        if let Some(n) = capture_count(&PAL_INLINE_RE, trimmed) {
            return Some(n);
        }
    }
    None
}

/// Block notation: `%pal ... nprocs <N> ... end`.
///
/// The opener line itself may carry `nprocs` (single-line form). A bare `end`
/// closes the block; a block closed without `nprocs` yields no match, but a
/// later `%pal` block is still considered.
fn match_pal_block(lines: &[&str]) -> Option<u32> {
    let mut in_block = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.to_lowercase().starts_with("%pal") {
            if let Some(n) = capture_count(&NPROCS_RE, trimmed) {
                return Some(n);
            }
            in_block = true;
            continue;
        }

        if in_block {
            if let Some(n) = capture_count(&NPROCS_RE, trimmed) {
                return Some(n);
            }
            if trimmed.eq_ignore_ascii_case("end") {
                in_block = false;
            }
        }
    }
    None
}

fn capture_count(re: &Regex, line: &str) -> Option<u32> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_pal_keyword() {
        assert_eq!(extract_nprocs("! B3LYP def2-TZVP PAL4 TightSCF\n"), 4);
    }

    #[test]
    fn inline_pal_is_case_insensitive() {
        assert_eq!(extract_nprocs("! b3lyp pal12\n"), 12);
    }

    #[test]
    fn single_line_pal_block() {
        assert_eq!(extract_nprocs("%pal nprocs 8 end\n"), 8);
    }

    #[test]
    fn multi_line_pal_block() {
        let input = "! B3LYP def2-TZVP\n%pal\n  nprocs 16\nend\n";
        assert_eq!(extract_nprocs(input), 16);
    }

    #[test]
    fn closed_block_without_nprocs_defaults() {
        let input = "%pal\nend\n* xyz 0 1\nZn 0.0 0.0 0.0\n*\n";
        assert_eq!(extract_nprocs(input), 1);
    }

    #[test]
    fn nprocs_after_closed_block_is_ignored() {
        // nprocs outside any %pal block carries no meaning
        let input = "%pal\nend\nnprocs 32\n";
        assert_eq!(extract_nprocs(input), 1);
    }

    #[test]
    fn second_block_is_still_considered() {
        let input = "%pal\nend\n%pal\n nprocs 6\nend\n";
        assert_eq!(extract_nprocs(input), 6);
    }

    #[test]
    fn inline_takes_priority_over_block() {
        let input = "%pal nprocs 8 end\n! PAL2\n";
        assert_eq!(extract_nprocs(input), 2);
    }

    #[test]
    fn no_directive_defaults_to_one() {
        let input = "! B3LYP def2-TZVP\n* xyzfile 0 1 ZnHis4_clean.xyz\n";
        assert_eq!(extract_nprocs(input), 1);
    }

    #[test]
    fn pal_outside_keyword_line_is_ignored() {
        // "PAL" in a coordinate comment must not be picked up
        assert_eq!(extract_nprocs("# PAL8 mentioned in a comment\n"), 1);
    }

    #[test]
    fn missing_descriptor_is_an_error() {
        let err = parse_descriptor(Path::new("definitely-missing.in")).unwrap_err();
        assert!(matches!(err, ParseError::NotAFile(_)));
    }
}
