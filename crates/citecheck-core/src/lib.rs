use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod config_file;
pub mod database;
pub mod extractor;
pub mod normalize;
pub mod patterns;

// Re-export for convenience
pub use classifier::{ClassificationResult, Report, Status};
pub use database::{CitationDatabase, DatabaseConfig, DatabaseEntry, load_database};
pub use extractor::{RawMatch, extract};
pub use normalize::{CanonicalCitation, CitationKey, Occurrence, deduplicate};
pub use patterns::PatternShape;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 text", path.display())]
    InvalidUtf8 { path: PathBuf },
    #[error("configuration error: {0}")]
    Config(String),
}

/// Which verdict wins when a key is listed both as verified and as suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precedence {
    #[default]
    #[serde(rename = "verified")]
    VerifiedWins,
    #[serde(rename = "suspicious")]
    SuspiciousWins,
}

impl FromStr for Precedence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Ok(Self::VerifiedWins),
            "suspicious" => Ok(Self::SuspiciousWins),
            other => Err(CoreError::Config(format!(
                "unknown precedence '{}' (expected 'verified' or 'suspicious')",
                other
            ))),
        }
    }
}

/// How extracted citations are compared against the loaded lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchPolicy {
    /// Compare surnames exactly as written. Off by default, so "McDonald"
    /// in the text matches "Mcdonald" in a bibliography.
    pub case_sensitive: bool,
    pub precedence: Precedence,
}

/// Check a text blob against a loaded citation database.
///
/// Pipeline:
/// 1. Run every pattern shape over the text (in precedence order)
/// 2. Drop lower-precedence matches overlapping an accepted match
/// 3. Collapse the remaining matches to one occurrence per canonical key
/// 4. Look each key up in the verified and suspicious sets
pub fn classify(text: &str, database: &CitationDatabase) -> Report {
    let matches = extract(text);
    let occurrences = deduplicate(&matches, database.policy().case_sensitive);
    classifier::classify_occurrences(occurrences, database)
}

/// Read a text file and check it. The file must be valid UTF-8.
pub fn check_file(path: &Path, database: &CitationDatabase) -> Result<Report, CoreError> {
    let text = read_text(path)?;
    Ok(classify(&text, database))
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, CoreError> {
    let bytes = std::fs::read(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| CoreError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}
