use serde::Serialize;

use crate::Precedence;
use crate::database::CitationDatabase;
use crate::normalize::{CanonicalCitation, CitationKey, Occurrence};

/// Verdict for one unique citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Listed in the project's bibliography.
    Verified,
    /// Listed as a known fabrication.
    Suspicious,
    /// In neither list; needs manual review.
    Unverified,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Suspicious => "SUSPICIOUS",
            Self::Unverified => "UNVERIFIED",
        }
    }
}

/// A unique citation and its verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub citation: CanonicalCitation,
    pub original_text: String,
    pub span: (usize, usize),
    pub status: Status,
    pub occurrences: usize,
    /// Set whenever the key appears in the suspicious list, even if the
    /// precedence policy made it VERIFIED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicious_reason: Option<String>,
}

impl ClassificationResult {
    /// Verified, but also listed as a known fabrication.
    pub fn is_flagged(&self) -> bool {
        self.status == Status::Verified && self.suspicious_reason.is_some()
    }
}

/// Summary of one check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub citations_found: usize,
    pub verified: usize,
    pub suspicious: usize,
    pub unverified: usize,
    /// No suspicious and no unverified citations. Callers map `false` to a
    /// failing exit status.
    pub all_clear: bool,
    pub results: Vec<ClassificationResult>,
}

impl Report {
    pub fn from_results(results: Vec<ClassificationResult>) -> Self {
        let count = |s: Status| results.iter().filter(|r| r.status == s).count();
        let verified = count(Status::Verified);
        let suspicious = count(Status::Suspicious);
        let unverified = count(Status::Unverified);
        Self {
            citations_found: results.len(),
            verified,
            suspicious,
            unverified,
            all_clear: suspicious == 0 && unverified == 0,
            results,
        }
    }
}

/// Decide the verdict for a key under the database's precedence policy.
pub fn verdict(database: &CitationDatabase, key: &CitationKey) -> Status {
    let verified = database.is_verified(key);
    let suspicious = database.suspicion(key).is_some();
    match (verified, suspicious, database.policy().precedence) {
        (true, true, Precedence::SuspiciousWins) => Status::Suspicious,
        (true, _, _) => Status::Verified,
        (false, true, _) => Status::Suspicious,
        (false, false, _) => Status::Unverified,
    }
}

/// Classify deduplicated occurrences and aggregate them into a [`Report`].
pub fn classify_occurrences(occurrences: Vec<Occurrence>, database: &CitationDatabase) -> Report {
    let results: Vec<ClassificationResult> = occurrences
        .into_iter()
        .map(|occ| {
            let status = verdict(database, &occ.citation.key);
            let suspicious_reason = database.suspicion(&occ.citation.key).map(str::to_string);
            tracing::debug!(citation = %occ.citation.display, ?status, "classified");
            ClassificationResult {
                citation: occ.citation,
                original_text: occ.original_text,
                span: occ.span,
                status,
                occurrences: occ.mentions,
                suspicious_reason,
            }
        })
        .collect();
    Report::from_results(results)
}
