//! Verified and suspicious citation lists.
//!
//! Both lists are Markdown documents maintained by hand. Only bullet lines of
//! the form `- Author (YYYY)` or `- Author et al. (YYYY)` contribute keys;
//! headings, prose and blank lines are ignored. A missing document is not an
//! error: its category is simply empty, so every citation degrades to
//! UNVERIFIED rather than failing the run.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::MatchPolicy;
use crate::normalize::CitationKey;
use crate::patterns::first_surname;

/// Where to find the citation documents, and how to compare against them.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Documents whose entries are known-real works.
    pub verified: Vec<PathBuf>,
    /// Documents whose entries are known fabrications.
    pub suspicious: Vec<PathBuf>,
    pub policy: MatchPolicy,
}

impl DatabaseConfig {
    /// The conventional document locations under a repository root.
    pub fn for_root(root: &Path) -> Self {
        let research = root.join("research");
        Self {
            verified: vec![
                research.join("BIBLIOGRAPHY.md"),
                research.join("CITATION_CORRECTIONS_APPLIED.md"),
            ],
            suspicious: vec![research.join("COMMONLY_HALLUCINATED_CITATIONS.md")],
            policy: MatchPolicy::default(),
        }
    }
}

/// One bullet entry parsed from a citation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub surname: String,
    pub year: String,
    /// Free text following the citation on the same line, if any.
    pub note: Option<String>,
}

/// In-memory snapshot of both citation lists.
#[derive(Debug, Clone, Default)]
pub struct CitationDatabase {
    verified: HashSet<CitationKey>,
    suspicious: HashMap<CitationKey, String>,
    policy: MatchPolicy,
}

impl CitationDatabase {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Build a key under this database's case policy.
    pub fn key(&self, surname: &str, year: &str) -> CitationKey {
        CitationKey::new(surname, year, self.policy.case_sensitive)
    }

    pub fn add_verified(&mut self, surname: &str, year: &str) {
        let key = self.key(surname, year);
        self.verified.insert(key);
    }

    /// Record a known fabrication. The first reason recorded for a key is kept.
    pub fn add_suspicious(&mut self, surname: &str, year: &str, reason: impl Into<String>) {
        let key = self.key(surname, year);
        self.suspicious.entry(key).or_insert_with(|| reason.into());
    }

    pub fn is_verified(&self, key: &CitationKey) -> bool {
        self.verified.contains(key)
    }

    /// Reason a key is listed as suspicious, if it is.
    pub fn suspicion(&self, key: &CitationKey) -> Option<&str> {
        self.suspicious.get(key).map(String::as_str)
    }

    pub fn verified_len(&self) -> usize {
        self.verified.len()
    }

    pub fn suspicious_len(&self) -> usize {
        self.suspicious.len()
    }

    /// Verified keys in sorted order.
    pub fn verified_keys(&self) -> Vec<&CitationKey> {
        let mut keys: Vec<_> = self.verified.iter().collect();
        keys.sort();
        keys
    }

    /// Suspicious keys with their reasons, in sorted key order.
    pub fn suspicious_entries(&self) -> Vec<(&CitationKey, &str)> {
        let mut entries: Vec<_> = self
            .suspicious
            .iter()
            .map(|(k, r)| (k, r.as_str()))
            .collect();
        entries.sort();
        entries
    }
}

/// Bullet line: `-` or `*`, optional bold, an author segment opening with a
/// capital, then a parenthesized four-digit year.
static BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*[-*]\s+(?:\*\*)?(?P<authors>\p{Lu}[^()\n]*?)\s*\((?P<year>[0-9]{4})\)(?P<rest>.*)$",
    )
    .unwrap()
});

/// Parse every citation bullet in a document.
pub fn parse_entries(content: &str) -> Vec<DatabaseEntry> {
    content
        .lines()
        .filter_map(|line| {
            let caps = BULLET_RE.captures(line)?;
            let surname = first_surname(caps.name("authors")?.as_str())?;
            let note = caps
                .name("rest")
                .map(|r| clean_note(r.as_str()))
                .filter(|n| !n.is_empty());
            Some(DatabaseEntry {
                surname: surname.to_string(),
                year: caps.name("year")?.as_str().to_string(),
                note,
            })
        })
        .collect()
}

fn clean_note(rest: &str) -> String {
    rest.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | ':' | '.' | '*' | '—' | '–')
    })
    .trim_end()
    .to_string()
}

/// Read both categories of documents into a fresh snapshot.
///
/// Each document is opened, read fully and closed before the next one;
/// nothing is cached between calls.
pub fn load_database(config: &DatabaseConfig) -> CitationDatabase {
    let mut db = CitationDatabase::new(config.policy);

    for path in &config.verified {
        let Some(content) = read_document(path) else {
            continue;
        };
        let entries = parse_entries(&content);
        tracing::info!(path = %path.display(), entries = entries.len(), "loaded verified citations");
        for entry in entries {
            db.add_verified(&entry.surname, &entry.year);
        }
    }

    for path in &config.suspicious {
        let Some(content) = read_document(path) else {
            continue;
        };
        let fallback_reason = format!("listed in {}", document_name(path));
        let entries = parse_entries(&content);
        tracing::info!(path = %path.display(), entries = entries.len(), "loaded suspicious citations");
        for entry in entries {
            let reason = entry.note.unwrap_or_else(|| fallback_reason.clone());
            db.add_suspicious(&entry.surname, &entry.year, reason);
        }
    }

    db
}

fn read_document(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "citation document unavailable, treating as empty"
            );
            None
        }
    }
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
