use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::extractor::RawMatch;

/// The (surname, year) pair used for every equality and lookup comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CitationKey {
    pub surname: String,
    pub year: String,
}

impl CitationKey {
    /// Build a key, folding the surname to lowercase unless `case_sensitive`.
    pub fn new(surname: &str, year: &str, case_sensitive: bool) -> Self {
        let surname = if case_sensitive {
            surname.to_string()
        } else {
            surname.to_lowercase()
        };
        Self {
            surname,
            year: year.to_string(),
        }
    }
}

impl fmt::Display for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.surname, self.year)
    }
}

/// A citation reduced to its key plus a display form in the author's casing.
///
/// Equality and hashing use the key only.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalCitation {
    pub key: CitationKey,
    /// `Surname et al. (YYYY)` or `Surname (YYYY)`.
    pub display: String,
}

impl CanonicalCitation {
    pub fn from_match(m: &RawMatch, case_sensitive: bool) -> Self {
        let display = if m.shape.is_et_al() {
            format!("{} et al. ({})", m.surname, m.year)
        } else {
            format!("{} ({})", m.surname, m.year)
        };
        Self {
            key: CitationKey::new(&m.surname, &m.year, case_sensitive),
            display,
        }
    }
}

impl PartialEq for CanonicalCitation {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalCitation {}

impl Hash for CanonicalCitation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// One unique citation found in a text, however often it was mentioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub citation: CanonicalCitation,
    /// Text of the earliest mention.
    pub original_text: String,
    /// Byte span of the earliest mention.
    pub span: (usize, usize),
    /// Mentions collapsed into this occurrence.
    pub mentions: usize,
}

/// Collapse raw matches into one [`Occurrence`] per canonical key.
///
/// Two passes:
/// 1. Claim spans in shape-precedence order. A match overlapping an
///    already claimed span is absorbed by the claimant, whatever its key.
///    Claimed spans are disjoint and kept ordered by start, so only the
///    last claim starting before a match's end can overlap it.
/// 2. Walk the surviving matches by start offset and merge equal keys,
///    keeping the earliest mention's text and span.
///
/// Output is in first-appearance order.
pub fn deduplicate(matches: &[RawMatch], case_sensitive: bool) -> Vec<Occurrence> {
    let mut by_precedence: Vec<&RawMatch> = matches.iter().collect();
    by_precedence.sort_by_key(|m| (m.shape, m.start));

    let mut claimed: BTreeMap<usize, &RawMatch> = BTreeMap::new();
    for m in by_precedence {
        if let Some((_, owner)) = claimed.range(..m.end).next_back()
            && owner.overlaps(m)
        {
            tracing::trace!(
                absorbed = %m.matched_text,
                by = %owner.matched_text,
                "overlapping match absorbed"
            );
            continue;
        }
        claimed.insert(m.start, m);
    }

    let mut index: HashMap<CitationKey, usize> = HashMap::new();
    let mut occurrences: Vec<Occurrence> = Vec::new();
    for m in claimed.into_values() {
        let citation = CanonicalCitation::from_match(m, case_sensitive);
        if let Some(&i) = index.get(&citation.key) {
            tracing::trace!(key = %citation.key, text = %m.matched_text, "repeat mention merged");
            occurrences[i].mentions += 1;
            continue;
        }
        index.insert(citation.key.clone(), occurrences.len());
        occurrences.push(Occurrence {
            citation,
            original_text: m.matched_text.clone(),
            span: m.span(),
            mentions: 1,
        });
    }
    occurrences
}
