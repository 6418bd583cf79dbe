use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A single author token: uppercase initial, lowercase final letter, with
/// inner capitals, apostrophes and hyphens allowed ("McDonald", "O'Neil").
pub(crate) const NAME: &str = r"\p{Lu}[\p{L}'’\-]*\p{Ll}";

/// The citation shapes recognized in running text.
///
/// Declaration order is precedence order: when spans from two shapes overlap,
/// the earlier shape wins. The derived `Ord` follows the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternShape {
    /// `Smith et al. (2023)`
    EtAlParen,
    /// `Johnson & Williams (2025)` or `Kahneman and Tversky (1979)`
    AmpersandParen,
    /// `Smith (2023)`
    SingleParen,
    /// `(Smith et al., 2023)`
    ParenEtAlComma,
    /// `(Smith, 2023)` or `(Wilson & Chen, 2022)`
    ParenSingleComma,
}

static ET_AL_PAREN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<authors>{NAME}(?:(?:\s*&\s*|\s+and\s+){NAME})*),?\s+et\s+al\.?\s*\((?P<year>[0-9]{{4}})\)"
    ))
    .unwrap()
});

static AMPERSAND_PAREN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<authors>{NAME}(?:\s*&\s*|\s+and\s+){NAME})\s*\((?P<year>[0-9]{{4}})\)"
    ))
    .unwrap()
});

static SINGLE_PAREN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<authors>{NAME})\s*\((?P<year>[0-9]{{4}})\)"
    ))
    .unwrap()
});

static PAREN_ET_AL_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\((?P<authors>{NAME}(?:\s*&\s*{NAME}|\s+and\s+{NAME})?)\s+et\s+al\.?,\s*(?P<year>[0-9]{{4}})\)"
    ))
    .unwrap()
});

static PAREN_SINGLE_COMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\((?P<authors>{NAME}(?:\s*&\s*{NAME}|\s+and\s+{NAME})?),\s*(?P<year>[0-9]{{4}})\)"
    ))
    .unwrap()
});

static LEADING_SURNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NAME}")).unwrap());

impl PatternShape {
    /// Every shape, in precedence order.
    pub const ALL: [PatternShape; 5] = [
        PatternShape::EtAlParen,
        PatternShape::AmpersandParen,
        PatternShape::SingleParen,
        PatternShape::ParenEtAlComma,
        PatternShape::ParenSingleComma,
    ];

    /// Compiled matcher. Captures `authors` and `year`.
    pub fn regex(self) -> &'static Regex {
        match self {
            Self::EtAlParen => &ET_AL_PAREN_RE,
            Self::AmpersandParen => &AMPERSAND_PAREN_RE,
            Self::SingleParen => &SINGLE_PAREN_RE,
            Self::ParenEtAlComma => &PAREN_ET_AL_COMMA_RE,
            Self::ParenSingleComma => &PAREN_SINGLE_COMMA_RE,
        }
    }

    /// Whether the shape cites a work with more authors than it names.
    pub fn is_et_al(self) -> bool {
        matches!(self, Self::EtAlParen | Self::ParenEtAlComma)
    }
}

/// Surname of the first author in an author segment.
///
/// The segment must open with an author token; connectives ("and", "&",
/// commas) and trailing "et al." are never part of the result. A possessive
/// `'s` is dropped, so "Smith's" keys as "Smith".
pub fn first_surname(segment: &str) -> Option<&str> {
    let name = LEADING_SURNAME_RE.find(segment.trim_start())?.as_str();
    let stem = name
        .strip_suffix("'s")
        .or_else(|| name.strip_suffix("’s"))
        .filter(|stem| stem.chars().last().is_some_and(char::is_lowercase));
    Some(stem.unwrap_or(name))
}
