use serde::Serialize;

use crate::patterns::{PatternShape, first_surname};

/// One textual citation mention found by a single pattern shape.
///
/// Offsets are byte offsets into the checked text, so
/// `&text[m.start..m.end] == m.matched_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawMatch {
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
    pub shape: PatternShape,
    pub surname: String,
    pub year: String,
}

impl RawMatch {
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Half-open interval intersection.
    pub fn overlaps(&self, other: &RawMatch) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Find every citation-shaped substring of `text`.
///
/// Each shape scans the whole text left to right; shapes run in precedence
/// order. Overlapping matches from different shapes are all returned.
pub fn extract(text: &str) -> Vec<RawMatch> {
    let mut matches = Vec::new();

    for shape in PatternShape::ALL {
        for caps in shape.regex().captures_iter(text) {
            let (Some(whole), Some(authors), Some(year)) =
                (caps.get(0), caps.name("authors"), caps.name("year"))
            else {
                continue;
            };
            let Some(surname) = first_surname(authors.as_str()) else {
                continue;
            };
            matches.push(RawMatch {
                matched_text: whole.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
                shape,
                surname: surname.to_string(),
                year: year.as_str().to_string(),
            });
        }
    }

    tracing::debug!(
        matches = matches.len(),
        bytes = text.len(),
        "citation candidates extracted"
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn prose_without_citations_yields_nothing() {
        assert!(extract("This is just regular text without any academic references.").is_empty());
        assert!(extract("the (2020) study was cited in (2021).").is_empty());
    }

    #[test]
    fn spans_index_into_text() {
        let text = "As argued by Smith (2020), the trend holds.";
        let matches = extract(text);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(&text[m.start..m.end], "Smith (2020)");
        assert_eq!(m.matched_text, "Smith (2020)");
        assert_eq!(m.shape, PatternShape::SingleParen);
        assert_eq!(m.surname, "Smith");
        assert_eq!(m.year, "2020");
    }

    #[test]
    fn spans_are_byte_offsets_after_multibyte_text() {
        let text = "Über alles: Müller (2019).";
        let matches = extract(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "Müller (2019)");
    }

    #[test]
    fn overlapping_shapes_are_all_reported() {
        let matches = extract("Johnson & Williams (2025) is fake.");
        let shapes: Vec<_> = matches.iter().map(|m| m.shape).collect();
        assert_eq!(
            shapes,
            vec![PatternShape::AmpersandParen, PatternShape::SingleParen]
        );
        assert_eq!(matches[0].surname, "Johnson");
        assert_eq!(matches[1].surname, "Williams");
        assert!(matches[0].overlaps(&matches[1]));
    }

    #[test]
    fn matches_grouped_by_shape_in_precedence_order() {
        let text = "(Brown, 2018) then Smith (2020) then Lee et al. (2021).";
        let shapes: Vec<_> = extract(text).iter().map(|m| m.shape).collect();
        assert_eq!(
            shapes,
            vec![
                PatternShape::EtAlParen,
                PatternShape::SingleParen,
                PatternShape::ParenSingleComma,
            ]
        );
    }

    #[test]
    fn extraction_is_repeatable() {
        let text = "Smith (2020), (Jones et al., 2019) and Lee & Park (2018).";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn disjoint_spans_do_not_overlap() {
        let matches = extract("Smith (2020) and Smith (2020)");
        assert_eq!(matches.len(), 2);
        assert!(!matches[0].overlaps(&matches[1]));
    }
}
