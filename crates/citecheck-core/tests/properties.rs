use citecheck_core::{CitationDatabase, classify, extract};
use proptest::prelude::*;

fn sample_db() -> CitationDatabase {
    let mut db = CitationDatabase::default();
    db.add_verified("Smith", "2020");
    db.add_suspicious("Fake", "2021", "fabricated");
    db
}

proptest! {
    #[test]
    fn classify_is_deterministic(text in ".{0,300}") {
        let db = sample_db();
        let first = serde_json::to_string(&classify(&text, &db)).unwrap();
        let second = serde_json::to_string(&classify(&text, &db)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn extraction_is_idempotent(text in "[A-Za-z0-9 ().,&;]{0,300}") {
        prop_assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn text_without_capitals_has_no_citations(text in "[a-z0-9 ().,&;]{0,300}") {
        let report = classify(&text, &sample_db());
        prop_assert_eq!(report.citations_found, 0);
        prop_assert!(report.all_clear);
    }

    #[test]
    fn repeats_collapse_to_one_result(
        surname in "[A-Z][a-z]{2,10}",
        year in "[0-9]{4}",
        n in 1usize..10,
    ) {
        let text = format!("{surname} ({year}). ").repeat(n);
        let report = classify(&text, &CitationDatabase::default());
        prop_assert_eq!(report.citations_found, 1);
        prop_assert_eq!(report.results[0].occurrences, n);
    }

    #[test]
    fn spans_slice_original_text(text in "[A-Za-zü ().,&]{0,200}") {
        for m in extract(&text) {
            prop_assert_eq!(&text[m.start..m.end], m.matched_text.as_str());
        }
    }
}
