//! Rendering of retrieved professor records into prompt context.

use profrag_core::types::RetrievedRecord;

/// First line of every non-empty context block.
pub const CONTEXT_HEADER: &str = "Returned results from vector db (done automatically):";

/// Render records as labeled blocks, in the order given.
///
/// Empty input renders as an empty string. Absent metadata fields are left
/// out of a record's block. `Review:` only appears when the record carries
/// review text of its own.
pub fn format_context(records: &[RetrievedRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut out = format!("\n\n{CONTEXT_HEADER}\n");
    for record in records {
        out.push_str(&format!("\nProfessor: {}\n", record.id));
        if let Some(subject) = record.subject() {
            out.push_str(&format!("Subject: {subject}\n"));
        }
        if let Some(stars) = record.stars() {
            out.push_str(&format!("Stars: {stars}\n"));
        }
        if let Some(review) = record.review() {
            out.push_str(&format!("Review: {review}\n"));
        }
    }
    out
}

/// The user's text followed by the rendered context.
pub fn augment(original: &str, records: &[RetrievedRecord]) -> String {
    let mut text = String::from(original);
    text.push_str(&format_context(records));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(id: &str, metadata: Value) -> RetrievedRecord {
        RetrievedRecord::new(id, metadata.as_object().cloned().unwrap_or_default())
    }

    fn sample() -> Vec<RetrievedRecord> {
        vec![
            record("Prof A", json!({"subject": "CS101", "stars": 4.8})),
            record("Prof B", json!({"subject": "CS101", "stars": 4.2})),
        ]
    }

    #[test]
    fn test_empty_records_render_nothing() {
        assert_eq!(format_context(&[]), "");
        assert_eq!(augment("Who is good?", &[]), "Who is good?");
    }

    #[test]
    fn test_records_in_order() {
        let text = format_context(&sample());
        assert!(text.contains(CONTEXT_HEADER));

        let a = text.find("Professor: Prof A").unwrap();
        let a_stars = text.find("Stars: 4.8").unwrap();
        let b = text.find("Professor: Prof B").unwrap();
        let b_stars = text.find("Stars: 4.2").unwrap();
        assert!(a < a_stars && a_stars < b && b < b_stars);
        assert_eq!(text.matches("Subject: CS101").count(), 2);
    }

    #[test]
    fn test_deterministic() {
        let records = sample();
        assert_eq!(format_context(&records), format_context(&records));
    }

    #[test]
    fn test_augment_keeps_question_first() {
        let question = "Who teaches a great intro algorithms course?";
        let text = augment(question, &sample());
        assert!(text.starts_with(question));
        assert!(text.ends_with(&format_context(&sample())));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let text = format_context(&[record("Prof C", json!({}))]);
        assert!(text.contains("Professor: Prof C"));
        assert!(!text.contains("Subject:"));
        assert!(!text.contains("Stars:"));
    }

    #[test]
    fn test_review_only_from_review_field() {
        let no_review = format_context(&sample());
        assert!(!no_review.contains("Review:"));

        let with_review = format_context(&[record(
            "Prof D",
            json!({"subject": "MATH200", "stars": 5, "review": "Tough but fair."}),
        )]);
        assert!(with_review.contains("Review: Tough but fair."));
        assert!(with_review.contains("Stars: 5"));
    }

    #[test]
    fn test_string_stars_render_unquoted() {
        let text = format_context(&[record("Prof E", json!({"stars": "4.5"}))]);
        assert!(text.contains("Stars: 4.5\n"));
    }
}
