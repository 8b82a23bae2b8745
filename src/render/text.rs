//! Plain-text artifact.
//!
//! ```text
//! Generated on: 2024-05-01 14:03:22
//!
//! Q1: What is 2+2?
//! A) 3
//! B) 4
//! Correct Answer: B
//!
//! Q2: ...
//! ```
//!
//! Output is UTF-8 and carries the full extracted content; nothing is
//! transcoded.
//!
//! Options are written verbatim with no highlight marker. Plain text has no
//! styling, so the correct option is identified only by the trailing
//! `Correct Answer:` line.

use crate::model::McqBatch;

/// Render the batch as UTF-8 text.
pub fn render_text(batch: &McqBatch) -> String {
    let mut out = batch.timestamp_line();
    out.push_str("\n\n");

    let blocks: Vec<String> = batch
        .records
        .iter()
        .map(|record| {
            let mut lines = Vec::with_capacity(record.options.len() + 2);
            lines.push(record.heading());
            lines.extend(record.options.iter().map(|o| o.text.clone()));
            lines.push(record.answer_line());
            lines.join("\n")
        })
        .collect();

    out.push_str(&blocks.join("\n\n"));
    if !blocks.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::parse;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 3, 22))
            .unwrap()
    }

    #[test]
    fn renders_records_in_order() {
        let raw = "## MCQ\nQuestion: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B\n\
                   ## MCQ\nQuestion: Capital?\n1) Paris\n2) Rome";
        let text = render_text(&parse(raw, at()));
        assert_eq!(
            text,
            "Generated on: 2024-05-01 14:03:22\n\n\
             Q1: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B\n\n\
             Q2: Capital?\nParis\nRome\nCorrect Answer: None\n"
        );
    }

    #[test]
    fn empty_batch_has_header_only() {
        let text = render_text(&parse("no markers here", at()));
        assert_eq!(text, "Generated on: 2024-05-01 14:03:22\n\n");
    }

    #[test]
    fn non_latin_text_survives() {
        let raw = "## MCQ\nQuestion: Что такое π?\nA) 3.14…\nCorrect Answer: A";
        let text = render_text(&parse(raw, at()));
        assert!(text.contains("Q1: Что такое π?"));
        assert!(text.contains("A) 3.14…"));
    }

    #[test]
    fn correct_option_is_written_unmarked() {
        let batch = parse("## MCQ\nQuestion: Q\nA) 3\nB) 4\nCorrect Answer: B", at());
        let text = render_text(&batch);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(&lines[2..], ["Q1: Q", "A) 3", "B) 4", "Correct Answer: B"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let batch = parse("## MCQ\nQuestion: Q\nA) a\nCorrect Answer: A", at());
        assert_eq!(render_text(&batch), render_text(&batch));
    }
}
