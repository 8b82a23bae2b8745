//! PDF artifact.
//!
//! This module decides how each line of the batch looks; placing the lines
//! on pages is left to [`super::flow::FlowDocument`].
//!
//! | Block | Font | Colour |
//! |-------|------|--------|
//! | title | bold 16, centred | black |
//! | `Q{n}: question` | bold 12 | black |
//! | option | regular 12 | black |
//! | correct option | bold 12 | green |
//! | `Correct Answer: X` | bold 12 | green |
//! | `Generated on: …` trailer | regular 10 | black |
//!
//! The standard fonts can only show WinAnsi characters. Everything else is
//! replaced by `?` and the loss is logged as a warning; rendering never
//! fails because of the text content.

use super::flow::{FlowDocument, Style, PLACEHOLDER};
use super::{ArtifactFormat, CORRECT_RGB, DOCUMENT_TITLE};
use crate::error::RenderError;
use crate::model::McqBatch;
use tracing::{debug, warn};

const TITLE: Style = Style::regular(16.0).bold().centred();
const HEADING: Style = Style::regular(12.0).bold();
const OPTION: Style = Style::regular(12.0);
const HIGHLIGHT: Style = Style::regular(12.0).bold().coloured(CORRECT_RGB);
const TRAILER: Style = Style::regular(10.0);

/// Render the batch as PDF bytes.
pub fn render_pdf(batch: &McqBatch) -> Result<Vec<u8>, RenderError> {
    let mut doc = FlowDocument::new();

    doc.paragraph(DOCUMENT_TITLE, TITLE);
    doc.gap(14.0);
    for record in &batch.records {
        doc.paragraph(&record.heading(), HEADING);
        doc.gap(4.0);
        for option in &record.options {
            let style = if record.is_correct(option) {
                HIGHLIGHT
            } else {
                OPTION
            };
            doc.paragraph(&option.text, style);
            doc.gap(2.0);
        }
        doc.paragraph(&record.answer_line(), HIGHLIGHT);
        doc.gap(16.0);
    }
    doc.paragraph(&batch.timestamp_line(), TRAILER);

    if doc.replaced_chars() > 0 {
        warn!(
            "PDF: {} characters not representable in WinAnsi were replaced with '{}'",
            doc.replaced_chars(),
            PLACEHOLDER as char
        );
    }
    debug!("PDF layout: {} records on {} pages", batch.len(), doc.page_count());

    doc.finish(DOCUMENT_TITLE, batch.generated_at)
        .map_err(|detail| RenderError::Layout {
            format: ArtifactFormat::Pdf,
            detail,
        })
}

#[cfg(test)]
pub(crate) mod inspect {
    //! Read back what [`super::render_pdf`] drew, for assertions.

    use crate::render::flow::Weight;
    use lopdf::{Document, Object};

    #[derive(Debug, Clone, PartialEq)]
    pub struct DrawnLine {
        pub page: usize,
        pub text: String,
        pub bold: bool,
        pub rgb: [u8; 3],
    }

    fn number(o: &Object) -> f32 {
        match o {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r as f32,
            _ => f32::NAN,
        }
    }

    pub fn drawn_lines(bytes: &[u8]) -> Vec<DrawnLine> {
        let doc = Document::load_mem(bytes).expect("valid PDF");
        let bold_font = Weight::Bold.resource_name().as_bytes();
        let mut out = Vec::new();
        for (page_no, (_, page_id)) in doc.get_pages().into_iter().enumerate() {
            let content = doc.get_and_decode_page_content(page_id).expect("content");
            let mut bold = false;
            let mut rgb = [0u8; 3];
            for op in content.operations {
                match op.operator.as_str() {
                    "Tf" => bold = op.operands[0].as_name().ok() == Some(bold_font),
                    "rg" => {
                        for (i, o) in op.operands.iter().take(3).enumerate() {
                            rgb[i] = (number(o) * 255.0).round() as u8;
                        }
                    }
                    "Tj" => {
                        if let Object::String(bytes, _) = &op.operands[0] {
                            out.push(DrawnLine {
                                page: page_no + 1,
                                text: bytes.iter().map(|&b| b as char).collect(),
                                bold,
                                rgb,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::inspect::drawn_lines;
    use super::*;
    use crate::pipeline::parse::parse;
    use chrono::NaiveDate;

    const BLACK: [u8; 3] = [0, 0, 0];

    fn at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 3, 22))
            .unwrap()
    }

    const SAMPLE: &str =
        "## MCQ\nQuestion: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B";

    #[test]
    fn starts_with_pdf_header() {
        let bytes = render_pdf(&parse(SAMPLE, at())).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn correct_option_is_bold_green() {
        let lines = drawn_lines(&render_pdf(&parse(SAMPLE, at())).unwrap());
        let find = |t: &str| lines.iter().find(|l| l.text == t).cloned().unwrap();

        assert_eq!(lines[0].text, "Generated MCQs");
        assert!(find("Q1: What is 2+2?").bold);
        assert_eq!(find("Q1: What is 2+2?").rgb, BLACK);

        let right = find("B) 4");
        assert!(right.bold);
        assert_eq!(right.rgb, CORRECT_RGB);

        for wrong in ["A) 3", "C) 5", "D) 6"] {
            let l = find(wrong);
            assert!(!l.bold, "{wrong} should be regular");
            assert_eq!(l.rgb, BLACK);
        }

        let answer = find("Correct Answer: B");
        assert!(answer.bold);
        assert_eq!(answer.rgb, CORRECT_RGB);
        assert_eq!(lines.last().unwrap().text, "Generated on: 2024-05-01 14:03:22");
    }

    #[test]
    fn numeric_answer_highlights_the_stripped_option() {
        let raw = "## MCQ\nQuestion: Capital of France?\n1) Paris\n2) Rome\nCorrect Answer: 1";
        let lines = drawn_lines(&render_pdf(&parse(raw, at())).unwrap());
        let find = |t: &str| lines.iter().find(|l| l.text == t).cloned().unwrap();

        assert!(lines.iter().all(|l| !l.text.starts_with("1)")));
        let paris = find("Paris");
        assert!(paris.bold);
        assert_eq!(paris.rgb, CORRECT_RGB);
        let rome = find("Rome");
        assert!(!rome.bold);
        assert_eq!(rome.rgb, BLACK);
        assert_eq!(find("Correct Answer: 1").rgb, CORRECT_RGB);
    }

    #[test]
    fn same_batch_renders_identical_bytes() {
        let batch = parse(SAMPLE, at());
        assert_eq!(render_pdf(&batch).unwrap(), render_pdf(&batch).unwrap());
    }

    #[test]
    fn long_batches_paginate() {
        let raw: String = (0..40)
            .map(|i| {
                format!(
                    "## MCQ\nQuestion: Question number {i}?\nA) a\nB) b\nC) c\nD) d\n\
                     Correct Answer: C\n"
                )
            })
            .collect();
        let lines = drawn_lines(&render_pdf(&parse(&raw, at())).unwrap());
        let last_page = lines.iter().map(|l| l.page).max().unwrap();
        assert!(last_page > 1, "expected several pages");
        let headings: Vec<&str> = lines
            .iter()
            .filter(|l| l.text.starts_with('Q'))
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headings.len(), 40);
        assert_eq!(headings[39], "Q40: Question number 39?");
    }

    #[test]
    fn option_spacing_is_kept() {
        let raw = "## MCQ\nQuestion: Q\nA) x  =  1\nCorrect Answer: B";
        let lines = drawn_lines(&render_pdf(&parse(raw, at())).unwrap());
        assert!(lines.iter().any(|l| l.text == "A) x  =  1"));
    }

    #[test]
    fn unrepresentable_chars_become_placeholder() {
        let raw = "## MCQ\nQuestion: Что “π”?\nA) café\nCorrect Answer: A";
        let lines = drawn_lines(&render_pdf(&parse(raw, at())).unwrap());
        assert!(lines.iter().any(|l| l.text == "Q1: ??? \u{93}?\u{94}?"));
        assert!(lines.iter().any(|l| l.text == "A) café"));
    }
}
