//! DOCX artifact: a minimal WordprocessingML package written with `zip`.
//!
//! Package parts:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! word/document.xml
//! docProps/core.xml
//! ```
//!
//! Body layout: centred bold title, centred timestamp, then one paragraph
//! per heading, option and answer line with an empty paragraph between
//! records, and the timestamp again at the end. The correct option and the
//! answer line are bold green; the heading is bold.
//!
//! Text is written as UTF-8 so any script survives. Characters that XML 1.0
//! cannot carry (C0 controls other than tab/newline) are dropped.

use super::{ArtifactFormat, CORRECT_RGB, DOCUMENT_TITLE};
use crate::error::RenderError;
use crate::model::McqBatch;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Body text size in half-points (12pt).
const BODY_SIZE: u32 = 24;
/// Title size in half-points (14pt).
const TITLE_SIZE: u32 = 28;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

/// A single-run paragraph.
#[derive(Debug, Clone, Default)]
struct Para {
    text: String,
    bold: bool,
    colour: Option<[u8; 3]>,
    size: u32,
    centred: bool,
}

impl Para {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: BODY_SIZE,
            ..Default::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn green(mut self) -> Self {
        self.colour = Some(CORRECT_RGB);
        self
    }

    fn centred(mut self) -> Self {
        self.centred = true;
        self
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:p>");
        if self.centred {
            out.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
        }
        if !self.text.is_empty() {
            out.push_str("<w:r><w:rPr>");
            if self.bold {
                out.push_str("<w:b/>");
            }
            if let Some([r, g, b]) = self.colour {
                out.push_str(&format!(r#"<w:color w:val="{r:02X}{g:02X}{b:02X}"/>"#));
            }
            out.push_str(&format!(r#"<w:sz w:val="{}"/>"#, self.size));
            out.push_str(r#"</w:rPr><w:t xml:space="preserve">"#);
            out.push_str(&escape_xml(&self.text));
            out.push_str("</w:t></w:r>");
        }
        out.push_str("</w:p>");
    }
}

fn paragraphs(batch: &McqBatch) -> Vec<Para> {
    let stamp = batch.timestamp_line();
    let mut paras = vec![
        Para {
            size: TITLE_SIZE,
            ..Para::body(DOCUMENT_TITLE)
        }
        .bold()
        .centred(),
        Para::body(stamp.clone()).centred(),
        Para::default(),
    ];

    for record in &batch.records {
        paras.push(Para::body(record.heading()).bold());
        for option in &record.options {
            let para = Para::body(option.text.clone());
            paras.push(if record.is_correct(option) {
                para.bold().green()
            } else {
                para
            });
        }
        paras.push(Para::body(record.answer_line()).bold().green());
        paras.push(Para::default());
    }

    paras.push(Para::body(stamp).centred());
    paras
}

fn document_xml(batch: &McqBatch) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(&format!(r#"<w:document xmlns:w="{W_NS}"><w:body>"#));
    for para in paragraphs(batch) {
        para.write_xml(&mut out);
    }
    out.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
    );
    out.push_str("</w:body></w:document>");
    out
}

fn core_xml(batch: &McqBatch) -> String {
    let created = batch.generated_at.format("%Y-%m-%dT%H:%M:%S");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>edgequake-mcq</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created></cp:coreProperties>"#,
        escape_xml(DOCUMENT_TITLE)
    )
}

/// Render the batch as DOCX bytes.
pub fn render_docx(batch: &McqBatch) -> Result<Vec<u8>, RenderError> {
    let layout = |detail: String| RenderError::Layout {
        format: ArtifactFormat::Docx,
        detail,
    };

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/document.xml", document_xml(batch)),
        ("docProps/core.xml", core_xml(batch)),
    ];

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(entry_time(batch.generated_at));
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)
            .map_err(|e| layout(format!("{name}: {e}")))?;
        zip.write_all(body.as_bytes())
            .map_err(|e| layout(format!("{name}: {e}")))?;
    }
    let cursor = zip.finish().map_err(|e| layout(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Zip entry timestamp taken from the batch, so output depends on the batch only.
fn entry_time(at: NaiveDateTime) -> zip::DateTime {
    zip::DateTime::from_date_and_time(
        u16::try_from(at.year()).unwrap_or(1980),
        at.month() as u8,
        at.day() as u8,
        at.hour() as u8,
        at.minute() as u8,
        at.second() as u8,
    )
    .unwrap_or_default()
}

/// Escape XML special characters and drop characters XML 1.0 forbids.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::docx_paragraphs;
    use crate::pipeline::parse::parse;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 3, 22))
            .unwrap()
    }

    fn document_part(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    /// The `<w:p>` element whose text is exactly `text`.
    fn paragraph_xml<'a>(xml: &'a str, text: &str) -> &'a str {
        let needle = format!(r#"<w:t xml:space="preserve">{text}</w:t>"#);
        xml.split("<w:p>")
            .find(|p| p.contains(&needle))
            .unwrap_or_else(|| panic!("no paragraph {text:?}"))
    }

    const SAMPLE: &str =
        "## MCQ\nQuestion: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B";

    #[test]
    fn package_has_all_parts() {
        let bytes = render_docx(&parse(SAMPLE, at())).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/document.xml"
            ]
        );
    }

    #[test]
    fn paragraphs_in_order() {
        let xml = document_part(&render_docx(&parse(SAMPLE, at())).unwrap());
        let paras = docx_paragraphs(&xml).unwrap();
        assert_eq!(
            paras,
            vec![
                "Generated MCQs",
                "Generated on: 2024-05-01 14:03:22",
                "",
                "Q1: What is 2+2?",
                "A) 3",
                "B) 4",
                "C) 5",
                "D) 6",
                "Correct Answer: B",
                "",
                "Generated on: 2024-05-01 14:03:22",
            ]
        );
    }

    #[test]
    fn correct_option_is_bold_green() {
        let xml = document_part(&render_docx(&parse(SAMPLE, at())).unwrap());

        let right = paragraph_xml(&xml, "B) 4");
        assert!(right.contains("<w:b/>"));
        assert!(right.contains(r#"<w:color w:val="008000"/>"#));

        for wrong in ["A) 3", "C) 5", "D) 6"] {
            let p = paragraph_xml(&xml, wrong);
            assert!(!p.contains("<w:b/>"), "{wrong} should not be bold");
            assert!(!p.contains("w:color"), "{wrong} should not be coloured");
        }

        let answer = paragraph_xml(&xml, "Correct Answer: B");
        assert!(answer.contains("<w:b/>") && answer.contains("008000"));

        let heading = paragraph_xml(&xml, "Q1: What is 2+2?");
        assert!(heading.contains("<w:b/>") && !heading.contains("w:color"));

        let title = paragraph_xml(&xml, "Generated MCQs");
        assert!(title.contains(r#"<w:jc w:val="center"/>"#));
        assert!(title.contains(r#"<w:sz w:val="28"/>"#));
    }

    #[test]
    fn missing_answer_highlights_nothing() {
        let raw = "## MCQ\nQuestion: Capital?\nA) Paris\nB) Rome";
        let xml = document_part(&render_docx(&parse(raw, at())).unwrap());
        assert!(xml.contains("Correct Answer: None"));
        assert!(!paragraph_xml(&xml, "A) Paris").contains("w:color"));
        assert!(!paragraph_xml(&xml, "B) Rome").contains("w:color"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let raw =
            "## MCQ\nQuestion: Is 1 < 2 & \"true\"?\nA) Yes \u{1} ok\nB) Что\nCorrect Answer: A";
        let xml = document_part(&render_docx(&parse(raw, at())).unwrap());
        let paras = docx_paragraphs(&xml).unwrap();
        assert!(paras.contains(&"Q1: Is 1 < 2 & \"true\"?".to_string()));
        assert!(paras.contains(&"A) Yes  ok".to_string()));
        assert!(paras.contains(&"B) Что".to_string()));
    }

    #[test]
    fn empty_batch_is_still_a_document() {
        let xml = document_part(&render_docx(&parse("", at())).unwrap());
        let paras = docx_paragraphs(&xml).unwrap();
        assert_eq!(paras.first().map(String::as_str), Some("Generated MCQs"));
        assert_eq!(
            paras.last().map(String::as_str),
            Some("Generated on: 2024-05-01 14:03:22")
        );
    }

    #[test]
    fn numeric_answer_highlights_the_stripped_option() {
        let raw = "## MCQ\nQuestion: Capital of France?\n1) Paris\n2) Rome\nCorrect Answer: 1";
        let xml = document_part(&render_docx(&parse(raw, at())).unwrap());
        let paras = docx_paragraphs(&xml).unwrap();
        assert!(paras.contains(&"Paris".to_string()));
        assert!(!paras.iter().any(|p| p.starts_with("1)") || p.starts_with("2)")));

        let paris = paragraph_xml(&xml, "Paris");
        assert!(paris.contains("<w:b/>") && paris.contains("008000"));
        let rome = paragraph_xml(&xml, "Rome");
        assert!(!rome.contains("<w:b/>") && !rome.contains("w:color"));
    }

    #[test]
    fn same_batch_renders_identical_bytes() {
        let batch = parse(SAMPLE, at());
        assert_eq!(render_docx(&batch).unwrap(), render_docx(&batch).unwrap());
    }

    #[test]
    fn entries_carry_the_batch_time() {
        let bytes = render_docx(&parse(SAMPLE, at())).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_name("word/document.xml").unwrap();
        let t = entry.last_modified().unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 5, 1));
        assert_eq!((t.hour(), t.minute(), t.second()), (14, 3, 22));
    }
}
