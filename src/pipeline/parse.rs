//! MCQ markup parser: raw model output → [`McqRecord`]s.
//!
//! ## Wire format
//!
//! The prompt in [`crate::prompts`] asks the model for blocks of the form
//!
//! ```text
//! ## MCQ
//! Question: What is 2+2?
//! A) 3
//! B) 4
//! C) 5
//! D) 6
//! Correct Answer: B
//! ```
//!
//! The tokens below are a private contract between that prompt and this
//! parser. Changing one side without the other does not fail loudly: the
//! parser simply finds zero blocks or zero labels.
//!
//! ## Tolerance
//!
//! Parsing never fails. Blank blocks are skipped, a missing `Question:`
//! label falls back to the raw first line, and a missing `Correct Answer:`
//! line leaves the answer empty. Each block keeps the index of its position
//! in the split sequence, so skipping a blank block leaves a gap in the
//! numbering of the records after it.
//!
//! Lines are classified into a small grammar ([`MarkupLine`]) before the
//! block is assembled, so recognising another label is a change to
//! [`Label`] and [`classify`] only.

use crate::model::{McqBatch, McqRecord, OptionLine};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Marker preceding every question block.
pub const BLOCK_MARKER: &str = "## MCQ";

/// Field labels recognised inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Question,
    CorrectAnswer,
}

impl Label {
    /// The literal token as it appears in the markup.
    pub const fn token(self) -> &'static str {
        match self {
            Label::Question => "Question:",
            Label::CorrectAnswer => "Correct Answer:",
        }
    }
}

/// One classified line of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupLine<'a> {
    /// A labelled field and its trimmed value.
    Label(Label, &'a str),
    /// Any other non-blank line, trimmed.
    Option(&'a str),
    Blank,
}

/// Classify a single line.
///
/// `Correct Answer:` wins over `Question:` when a line contains both. Its
/// value is everything after the *last* colon; the question value is
/// everything after the *first* `Question:`.
pub fn classify(line: &str) -> MarkupLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return MarkupLine::Blank;
    }
    if trimmed.contains(Label::CorrectAnswer.token()) {
        let value = trimmed.rsplit(':').next().unwrap_or_default().trim();
        return MarkupLine::Label(Label::CorrectAnswer, value);
    }
    if let Some((_, value)) = trimmed.split_once(Label::Question.token()) {
        return MarkupLine::Label(Label::Question, value.trim());
    }
    MarkupLine::Option(trimmed)
}

/// Parse `raw` and stamp the batch with `generated_at`.
pub fn parse(raw: &str, generated_at: NaiveDateTime) -> McqBatch {
    McqBatch::new(parse_records(raw), generated_at)
}

/// Parse `raw` into records, in source order.
pub fn parse_records(raw: &str) -> Vec<McqRecord> {
    let cleaned = raw.replace('\r', "");
    let cleaned = cleaned.trim();

    let records: Vec<McqRecord> = cleaned
        .split(BLOCK_MARKER)
        .enumerate()
        // segment 0 is the preamble before the first marker
        .skip(1)
        .filter_map(|(index, block)| {
            let record = parse_block(index, block);
            if record.is_none() {
                debug!("Skipping blank MCQ block at position {}", index);
            }
            record
        })
        .collect();

    debug!("Parsed {} MCQ records", records.len());
    records
}

fn parse_block(index: usize, block: &str) -> Option<McqRecord> {
    let block = block.trim();
    let mut lines = block.lines();
    let first = lines.next()?;

    let correct_answer = block
        .lines()
        .find_map(|line| match classify(line) {
            MarkupLine::Label(Label::CorrectAnswer, value) => Some(value),
            _ => None,
        })
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let question = match classify(first) {
        MarkupLine::Label(Label::Question, value) if !value.is_empty() => value,
        _ => first.trim(),
    }
    .to_string();

    let options = lines
        .filter_map(|line| match classify(line) {
            MarkupLine::Blank | MarkupLine::Label(Label::CorrectAnswer, _) => None,
            MarkupLine::Label(Label::Question, _) | MarkupLine::Option(_) => {
                Some(option_line(line.trim()))
            }
        })
        .collect();

    Some(McqRecord {
        index,
        question,
        options,
        correct_answer,
    })
}

static RE_ENUMERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]|[0-9]+)\)").unwrap());

static RE_NUMERIC_ENUMERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]\)").unwrap());

/// Build an option from a trimmed line, stripping a `<digit>)` enumerator
/// from the display text.
fn option_line(raw: &str) -> OptionLine {
    let label = RE_ENUMERATOR
        .captures(raw)
        .map(|caps| caps[1].to_string());
    let text = match RE_NUMERIC_ENUMERATOR.find(raw) {
        Some(m) => raw[m.end()..].trim().to_string(),
        None => raw.to_string(),
    };
    OptionLine {
        label,
        text,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(record: &McqRecord) -> Vec<&str> {
        record.options.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn no_marker_yields_no_records() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("   \n\t  ").is_empty());
        assert!(parse_records("Question: What?\nA) x\nCorrect Answer: A").is_empty());
    }

    #[test]
    fn single_well_formed_block() {
        let raw = "## MCQ\nQuestion: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B";
        let records = parse_records(raw);
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.index, 1);
        assert_eq!(r.question, "What is 2+2?");
        assert_eq!(texts(r), vec!["A) 3", "B) 4", "C) 5", "D) 6"]);
        assert_eq!(r.correct_answer.as_deref(), Some("B"));
        assert_eq!(r.options[1].label.as_deref(), Some("B"));
        assert_eq!(r.correct_option().map(|o| o.text.as_str()), Some("B) 4"));
    }

    #[test]
    fn blank_block_keeps_split_position() {
        let raw = "## MCQ\n\n## MCQ\nQuestion: X\nA) y\nCorrect Answer: A";
        let records = parse_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 2);
        assert_eq!(records[0].question, "X");
    }

    #[test]
    fn preamble_is_discarded() {
        let raw = "Here are your questions:\n## MCQ\nQuestion: Q\nA) a\nCorrect Answer: A";
        let records = parse_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 1);
    }

    #[test]
    fn missing_answer_line() {
        let raw = "## MCQ\nQuestion: Capital of France?\nA) Paris\nB) Rome";
        let r = &parse_records(raw)[0];
        assert_eq!(r.correct_answer, None);
        assert!(r.options.iter().all(|o| !r.is_correct(o)));
    }

    #[test]
    fn empty_answer_value_is_absent() {
        let raw = "## MCQ\nQuestion: Q\nA) a\nCorrect Answer:   ";
        assert_eq!(parse_records(raw)[0].correct_answer, None);
    }

    #[test]
    fn question_label_absent_uses_first_line() {
        let raw = "## MCQ\n  Which planet is red?  \nA) Mars\nCorrect Answer: A";
        assert_eq!(parse_records(raw)[0].question, "Which planet is red?");
    }

    #[test]
    fn question_takes_text_after_first_label() {
        let raw = "## MCQ\n1. Question: Define Question: marks\nA) x";
        assert_eq!(parse_records(raw)[0].question, "Define Question: marks");
    }

    #[test]
    fn numeric_enumerators_are_stripped_but_highlight_uses_raw() {
        let raw = "## MCQ\nQuestion: Capital?\n1) Paris\n2) Rome\nCorrect Answer: 1";
        let r = &parse_records(raw)[0];
        assert_eq!(texts(r), vec!["Paris", "Rome"]);
        assert_eq!(r.options[0].raw, "1) Paris");
        assert_eq!(r.options[0].label.as_deref(), Some("1"));
        assert!(r.is_correct(&r.options[0]));
        assert!(!r.is_correct(&r.options[1]));
    }

    #[test]
    fn answer_value_after_last_colon() {
        let raw = "## MCQ\nQuestion: Q\nA) a\nCorrect Answer: Option: C";
        assert_eq!(parse_records(raw)[0].correct_answer.as_deref(), Some("C"));
    }

    #[test]
    fn first_answer_line_wins_and_all_are_excluded() {
        let raw = "## MCQ\nQuestion: Q\nA) a\nCorrect Answer: A\nB) b\nCorrect Answer: B";
        let r = &parse_records(raw)[0];
        assert_eq!(r.correct_answer.as_deref(), Some("A"));
        assert_eq!(texts(r), vec!["A) a", "B) b"]);
    }

    #[test]
    fn blank_lines_and_carriage_returns_are_ignored() {
        let raw = "\r\n## MCQ\r\nQuestion: Q\r\n\r\nA) a\r\n\r\nB) b\r\nCorrect Answer: B\r\n";
        let r = &parse_records(raw)[0];
        assert_eq!(texts(r), vec!["A) a", "B) b"]);
        assert_eq!(r.correct_answer.as_deref(), Some("B"));
    }

    #[test]
    fn duplicate_options_are_kept_in_order() {
        let raw = "## MCQ\nQuestion: Q\nA) same\nA) same\nCorrect Answer: A";
        let r = &parse_records(raw)[0];
        assert_eq!(texts(r), vec!["A) same", "A) same"]);
    }

    #[test]
    fn multiple_blocks_in_order() {
        let raw = "## MCQ\nQuestion: one\nA) 1\nCorrect Answer: A\n\
                   ## MCQ\nQuestion: two\nA) 2\nCorrect Answer: A\n\
                   ## MCQ\nQuestion: three\nA) 3\nCorrect Answer: A";
        let questions: Vec<(usize, String)> = parse_records(raw)
            .into_iter()
            .map(|r| (r.index, r.question))
            .collect();
        assert_eq!(
            questions,
            vec![(1, "one".into()), (2, "two".into()), (3, "three".into())]
        );
    }

    #[test]
    fn classify_grammar() {
        assert_eq!(classify("   "), MarkupLine::Blank);
        assert_eq!(
            classify("Question: Why? "),
            MarkupLine::Label(Label::Question, "Why?")
        );
        assert_eq!(
            classify("Correct Answer: D"),
            MarkupLine::Label(Label::CorrectAnswer, "D")
        );
        assert_eq!(classify(" A) x "), MarkupLine::Option("A) x"));
    }
}
