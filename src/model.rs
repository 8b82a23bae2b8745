//! In-memory representation of a generated MCQ batch.
//!
//! Every renderer consumes the same [`McqBatch`]. The batch is built once
//! from the model's markup and stamped with a single `generated_at`, so the
//! TXT, PDF and DOCX artifacts always report the same generation time and
//! list the records in the same order.
//!
//! ## Highlighting
//!
//! Whether an option is "the correct one" is decided in exactly one place:
//! [`OptionLine::is_correct_for`]. Renderers ask the record
//! ([`McqRecord::is_correct`]) and never re-derive the label from the
//! normalised option text.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for every "Generated on:" line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shown in place of a missing correct-answer label.
pub const MISSING_ANSWER: &str = "None";

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLine {
    /// Leading enumerator without its parenthesis (`"A"`, `"2"`), if present.
    pub label: Option<String>,
    /// Display text. A leading `<digit>)` enumerator has been stripped.
    pub text: String,
    /// The trimmed line as it appeared in the markup, before normalisation.
    pub raw: String,
}

impl OptionLine {
    /// True iff the original line starts with `answer` immediately followed
    /// by `)`. Exact, case-sensitive prefix match.
    pub fn is_correct_for(&self, answer: Option<&str>) -> bool {
        match answer {
            Some(label) if !label.is_empty() => self
                .raw
                .trim()
                .strip_prefix(label)
                .is_some_and(|rest| rest.starts_with(')')),
            _ => false,
        }
    }
}

/// One parsed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqRecord {
    /// Position of the block in the split sequence (1-based, may have gaps).
    pub index: usize,
    pub question: String,
    pub options: Vec<OptionLine>,
    pub correct_answer: Option<String>,
}

impl McqRecord {
    /// Whether `option` is this record's correct answer.
    pub fn is_correct(&self, option: &OptionLine) -> bool {
        option.is_correct_for(self.correct_answer.as_deref())
    }

    /// The option highlighted as correct, if any.
    pub fn correct_option(&self) -> Option<&OptionLine> {
        self.options.iter().find(|o| self.is_correct(o))
    }

    /// `"Q{index}: {question}"`
    pub fn heading(&self) -> String {
        format!("Q{}: {}", self.index, self.question)
    }

    /// `"Correct Answer: {label}"`, with [`MISSING_ANSWER`] when absent.
    pub fn answer_line(&self) -> String {
        format!(
            "Correct Answer: {}",
            self.correct_answer.as_deref().unwrap_or(MISSING_ANSWER)
        )
    }
}

/// All records parsed from one model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqBatch {
    pub records: Vec<McqRecord>,
    pub generated_at: NaiveDateTime,
}

impl McqBatch {
    pub fn new(records: Vec<McqRecord>, generated_at: NaiveDateTime) -> Self {
        Self {
            records,
            generated_at,
        }
    }

    /// Stamp `records` with the current local time.
    pub fn stamped_now(records: Vec<McqRecord>) -> Self {
        Self::new(records, chrono::Local::now().naive_local())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `"Generated on: YYYY-MM-DD HH:MM:SS"`
    pub fn timestamp_line(&self) -> String {
        format!(
            "Generated on: {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )
    }
}
