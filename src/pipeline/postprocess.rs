//! Post-processing: deterministic cleanup of model-generated MCQ markup.
//!
//! ## Why is post-processing necessary?
//!
//! Even a well-prompted model drifts from the requested format in small,
//! predictable ways:
//!
//! - wrapping the whole answer in ` ```markdown ... ``` ` fences
//! - numbering the block markers (`## MCQ 3`, `### MCQ:`)
//! - emphasising labels (`**Question:**`, `**Correct Answer**:`)
//! - Windows line endings and zero-width characters
//!
//! Each of these would make [`super::parse`] lose a block or a label
//! without any error. The rules below put the markup back into the exact
//! shape the parser expects and never touch question or option text.
//!
//! ## Rule Order
//!
//! Line endings are normalised before fence stripping so the fence regex
//! sees `\n` only; marker and label rules run last, on clean lines.

use super::parse::{Label, BLOCK_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip carriage returns (CRLF → LF, stray CR removed)
/// 2. Strip outer code fences
/// 3. Remove invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Canonicalise block markers to `## MCQ`
/// 6. Remove Markdown emphasis around label tokens
pub fn clean_markup(input: &str) -> String {
    let s = strip_carriage_returns(input);
    let s = strip_code_fences(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = canonicalise_block_markers(&s);
    unemphasise_labels(&s)
}

// ── Rule 1: Strip carriage returns ───────────────────────────────────────────

/// Same rule as the parser applies, so cleaning never changes line structure.
fn strip_carriage_returns(input: &str) -> String {
    input.replace('\r', "")
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:markdown|md|text|plaintext)?[ \t]*\n(.*)\n```\s*$").unwrap()
});

fn strip_code_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Canonicalise block markers ───────────────────────────────────────
//
// `# MCQ`, `### MCQ 4`, `## MCQ #2:`, `**## MCQ**` all become `## MCQ`.
// Only whole lines are rewritten so a question mentioning "MCQ" is safe.

static RE_BLOCK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\**[ \t]*#{1,6}[ \t]*MCQ[ \t]*#?[0-9]*[ \t]*[:.]?[ \t]*\**[ \t]*$")
        .unwrap()
});

fn canonicalise_block_markers(input: &str) -> String {
    RE_BLOCK_MARKER.replace_all(input, BLOCK_MARKER).to_string()
}

// ── Rule 6: Remove emphasis around labels ────────────────────────────────────

static RE_EMPHASISED_LABEL: Lazy<Regex> = Lazy::new(|| {
    let names = [Label::Question, Label::CorrectAnswer]
        .iter()
        .map(|l| regex::escape(l.token().trim_end_matches(':')))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"[*_]{{1,2}}({names})(?::[*_]{{1,2}}|[*_]{{1,2}}:)")).unwrap()
});

fn unemphasise_labels(input: &str) -> String {
    RE_EMPHASISED_LABEL.replace_all(input, "$1:").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
