//! Prompts for MCQ generation.
//!
//! The output-format section is assembled from [`BLOCK_MARKER`] and
//! [`Label`] so the prompt and the parser cannot drift apart.
//!
//! Callers can override the system prompt via
//! [`crate::config::GenerationConfig::system_prompt`]; the per-request user
//! prompt (question count, difficulty, document text) is always built here.

use crate::config::Difficulty;
use crate::pipeline::parse::{Label, BLOCK_MARKER};

/// Default system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert MCQ generator. You write \
multiple-choice questions that test understanding of the material you are given, \
including any diagrams or figures attached as images. You reply with the questions \
only, in the exact format requested, without commentary.";

/// Extra instructions for each difficulty level.
pub fn difficulty_instructions(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "- Generate simple and straightforward questions suitable for beginners.\n\
             - Focus on basic concepts and facts.\n\
             - Avoid complex or ambiguous wording."
        }
        Difficulty::Medium => {
            "- Generate moderately challenging questions suitable for intermediate learners.\n\
             - Include questions that require understanding of relationships between concepts.\n\
             - Use some application-based or scenario-based questions."
        }
        Difficulty::Hard => {
            "- Generate complex and challenging questions suitable for advanced learners.\n\
             - Include questions that require critical thinking, analysis, or synthesis.\n\
             - Use application-based, scenario-based, or problem-solving questions."
        }
    }
}

/// The block template the model must follow.
pub fn output_format() -> String {
    format!(
        "{BLOCK_MARKER}\n\
         {} [Your question here]\n\
         A) [Option A]\n\
         B) [Option B]\n\
         C) [Option C]\n\
         D) [Option D]\n\
         {} [Correct option letter]",
        Label::Question.token(),
        Label::CorrectAnswer.token(),
    )
}

/// Build the user message for one generation request.
///
/// `has_images` adds a line pointing the model at the attached figures.
pub fn build_user_prompt(
    content: &str,
    num_questions: usize,
    difficulty: Difficulty,
    has_images: bool,
) -> String {
    let visual = if has_images {
        "- Carefully analyze both the text and the attached images so the questions and distractors are accurate and relevant.\n"
    } else {
        ""
    };
    format!(
        "Generate {num_questions} multiple-choice questions (MCQs) based on the following content.\n\
         \n\
         ### Instructions:\n\
         - Difficulty Level: {label}\n\
         {instructions}\n\
         - Ensure questions are clear, relevant, and unambiguous.\n\
         - Provide 4 distinct answer choices for each question.\n\
         - Indicate the correct answer at the end of each question.\n\
         {visual}\
         - Do not number the questions.\n\
         \n\
         ### Text Content:\n\
         '{content}'\n\
         \n\
         ### Output Format:\n\
         For each MCQ, use the following format:\n\
         {format}\n\
         \n\
         Now, generate {num_questions} MCQs based on the provided content and difficulty level.",
        label = difficulty.label(),
        instructions = difficulty_instructions(difficulty),
        format = output_format(),
    )
}
