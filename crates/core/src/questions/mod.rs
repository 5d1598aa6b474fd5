//! Question generation orchestration.
//! This module wires subtitle compaction, prompt building, the model call and
//! output cleanup together.

use crate::error::QuizError;
use crate::transcript::try_compact_transcript;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

pub mod openai;
pub mod prompt;
pub mod sanitize;

use prompt::{
    build_answer_prompt, build_question_prompt, join_phrases, preview_text,
    ANSWER_SYSTEM_INSTRUCTION, QUESTION_SYSTEM_INSTRUCTION,
};
use sanitize::{ensure_numbered_list, sanitize_model_output};

/// Output token budget bounds for the question request.
const QUESTION_TOKENS_MIN: u32 = 2500;
/// Output token budget bounds for the answer key request.
const ANSWER_TOKENS_MIN: u32 = 3000;
const TOKENS_MAX: u32 = 4050;

/// How many questions of each category to ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestionCounts {
    pub multiple_choice: u32,
    pub short_answer: u32,
    pub discussion: u32,
}

impl QuestionCounts {
    pub fn new(multiple_choice: u32, short_answer: u32, discussion: u32) -> Self {
        Self {
            multiple_choice,
            short_answer,
            discussion,
        }
    }

    pub fn total(&self) -> u32 {
        self.multiple_choice
            .saturating_add(self.short_answer)
            .saturating_add(self.discussion)
    }

    /// At least one question must be requested.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.total() == 0 {
            return Err(QuizError::InvalidCounts(
                "ask for at least one question".to_string(),
            ));
        }
        Ok(())
    }

    /// Human readable distribution, e.g. "2 multiple-choice questions and
    /// 1 discussion question". Categories with a zero count are left out.
    pub fn distribution_phrase(&self) -> String {
        let parts: Vec<String> = [
            (self.multiple_choice, "multiple-choice"),
            (self.short_answer, "short-answer"),
            (self.discussion, "discussion"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, kind)| {
            let noun = if n == 1 { "question" } else { "questions" };
            format!("{n} {kind} {noun}")
        })
        .collect();
        if parts.is_empty() {
            return "no questions of the specified types".to_string();
        }
        join_phrases(&parts)
    }

    /// User prompt asking for these questions about `transcript`.
    pub fn prompt(&self, transcript: &str) -> String {
        build_question_prompt(
            self.total(),
            &self.distribution_phrase(),
            self.multiple_choice,
            self.short_answer,
            self.discussion,
            transcript,
        )
    }

    /// Output token budget: roughly 150 tokens per question, double for
    /// multiple choice, clamped to what the endpoint accepts.
    pub fn max_tokens(&self) -> u32 {
        let estimate = self
            .total()
            .saturating_add(self.multiple_choice)
            .saturating_mul(150);
        estimate.clamp(QUESTION_TOKENS_MIN, TOKENS_MAX)
    }
}

/// One chat request handed to the language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// A language model that answers a system + user message pair with text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the request and return the text of the first reply.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Read a subtitle file from disk.
pub fn load_subtitles(path: &Path) -> Result<String, QuizError> {
    trace!("load_subtitles path={}", path.display());
    Ok(fs::read_to_string(path)?)
}

/// Build the text of the prompt preview without calling any model.
pub fn preview_prompt(raw_subtitles: &str, counts: &QuestionCounts) -> Result<String, QuizError> {
    counts.validate()?;
    let transcript = try_compact_transcript(raw_subtitles)?;
    Ok(preview_text(&counts.prompt(&transcript)))
}

/// Generate the student version: a numbered list of questions without answers.
/// This function should fail before calling the model when the counts are
/// invalid or the subtitles contain nothing usable.
pub async fn generate_questions<M: ChatModel + ?Sized>(
    model: &M,
    raw_subtitles: &str,
    counts: &QuestionCounts,
) -> Result<String, QuizError> {
    counts.validate()?;
    info!("requested distribution: {}", counts.distribution_phrase());
    let transcript = try_compact_transcript(raw_subtitles)?;
    let request = ChatRequest {
        system: QUESTION_SYSTEM_INSTRUCTION.to_string(),
        user: counts.prompt(&transcript),
        temperature: 1.0,
        top_p: 1.0,
        max_tokens: counts.max_tokens(),
    };
    complete_numbered(model, &request, "questions").await
}

/// Generate the teacher version: the given questions with answers added.
pub async fn generate_answers<M: ChatModel + ?Sized>(
    model: &M,
    raw_subtitles: &str,
    student_questions: &str,
) -> Result<String, QuizError> {
    if student_questions.trim().is_empty() {
        return Err(QuizError::MissingQuestions);
    }
    let transcript = try_compact_transcript(raw_subtitles)?;
    let estimate = u32::try_from(student_questions.len().saturating_mul(3)).unwrap_or(u32::MAX);
    let request = ChatRequest {
        system: ANSWER_SYSTEM_INSTRUCTION.to_string(),
        user: build_answer_prompt(&transcript, student_questions),
        temperature: 0.2,
        top_p: 1.0,
        max_tokens: estimate.clamp(ANSWER_TOKENS_MIN, TOKENS_MAX),
    };
    complete_numbered(model, &request, "answers").await
}

/// Call the model, clean its reply and insist on a numbered list.
async fn complete_numbered<M: ChatModel + ?Sized>(
    model: &M,
    request: &ChatRequest,
    label: &str,
) -> Result<String, QuizError> {
    info!(
        "calling model for {label} (prompt {} bytes, max_tokens {})",
        request.user.len(),
        request.max_tokens
    );
    let raw = model.complete(request).await.map_err(QuizError::Model)?;
    debug!("raw model output for {label}:\n{raw}");
    ensure_numbered_list(sanitize_model_output(&raw))
}
