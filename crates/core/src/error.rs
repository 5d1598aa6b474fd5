//! Failures surfaced to callers of the question pipeline.
//! Malformed caption blocks are not errors; see [`crate::srt::BlockWarning`].

use thiserror::Error;

/// Pipeline-level failures. The variants let a caller tell "retry later"
/// (`Model`) apart from "try another video" (`EmptyTranscript`) and
/// "the model ignored the format" (`NonCompliantOutput`).
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("invalid question counts: {0}")]
    InvalidCounts(String),

    #[error("no student questions to answer")]
    MissingQuestions,

    #[error("no usable transcript content")]
    EmptyTranscript,

    #[error("model did not follow the required format")]
    NonCompliantOutput { output: String },

    /// Network, timeout or API failure from the language model collaborator.
    #[error("language model request failed: {0:#}")]
    Model(anyhow::Error),

    #[error("could not read subtitles: {0}")]
    Io(#[from] std::io::Error),
}
