//! Study question generation from video subtitles.
//! Subtitles are compacted into a short timestamped transcript, turned into a
//! prompt and the model's reply is cleaned up into a numbered list.

pub mod error;
pub mod questions;
pub mod srt;
pub mod transcript;

pub use error::QuizError;
pub use questions::{ChatModel, ChatRequest, QuestionCounts};
pub use transcript::{compact_transcript, try_compact_transcript, CollapsedEntry};
