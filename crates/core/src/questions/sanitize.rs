//! Cleanup of model output.
//! Models like to wrap the requested list in chatter; strip the known phrases.

use crate::error::QuizError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{trace, warn};

static LEADING_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)^\s*here (?:are|is) (?:the requested|your|the|some) (?:study |student )?questions\b[^\n:]*:*\s*",
        r"(?im)^\s*here (?:are|is) (?:the|your) (?:answer key|answers|teacher version)\b[^\n:]*:*\s*",
        r"(?im)^\s*based on the (?:given|provided) (?:subtitles?|transcript),? here are the (?:questions|answers):*\s*",
        r"(?im)^\s*(?:okay|ok|sure|certainly|of course)[,!.]? here (?:are|come) the (?:questions|answers):*\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("leading phrase regex should compile"))
    .collect()
});

static TRAILING_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s*I hope (?:this|these|that) helps?[.!]*\s*\z",
        r"(?i)\s*let me know if you (?:would like|want|need)[^\n]*\s*\z",
        r"(?i)\s*good luck[.!]*\s*\z",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("trailing phrase regex should compile"))
    .collect()
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.").expect("list marker regex should compile"));

static FIRST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*1\.").expect("first item regex should compile"));

/// Below this length, output without a list marker is suspicious.
const SHORT_OUTPUT_CHARS: usize = 100;

/// Strip every pattern in `patterns` until none of them matches anymore.
fn strip_until_stable(mut text: String, patterns: &[Regex]) -> String {
    loop {
        let mut changed = false;
        for re in patterns {
            let replaced = re.replace(&text, "").into_owned();
            if replaced != text {
                text = replaced;
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

/// Remove conversational preambles and sign-offs around the numbered list.
/// Leading whitespace is removed; trailing whitespace collapses to a single
/// newline when the input ended with one. Short output without a list marker
/// is logged, not rejected; see [`ensure_numbered_list`].
pub fn sanitize_model_output(raw: &str) -> String {
    trace!("sanitize_model_output len={}", raw.len());
    let cleaned = strip_until_stable(raw.to_string(), &LEADING_PHRASES);
    let cleaned = strip_until_stable(cleaned, &TRAILING_PHRASES);
    let body = cleaned.trim();
    if !body.is_empty() && body.chars().count() < SHORT_OUTPUT_CHARS && !LIST_MARKER.is_match(body) {
        warn!("model output is short and does not start with a numbered list: {body:?}");
    }
    if !body.is_empty() && raw.ends_with('\n') {
        format!("{body}\n")
    } else {
        body.to_string()
    }
}

/// Whether `text` starts with the first item of a numbered list.
pub fn is_numbered_list(text: &str) -> bool {
    FIRST_ITEM.is_match(text)
}

/// Pass the text through if it starts with "1.", otherwise report that the
/// model ignored the required format.
pub fn ensure_numbered_list(text: String) -> Result<String, QuizError> {
    if is_numbered_list(&text) {
        Ok(text)
    } else {
        warn!("model output does not start with \"1.\"");
        Err(QuizError::NonCompliantOutput { output: text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_requested_questions_preamble() {
        let out = sanitize_model_output("Here are the requested questions:\n1. What...\n");
        assert_eq!(out, "1. What...\n");
    }

    #[test]
    fn strips_stacked_preambles() {
        let raw = "Sure, here are the questions:\n\nHere are your study questions based on the transcript:\n\n1. Who spoke first? [00:01]\n\n2. Why? [00:05]";
        assert_eq!(
            sanitize_model_output(raw),
            "1. Who spoke first? [00:01]\n\n2. Why? [00:05]"
        );
    }

    #[test]
    fn strips_trailing_pleasantries() {
        let raw = "1. Question one? [00:01]\n\nI hope this helps!\nGood luck!\n";
        assert_eq!(sanitize_model_output(raw), "1. Question one? [00:01]\n");
    }

    #[test]
    fn leaves_clean_output_alone() {
        let raw = "1. A? [00:01]\nA. x\nB. y\nC. z\nD. w";
        assert_eq!(sanitize_model_output(raw), raw);
    }

    #[test]
    fn checks_for_numbered_list() {
        assert!(is_numbered_list("  1. first"));
        assert!(!is_numbered_list("I cannot help with that."));
        assert!(!is_numbered_list("2. second"));
        assert!(ensure_numbered_list("1. ok".to_string()).is_ok());
        assert!(matches!(
            ensure_numbered_list("nope".to_string()),
            Err(QuizError::NonCompliantOutput { ref output }) if output == "nope"
        ));
    }
}
