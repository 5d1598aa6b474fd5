//! Transcript compaction.
//! Rolling captions repeat the previous caption plus a few new words; this
//! module folds them back into the underlying transcript with accurate times.

use crate::error::QuizError;
use crate::srt::{self, SimplifiedEntry, TimeRange};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, trace};

/// A run of captions merged into one segment of new text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapsedEntry {
    pub range: TimeRange,
    pub text: String,
}

impl fmt::Display for CollapsedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.range, self.text)
    }
}

/// Accumulator for the collapsing pass.
#[derive(Default)]
struct Fold<'a> {
    out: Vec<CollapsedEntry>,
    /// Full text of the previous input entry, before any trimming of repeats.
    prev_input: Option<&'a str>,
}

impl<'a> Fold<'a> {
    fn step(mut self, entry: &'a SimplifiedEntry) -> Self {
        let text = entry.text.trim();
        if text.is_empty() {
            return self;
        }
        let added = self
            .out
            .last()
            .and_then(|last| continuation(text, &last.text, self.prev_input));
        match added {
            Some(suffix) => {
                if let Some(last) = self.out.last_mut() {
                    if !suffix.is_empty() {
                        last.text.push(' ');
                        last.text.push_str(suffix);
                    }
                    last.range.end = entry.range.end;
                }
            }
            None => self.out.push(CollapsedEntry {
                range: entry.range,
                text: text.to_string(),
            }),
        }
        self.prev_input = Some(text);
        self
    }
}

/// What `text` adds on top of already emitted text, if it repeats or extends it.
/// The last output text is tried first, then the previous input text; `Some("")`
/// means a pure repeat.
fn continuation<'t>(text: &'t str, last_output: &str, prev_input: Option<&str>) -> Option<&'t str> {
    [Some(last_output), prev_input]
        .into_iter()
        .flatten()
        .filter(|known| !known.is_empty())
        .find_map(|known| text.strip_prefix(known).map(str::trim))
}

/// Merge rolling and repeated captions into the minimal sequence of segments.
/// Each merged run keeps the start of its first caption and the end of its
/// last. Only adjacent repeats are merged; a phrase that comes back later stays.
/// No segment's text is equal to or a prefix of the next segment's text.
pub fn collapse(entries: &[SimplifiedEntry]) -> Vec<CollapsedEntry> {
    trace!("collapse entries={}", entries.len());
    let mut out = entries.iter().fold(Fold::default(), Fold::step).out;
    // A later merge can grow a segment past its predecessor, so fold any
    // segment that repeats or extends the one before it.
    out.dedup_by(|later, kept| match later.text.strip_prefix(kept.text.as_str()) {
        Some(suffix) => {
            let suffix = suffix.trim();
            if !suffix.is_empty() {
                kept.text.push(' ');
                kept.text.push_str(suffix);
            }
            kept.range.end = later.range.end;
            true
        }
        None => false,
    });
    out.retain(|e| !e.text.trim().is_empty());
    debug!("collapsed {} entries into {}", entries.len(), out.len());
    out
}

/// Render segments as `[start] --> [end]\ntext` separated by blank lines.
pub fn render(entries: &[CollapsedEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse and collapse raw subtitle text into segments.
pub fn compact_entries(raw: &str) -> Vec<CollapsedEntry> {
    let parsed = srt::parse(raw);
    collapse(&parsed.entries)
}

/// Turn raw subtitle text into the compact transcript handed to the model.
/// Returns an empty string when nothing usable is left.
pub fn compact_transcript(raw: &str) -> String {
    let entries = compact_entries(raw);
    for entry in &entries {
        trace!("segment {} {:?}", entry.range.label(), entry.text);
    }
    let transcript = render(&entries);
    info!(
        "compacted {} bytes of subtitles into {} bytes ({} segments)",
        raw.len(),
        transcript.len(),
        entries.len()
    );
    transcript
}

/// Like [`compact_transcript`] but an empty result is an error, since no
/// meaningful prompt can be built from it.
pub fn try_compact_transcript(raw: &str) -> Result<String, QuizError> {
    let transcript = compact_transcript(raw);
    if transcript.is_empty() {
        return Err(QuizError::EmptyTranscript);
    }
    Ok(transcript)
}
