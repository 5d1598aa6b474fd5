//! This module is responsible for reading SubRip-like caption text.
//! Blocks that cannot be read are skipped with a warning instead of failing the file.

pub mod timestamp;

pub use timestamp::{parse_timing_line, TimeRange, Timestamp, TimingError};

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// One or more blank lines; whitespace-only lines count as blank.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("blank line regex should compile"));

/// Longest excerpt of a rejected block kept in a warning.
const PREVIEW_CHARS: usize = 100;

/// A caption reduced to its time range and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplifiedEntry {
    pub range: TimeRange,
    pub text: String,
}

impl SimplifiedEntry {
    pub fn new(range: TimeRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// Why a caption block was dropped. Blocks are numbered from 1 in file order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockWarning {
    #[error("caption block {block} has no `-->` timing line: {preview:?}")]
    MissingTiming { block: usize, preview: String },
    #[error("caption block {block} skipped: {source}")]
    BadTiming {
        block: usize,
        #[source]
        source: TimingError,
    },
}

/// Entries that survived parsing plus everything that was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSubtitles {
    pub entries: Vec<SimplifiedEntry>,
    pub warnings: Vec<BlockWarning>,
}

impl ParsedSubtitles {
    fn skip(&mut self, warning: BlockWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Parse subtitle text into simplified entries, keeping file order.
/// Index lines are ignored, the first line containing `-->` is the timing line
/// and every line after it is caption text. Never fails; malformed blocks end
/// up in `warnings`.
pub fn parse(input: &str) -> ParsedSubtitles {
    trace!("parse bytes={}", input.len());
    let normalized = input.replace("\r\n", "\n");
    let content = normalized.strip_prefix('\u{feff}').unwrap_or(&normalized);
    let blocks: Vec<&str> = BLANK_LINES
        .split(content)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    let only_block = blocks.len() == 1;

    let mut parsed = ParsedSubtitles::default();
    for (i, block) in blocks.iter().enumerate() {
        let number = i + 1;
        let lines: Vec<&str> = block.lines().collect();
        let Some(timing_at) = lines.iter().position(|l| l.contains("-->")) else {
            if only_block {
                warn!("subtitle text has no timing lines, anchoring it at 00:00");
                parsed
                    .entries
                    .push(SimplifiedEntry::new(TimeRange::default(), *block));
            } else {
                parsed.skip(BlockWarning::MissingTiming {
                    block: number,
                    preview: lines.join(" | ").chars().take(PREVIEW_CHARS).collect(),
                });
            }
            continue;
        };
        let range = match parse_timing_line(lines[timing_at]) {
            Ok(range) => range,
            Err(source) => {
                parsed.skip(BlockWarning::BadTiming {
                    block: number,
                    source,
                });
                continue;
            }
        };
        let text = lines[timing_at + 1..].join("\n");
        let text = text.trim();
        if text.is_empty() {
            debug!("caption block {number} has no text");
            continue;
        }
        parsed.entries.push(SimplifiedEntry::new(range, text));
    }
    debug!(
        "parsed {} caption blocks into {} entries ({} skipped)",
        blocks.len(),
        parsed.entries.len(),
        parsed.warnings.len()
    );
    parsed
}
