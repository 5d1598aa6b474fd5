//! Timing line normalization.
//! Turns `00:01:05,250 --> 00:01:07,000` into a range rendered as `[01:05] --> [01:07]`.

use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// One side of a timing line: optional hours, minutes, seconds, optional
/// fraction. Brackets are accepted so compacted transcripts parse again.
const SIDE: &str = r"\[?(?:(\d+):)?(\d{1,2}):(\d{2})(?:[,.](\d{1,3}))?\]?";

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{SIDE}\s*-->\s*{SIDE}")).expect("timing line regex should compile")
});

/// Raised when a line does not look like `start --> end`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised timing line: {0:?}")]
pub struct TimingError(pub String);

/// Offset into the video with millisecond precision.
/// Rendering drops the milliseconds and the hour field when it is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { millis: 0 };

    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self::from_millis(((hours * 60 + minutes) * 60 + seconds) * 1000)
    }

    /// Like [`Timestamp::from_hms`] plus a millisecond part, `None` on overflow.
    pub fn checked_from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        let millis = hours
            .checked_mul(60)?
            .checked_add(minutes)?
            .checked_mul(60)?
            .checked_add(seconds)?
            .checked_mul(1000)?
            .checked_add(millis)?;
        Some(Self::from_millis(millis))
    }

    pub fn as_millis(self) -> u64 {
        self.millis
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.millis / 1000;
        let h = total_secs / 3600;
        let m = (total_secs % 3600) / 60;
        let s = total_secs % 60;
        if h == 0 {
            write!(f, "{m:02}:{s:02}")
        } else {
            write!(f, "{h:02}:{m:02}:{s:02}")
        }
    }
}

/// Start and end of a caption. `start <= end` is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Display form used outside the transcript: a single `[time]` when both
    /// sides render the same, the full range otherwise.
    pub fn label(&self) -> String {
        let start = self.start.to_string();
        let end = self.end.to_string();
        if start == end {
            format!("[{start}]")
        } else {
            format!("[{start}] --> [{end}]")
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] --> [{}]", self.start, self.end)
    }
}

impl FromStr for TimeRange {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timing_line(s)
    }
}

/// Parse a timing line such as `00:01:05,250 --> 00:01:07,000`.
/// Each side may omit the hour field independently; anything after the end
/// time (cue settings) is ignored.
pub fn parse_timing_line(line: &str) -> Result<TimeRange, TimingError> {
    let caps = TIMING_LINE
        .captures(line)
        .ok_or_else(|| TimingError(line.to_string()))?;
    let start = side(&caps, 1, line)?;
    let end = side(&caps, 5, line)?;
    Ok(TimeRange { start, end })
}

/// Read one side of the range starting at capture group `first`.
fn side(caps: &Captures<'_>, first: usize, line: &str) -> Result<Timestamp, TimingError> {
    let number = |i: usize| -> Result<u64, TimingError> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().map_err(|_| TimingError(line.to_string())),
            None => Ok(0),
        }
    };
    let hours = number(first)?;
    let minutes = number(first + 1)?;
    let seconds = number(first + 2)?;
    // ",5" means half a second, not five milliseconds.
    let fraction = match caps.get(first + 3) {
        Some(m) => {
            let digits = m.as_str();
            let value: u64 = digits.parse().map_err(|_| TimingError(line.to_string()))?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };
    Timestamp::checked_from_parts(hours, minutes, seconds, fraction)
        .ok_or_else(|| TimingError(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_zero_hours_and_millis() {
        let range = parse_timing_line("00:01:05,250 --> 00:01:07,000").unwrap();
        assert_eq!(range.to_string(), "[01:05] --> [01:07]");
        assert_eq!(range.start.as_millis(), 65_250);
    }

    #[test]
    fn keeps_nonzero_hours() {
        let range = parse_timing_line("01:00:00,000 --> 01:00:02,500").unwrap();
        assert_eq!(range.to_string(), "[01:00:00] --> [01:00:02]");
        assert_eq!(range.end.as_millis(), 3_602_500);
    }

    #[test]
    fn hours_are_optional_per_side() {
        let range = parse_timing_line("59:58.100 --> 1:00:01.900").unwrap();
        assert_eq!(range.to_string(), "[59:58] --> [01:00:01]");
    }

    #[test]
    fn accepts_dot_separator_and_cue_settings() {
        let range = parse_timing_line("00:00:03.000 --> 00:00:04.000 align:start position:0%").unwrap();
        assert_eq!(range.to_string(), "[00:03] --> [00:04]");
    }

    #[test]
    fn reparses_compacted_form() {
        let range: TimeRange = "[01:05] --> [01:00:07]".parse().unwrap();
        assert_eq!(range.start, Timestamp::from_hms(0, 1, 5));
        assert_eq!(range.end, Timestamp::from_hms(1, 0, 7));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timing_line("not --> a time").unwrap_err();
        assert_eq!(err, TimingError("not --> a time".to_string()));
    }

    #[test]
    fn rejects_hours_that_overflow() {
        let line = "9999999999999:00:00,000 --> 9999999999999:00:01,000";
        assert_eq!(parse_timing_line(line), Err(TimingError(line.to_string())));
        let digits = "99999999999999999999999:00:00,000 --> 00:00:01,000";
        assert!(parse_timing_line(digits).is_err());
    }

    #[test]
    fn label_collapses_identical_sides() {
        let same = TimeRange::new(Timestamp::from_millis(5_100), Timestamp::from_millis(5_900));
        assert_eq!(same.label(), "[00:05]");
        let span = TimeRange::new(Timestamp::from_hms(0, 0, 5), Timestamp::from_hms(0, 0, 6));
        assert_eq!(span.label(), "[00:05] --> [00:06]");
    }
}
