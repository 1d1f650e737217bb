//! Episode transcripts
//!
//! WebVTT and plain-text transcripts parsed into timed lines, with lookup
//! of the line under the playhead and case-insensitive search.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assumed length of a plain-text segment when the episode duration is unknown
const FALLBACK_SEGMENT_SECS: f64 = 30.0;

/// One timed transcript line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Start in seconds
    pub start: f64,

    /// End in seconds
    pub end: f64,

    /// Spoken text
    pub text: String,
}

impl TranscriptLine {
    /// Whether `position` falls inside `[start, end]`
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }
}

/// Parsed transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    /// Build from already timed lines
    pub fn from_lines(lines: Vec<TranscriptLine>) -> Self {
        Self { lines }
    }

    /// Parse using the locator's extension to pick the format
    pub fn parse(locator: &str, body: &str, duration: f64) -> Self {
        if is_vtt_locator(locator) {
            Self::parse_vtt(body)
        } else {
            Self::parse_text(body, duration)
        }
    }

    /// Parse a WebVTT document
    ///
    /// Cue identifiers and settings are ignored. Cues with malformed timing
    /// or no text are skipped.
    pub fn parse_vtt(body: &str) -> Self {
        let body = body.replace("\r\n", "\n");
        let mut lines = Vec::new();

        // First block is the WEBVTT header
        for cue in body.split("\n\n").skip(1) {
            let mut rows = cue.lines().skip_while(|row| !row.contains("-->"));
            let Some(timing) = rows.next() else {
                continue;
            };

            let Some((start, end)) = parse_cue_timing(timing) else {
                debug!(timing, "Skipping cue with malformed timing");
                continue;
            };

            let text = rows
                .map(str::trim)
                .filter(|row| !row.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                continue;
            }

            lines.push(TranscriptLine { start, end, text });
        }

        Self { lines }
    }

    /// Parse a plain-text transcript
    ///
    /// Text is split into paragraphs and sentences, which are spread evenly
    /// over `duration`.
    pub fn parse_text(body: &str, duration: f64) -> Self {
        let body = body.replace("\r\n", "\n");
        let segments: Vec<String> = body
            .split("\n\n")
            .flat_map(split_sentences)
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return Self::default();
        }

        let segment_len = if duration.is_finite() && duration > 0.0 {
            duration / segments.len() as f64
        } else {
            FALLBACK_SEGMENT_SECS
        };

        let lines = segments
            .into_iter()
            .enumerate()
            .map(|(index, text)| TranscriptLine {
                start: index as f64 * segment_len,
                end: (index + 1) as f64 * segment_len,
                text,
            })
            .collect();

        Self { lines }
    }

    /// All lines in order
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the first line containing `position`
    pub fn active_index(&self, position: f64) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(position))
    }

    /// First line containing `position`
    pub fn active_line(&self, position: f64) -> Option<&TranscriptLine> {
        self.active_index(position).map(|index| &self.lines[index])
    }

    /// Lines whose text contains `query`, ignoring case
    ///
    /// An empty query matches every line.
    pub fn search(&self, query: &str) -> Vec<&TranscriptLine> {
        let query = query.to_lowercase();
        self.lines
            .iter()
            .filter(|line| line.text.to_lowercase().contains(&query))
            .collect()
    }
}

/// Parse a `HH:MM:SS.mmm` or `MM:SS.mmm` cue timestamp into seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let invalid = || TrackerError::InvalidTimestamp(timestamp.to_string());
    let parts: Vec<&str> = timestamp.trim().split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(invalid()),
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let millis = if fraction.is_empty() {
        0.0
    } else {
        let digits: u64 = fraction.parse().map_err(|_| invalid())?;
        digits as f64 / 10f64.powi(fraction.len() as i32)
    };

    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(whole))
        .ok_or_else(invalid)?;

    Ok(total as f64 + millis)
}

fn parse_cue_timing(row: &str) -> Option<(f64, f64)> {
    let (start, rest) = row.split_once("-->")?;
    // Cue settings may follow the end timestamp
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start).ok()?, parse_timestamp(end).ok()?))
}

/// Split on a period followed by whitespace, dropping the delimiter
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = paragraph.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '.' && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            segments.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    segments.push(current.trim().to_string());
    segments
}

fn is_vtt_locator(locator: &str) -> bool {
    let path = locator.split(['?', '#']).next().unwrap_or(locator);
    path.to_ascii_lowercase().ends_with(".vtt")
}
