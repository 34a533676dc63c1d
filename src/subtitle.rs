use crate::timecode::{Frame, Timestamp};

use std::fmt;

/// Separates the fields of an STL line.
pub const FIELD_SEPARATOR: &str = " , ";

/// Marks a line break inside the text of a single cue.
pub const LINE_BREAK: &str = "\\n";

/// A half-open span of frames, `[start, end)`, carrying text.
///
/// Empty text marks a gap placeholder created during editing; such subtitles
/// are never written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub start: Frame,
    pub end: Frame,
    pub text: String,
}

impl Subtitle {
    pub fn new(start: Frame, end: Frame, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    pub fn contains(&self, time: Frame) -> bool {
        self.start <= time && time < self.end
    }

    /// Whether this subtitle carries text worth persisting.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// The text split on in-cue line break markers.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        self.text.split(LINE_BREAK)
    }

    /// Renders the subtitle as a single STL line, without a line ending.
    ///
    /// Real line breaks in the text are written as break markers so the
    /// subtitle always occupies exactly one line.
    pub fn to_stl(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Subtitle {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let text = encode_line_breaks(&self.text);
        write!(
            fmt,
            "{}{}{}{}{}",
            Timestamp(self.start),
            FIELD_SEPARATOR,
            Timestamp(self.end),
            FIELD_SEPARATOR,
            text
        )
    }
}

/// Replaces every line ending (`\r\n`, `\n` or a lone `\r`) with the
/// in-cue break marker.
pub fn encode_line_breaks(text: &str) -> String {
    text.replace("\r\n", LINE_BREAK)
        .replace(['\n', '\r'], LINE_BREAK)
}

/// The range of frames touched by a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Frame,
    pub end: Frame,
}

impl TimeSpan {
    pub fn new(start: Frame, end: Frame) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(self, other: TimeSpan) -> TimeSpan {
        TimeSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
