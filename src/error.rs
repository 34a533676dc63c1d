use crate::timecode::Frame;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("Invalid timestamp: {0}")]
    Format(String),
    #[error("Subtitles may not start simultaneously (frame {0})")]
    Overlap(Frame),
    #[error("Cannot remove the end of the last subtitle")]
    Boundary,
    #[error("At least two commands are needed to compound them")]
    State,
    #[error("No subtitle at frame {0}")]
    NoSubtitle(Frame),
    #[error("A subtitle must end after it starts ({start} >= {end})")]
    EmptySpan { start: Frame, end: Frame },
    #[error("Invalid STL data on line {line}")]
    InvalidLine {
        line: usize,
        #[source]
        source: Box<SubtitleError>,
    },
    #[error("Failed to write STL data")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SubtitleError>;
