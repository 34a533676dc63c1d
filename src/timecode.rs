//! Conversion between frame counts and `HH:MM:SS:FF` timestamps.

use crate::error::{Result, SubtitleError};

use std::fmt;

use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0};
use nom::combinator::{all_consuming, map_res};
use nom::error::{convert_error, VerboseError};
use nom::sequence::{delimited, terminated};
use nom::{Err, IResult};

/// The atomic time unit. Every position on a timeline is a frame count.
pub type Frame = u64;

/// Frames per second.
pub const FPS: Frame = 50;

/// Stands in for "no end": a subtitle ending here runs until the end of the media.
pub const UNBOUNDED: Frame = Frame::MAX;

const FRAMES_PER_MINUTE: Frame = 60 * FPS;
const FRAMES_PER_HOUR: Frame = 60 * FRAMES_PER_MINUTE;

/// Displays a frame count as a zero-padded `HH:MM:SS:FF` timestamp.
///
/// Hours are padded to two digits but are not capped, so `100:00:00:00` is a
/// valid rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub Frame);

impl fmt::Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let frames = self.0;
        write!(
            fmt,
            "{:02}:{:02}:{:02}:{:02}",
            frames / FRAMES_PER_HOUR,
            (frames % FRAMES_PER_HOUR) / FRAMES_PER_MINUTE,
            (frames % FRAMES_PER_MINUTE) / FPS,
            frames % FPS
        )
    }
}

pub fn frames_to_timestamp(frames: Frame) -> String {
    Timestamp(frames).to_string()
}

/// Parses `HH:MM:SS:FF` into a frame count.
///
/// Fields are not range checked: `00:00:75:00` is read as 75 seconds.
pub fn timestamp_to_frames(input: &str) -> Result<Frame> {
    let (hours, minutes, seconds, frames) =
        match all_consuming(delimited(space0, timestamp, space0))(input) {
            Ok((_, fields)) => fields,
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                tracing::debug!("{}", convert_error(input, err));
                return Err(SubtitleError::Format(format!("'{}'", input)));
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        };

    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(FPS))
        .and_then(|total| total.checked_add(frames))
        .ok_or_else(|| SubtitleError::Format(format!("'{}' is out of range", input.trim())))
}

/// Converts a continuous playback position to the nearest frame.
pub fn seconds_to_frames(seconds: f64) -> Frame {
    (seconds * FPS as f64).round().max(0.0) as Frame
}

pub fn frames_to_seconds(frames: Frame) -> f64 {
    frames as f64 / FPS as f64
}

type Fields = (u64, u64, u64, u64);

fn timestamp(input: &str) -> IResult<&str, Fields, VerboseError<&str>> {
    let (input, hours) = terminated(field, tag(":"))(input)?;
    let (input, minutes) = terminated(field, tag(":"))(input)?;
    let (input, seconds) = terminated(field, tag(":"))(input)?;
    let (input, frames) = field(input)?;

    Ok((input, (hours, minutes, seconds, frames)))
}

fn field(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_parse_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(timestamp_to_frames(input).unwrap(), expected);
            }
        )*
        }
    }

    macro_rules! test_write_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(frames_to_timestamp(input), expected);
            }
        )*
        }
    }

    test_parse_ts! {
        test_parse_ts_frames: ("00:00:00:01", 1),
        test_parse_ts_seconds: ("00:00:01:00", 50),
        test_parse_ts_minutes: ("00:01:00:00", 50 * 60),
        test_parse_ts_hours: ("01:00:00:00", 50 * 3600),
        test_parse_ts_mixed: ("00:00:07:10", 360),
        test_parse_ts_padded: (" 00:00:11:11 ", 561),
        test_parse_ts_unpadded: ("1:2:3:4", 50 * 3723 + 4),
        test_parse_ts_large_hours: ("100:00:00:00", 50 * 360_000),
        test_parse_ts_lenient_seconds: ("00:00:75:00", 50 * 75),
    }

    test_write_ts! {
        test_write_ts_0: (0, "00:00:00:00"),
        test_write_ts_1: (1, "00:00:00:01"),
        test_write_ts_2: (49, "00:00:00:49"),
        test_write_ts_3: (50, "00:00:01:00"),
        test_write_ts_4: (50 * 60, "00:01:00:00"),
        test_write_ts_5: (50 * 3600, "01:00:00:00"),
        test_write_ts_6: (781, "00:00:15:31"),
        test_write_ts_7: (50 * 360_000 + 1, "100:00:00:01"),
    }

    #[test]
    fn too_few_fields_is_a_format_error() {
        let err = timestamp_to_frames("00:00:01").unwrap_err();
        assert!(matches!(err, SubtitleError::Format(_)));
    }

    #[test]
    fn non_numeric_field_is_a_format_error() {
        assert!(matches!(
            timestamp_to_frames("00:aa:01:00"),
            Err(SubtitleError::Format(_))
        ));
        assert!(matches!(
            timestamp_to_frames("00:00:01:00x"),
            Err(SubtitleError::Format(_))
        ));
        assert!(matches!(timestamp_to_frames(""), Err(SubtitleError::Format(_))));
    }

    #[test]
    fn overflowing_timestamp_is_a_format_error() {
        let err = timestamp_to_frames("99999999999999999:00:00:00").unwrap_err();
        assert!(matches!(err, SubtitleError::Format(_)));
    }

    #[test]
    fn unbounded_end_survives_formatting() {
        let rendered = frames_to_timestamp(UNBOUNDED);
        assert_eq!(timestamp_to_frames(&rendered).unwrap(), UNBOUNDED);
    }

    #[test]
    fn seconds_round_to_the_nearest_frame() {
        assert_eq!(seconds_to_frames(1.0), 50);
        assert_eq!(seconds_to_frames(0.011), 1);
        assert_eq!(seconds_to_frames(0.009), 0);
        assert_eq!(seconds_to_frames(-3.0), 0);
        assert_eq!(frames_to_seconds(75), 1.5);
    }
}
