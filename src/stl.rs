//! The line-oriented STL text format.
//!
//! Each subtitle is one line of `start , end , text`, where both times are
//! `HH:MM:SS:FF` timestamps. The text may itself contain the separator, so
//! everything after the second separator belongs to it.

use crate::error::{Result, SubtitleError};
use crate::subtitle::{Subtitle, FIELD_SEPARATOR};
use crate::timecode::timestamp_to_frames;

use std::io::Write;

use nom::bytes::complete::tag;
use nom::combinator::opt;
use nom::error::VerboseError;
use nom::IResult;

/// Reads subtitles from STL text, in file order.
///
/// Blank lines and lines with fewer than three fields are skipped, as are
/// subtitles without text or without duration. A timestamp that is present
/// but malformed fails the whole parse.
pub fn parse(input: &str) -> Result<Vec<Subtitle>> {
    let input = match optional_bom(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    };
    let mut subs = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if parts.len() < 3 {
            tracing::warn!(line = line_number, "Skipping malformed STL line: '{}'", line);
            continue;
        }

        let start = timestamp_to_frames(parts[0]).map_err(|err| on_line(line_number, err))?;
        let end = timestamp_to_frames(parts[1]).map_err(|err| on_line(line_number, err))?;
        let sub = Subtitle::new(start, end, parts[2..].join(FIELD_SEPARATOR));

        if !sub.has_text() {
            tracing::debug!(line = line_number, "Skipping subtitle without text");
        } else if sub.start >= sub.end {
            tracing::warn!(
                line = line_number,
                "Skipping subtitle without duration ({} >= {})",
                sub.start,
                sub.end
            );
        } else {
            subs.push(sub);
        }
    }

    Ok(subs)
}

/// Writes every subtitle carrying text, one line each.
pub fn write_stl<'a, W, I>(buf: &mut W, subs: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Subtitle>,
{
    for sub in subs.into_iter().filter(|sub| sub.has_text()) {
        writeln!(buf, "{}", sub)?;
    }
    Ok(())
}

pub fn to_stl<'a, I>(subs: I) -> String
where
    I: IntoIterator<Item = &'a Subtitle>,
{
    subs.into_iter()
        .filter(|sub| sub.has_text())
        .map(|sub| format!("{}\n", sub))
        .collect()
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn on_line(line: usize, err: SubtitleError) -> SubtitleError {
    SubtitleError::InvalidLine {
        line,
        source: Box::new(err),
    }
}
