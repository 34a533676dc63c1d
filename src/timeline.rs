//! Sorted, non-overlapping storage of subtitles.
//!
//! Every primitive here checks its preconditions before touching the
//! underlying vector, so an error always leaves the timeline unchanged.

use crate::error::{Result, SubtitleError};
use crate::subtitle::{Subtitle, TimeSpan};
use crate::timecode::Frame;

use std::mem;

/// The outcome of inserting a subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Insertion {
    /// The end the preceding subtitle had before it was cut short, if it was.
    pub truncated: Option<Frame>,
    pub changed: TimeSpan,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    subtitles: Vec<Subtitle>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subtitles.len()
    }

    pub fn get(&self, index: usize) -> Option<&Subtitle> {
        self.subtitles.get(index)
    }

    pub fn as_slice(&self) -> &[Subtitle] {
        &self.subtitles
    }

    /// Index of the first subtitle ending after `time`.
    ///
    /// Ends are strictly increasing, so this is a binary search.
    pub fn index_from_time(&self, time: Frame) -> usize {
        self.subtitles.partition_point(|sub| sub.end <= time)
    }

    /// The subtitle owning `time`, along with its index.
    pub fn find(&self, time: Frame) -> Option<(usize, &Subtitle)> {
        let index = self.index_from_time(time);
        self.subtitles
            .get(index)
            .filter(|sub| sub.contains(time))
            .map(|sub| (index, sub))
    }

    /// Index of the subtitle starting exactly at `start`.
    pub fn position_of(&self, start: Frame) -> Result<usize> {
        let index = self.index_from_time(start);
        match self.subtitles.get(index) {
            Some(sub) if sub.start == start => Ok(index),
            _ => Err(SubtitleError::NoSubtitle(start)),
        }
    }

    /// Inserts `sub`, resolving overlaps with its neighbours.
    ///
    /// The new subtitle is cut short by the head of its successor, and cuts
    /// short the tail of its predecessor. Starting together with an existing
    /// subtitle is an error.
    pub fn insert(&mut self, mut sub: Subtitle) -> Result<Insertion> {
        if sub.start >= sub.end {
            return Err(SubtitleError::EmptySpan {
                start: sub.start,
                end: sub.end,
            });
        }

        let mut index = self.index_from_time(sub.start);
        if self.subtitles.get(index).map_or(false, |s| s.start < sub.start) {
            index += 1;
        }

        if let Some(next) = self.subtitles.get(index) {
            if next.start == sub.start {
                return Err(SubtitleError::Overlap(sub.start));
            }
            if next.start < sub.end {
                sub.end = next.start;
            }
        }

        let mut changed = sub.span();
        let mut truncated = None;
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.subtitles.get_mut(i)) {
            if prev.end > sub.start {
                changed = changed.union(TimeSpan::new(sub.start, prev.end));
                truncated = Some(mem::replace(&mut prev.end, sub.start));
            }
        }

        self.subtitles.insert(index, sub);
        Ok(Insertion {
            truncated,
            changed,
        })
    }

    /// Removes the subtitle starting exactly at `start`.
    pub fn remove(&mut self, start: Frame) -> Result<(usize, Subtitle)> {
        let index = self.position_of(start)?;
        Ok((index, self.subtitles.remove(index)))
    }

    /// Replaces the subtitle starting at `old_start` with `sub`.
    ///
    /// The replacement must fit between the neighbours of the subtitle it
    /// replaces.
    pub fn replace(&mut self, old_start: Frame, sub: Subtitle) -> Result<Subtitle> {
        let index = self.position_of(old_start)?;
        if sub.start >= sub.end {
            return Err(SubtitleError::EmptySpan {
                start: sub.start,
                end: sub.end,
            });
        }
        let prev_end = index
            .checked_sub(1)
            .and_then(|i| self.subtitles.get(i))
            .map(|prev| prev.end);
        let next_start = self.subtitles.get(index + 1).map(|next| next.start);
        if prev_end.map_or(false, |end| end > sub.start) {
            return Err(SubtitleError::Overlap(sub.start));
        }
        if next_start.map_or(false, |start| start < sub.end) {
            return Err(SubtitleError::Overlap(sub.end));
        }

        Ok(mem::replace(&mut self.subtitles[index], sub))
    }

    /// Moves the end of the subtitle at `index`.
    ///
    /// Callers restore ends recorded earlier, which always fit.
    pub fn set_end(&mut self, index: usize, end: Frame) {
        if let Some(sub) = self.subtitles.get_mut(index) {
            debug_assert!(sub.start < end);
            sub.end = end;
        }
    }

    /// Swaps the whole contents, returning what was stored before.
    pub fn swap_contents(&mut self, subtitles: Vec<Subtitle>) -> Vec<Subtitle> {
        mem::replace(&mut self.subtitles, subtitles)
    }
}
