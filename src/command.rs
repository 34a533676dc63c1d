//! Reversible edits of a [`Timeline`].

use crate::error::Result;
use crate::subtitle::{Subtitle, TimeSpan};
use crate::timecode::{Frame, UNBOUNDED};
use crate::timeline::Timeline;

use std::mem;

#[derive(Debug, Clone)]
pub(crate) enum Command {
    /// Add a subtitle, truncating neighbours as needed.
    Insert {
        subtitle: Subtitle,
        /// Set on apply so undo can give the predecessor its end back.
        truncated: Option<Frame>,
    },
    /// Remove a subtitle. Unless `preserve_preceding_end` is set, a predecessor
    /// ending exactly where the subtitle started takes over its time.
    RemoveStart {
        subtitle: Subtitle,
        preserve_preceding_end: bool,
    },
    Replace { old: Subtitle, new: Subtitle },
    /// Swap in a whole new set of subtitles. The field holds whatever is not
    /// currently on the timeline.
    BulkLoad { subtitles: Vec<Subtitle> },
    /// Two commands undone and redone as one.
    Compound(Box<Command>, Box<Command>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "insert",
            Command::RemoveStart { .. } => "remove start",
            Command::Replace { .. } => "replace",
            Command::BulkLoad { .. } => "bulk load",
            Command::Compound(..) => "compound",
        }
    }

    pub fn apply(&mut self, timeline: &mut Timeline) -> Result<TimeSpan> {
        match self {
            Command::Insert {
                subtitle,
                truncated,
            } => {
                let insertion = timeline.insert(subtitle.clone())?;
                *truncated = insertion.truncated;
                Ok(insertion.changed)
            }
            Command::RemoveStart {
                subtitle,
                preserve_preceding_end,
            } => {
                let (index, removed) = timeline.remove(subtitle.start)?;
                if !*preserve_preceding_end {
                    if let Some(prev_index) = index.checked_sub(1) {
                        let contiguous = timeline
                            .get(prev_index)
                            .map_or(false, |prev| prev.end == removed.start);
                        if contiguous {
                            timeline.set_end(prev_index, removed.end);
                        }
                    }
                }
                Ok(removed.span())
            }
            Command::Replace { old, new } => {
                timeline.replace(old.start, new.clone())?;
                Ok(old.span().union(new.span()))
            }
            Command::BulkLoad { subtitles } => Ok(swap_all(timeline, subtitles)),
            Command::Compound(first, second) => {
                let first_changed = first.apply(timeline)?;
                match second.apply(timeline) {
                    Ok(second_changed) => Ok(first_changed.union(second_changed)),
                    Err(err) => {
                        first.undo(timeline)?;
                        Err(err)
                    }
                }
            }
        }
    }

    pub fn undo(&mut self, timeline: &mut Timeline) -> Result<TimeSpan> {
        match self {
            Command::Insert {
                subtitle,
                truncated,
            } => {
                let (index, removed) = timeline.remove(subtitle.start)?;
                let mut changed = removed.span();
                if let (Some(end), Some(prev_index)) = (*truncated, index.checked_sub(1)) {
                    timeline.set_end(prev_index, end);
                    changed = changed.union(TimeSpan::new(removed.start, end));
                }
                Ok(changed)
            }
            // Re-inserting cuts an extended predecessor back to where it was.
            Command::RemoveStart { subtitle, .. } => {
                Ok(timeline.insert(subtitle.clone())?.changed)
            }
            Command::Replace { old, new } => {
                timeline.replace(new.start, old.clone())?;
                Ok(old.span().union(new.span()))
            }
            Command::BulkLoad { subtitles } => Ok(swap_all(timeline, subtitles)),
            Command::Compound(first, second) => {
                let second_changed = second.undo(timeline)?;
                match first.undo(timeline) {
                    Ok(first_changed) => Ok(first_changed.union(second_changed)),
                    Err(err) => {
                        second.apply(timeline)?;
                        Err(err)
                    }
                }
            }
        }
    }
}

fn swap_all(timeline: &mut Timeline, subtitles: &mut Vec<Subtitle>) -> TimeSpan {
    let previous = timeline.swap_contents(mem::take(subtitles));
    *subtitles = previous;
    TimeSpan::new(0, UNBOUNDED)
}
