//! The editable subtitle timeline.
//!
//! A [`Sequence`] keeps its subtitles sorted by start, with no two starting
//! together, none overlapping, and none of zero length. Every edit goes through
//! a reversible command, so it can be undone and redone, and every applied,
//! undone or redone command reports the range of frames it touched to the
//! registered observers.

use crate::command::Command;
use crate::error::{Result, SubtitleError};
use crate::history::History;
use crate::stl;
use crate::subtitle::{encode_line_breaks, Subtitle, TimeSpan};
use crate::timecode::{Frame, UNBOUNDED};
use crate::timeline::Timeline;

use std::fmt;
use std::io::Write;

/// Receives the range of frames changed by each command.
pub trait Observer {
    fn notify(&mut self, span: TimeSpan);
}

impl<F: FnMut(TimeSpan)> Observer for F {
    fn notify(&mut self, span: TimeSpan) {
        self(span)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Keep the end of a directly preceding subtitle where it is, instead of
    /// letting it take over the removed subtitle's time.
    pub preserve_preceding_subtitle_end: bool,
}

/// One subtitle visited by [`Sequence::subtitles_between`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtitleEntry<'a> {
    pub start: Frame,
    pub end: Frame,
    pub text: &'a str,
    /// Start of the following subtitle, to tell adjacent neighbours from gaps.
    pub next_start: Option<Frame>,
}

/// Iterator over the subtitles of a range. Cloning it restarts from the
/// current position.
#[derive(Debug, Clone)]
pub struct Subtitles<'a> {
    subtitles: &'a [Subtitle],
    index: usize,
    end: Frame,
}

impl<'a> Iterator for Subtitles<'a> {
    type Item = SubtitleEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let subtitles = self.subtitles;
        let sub = subtitles
            .get(self.index)
            .filter(|sub| sub.start < self.end)?;
        self.index += 1;
        Some(SubtitleEntry {
            start: sub.start,
            end: sub.end,
            text: &sub.text,
            next_start: subtitles.get(self.index).map(|next| next.start),
        })
    }
}

#[derive(Default)]
pub struct Sequence {
    timeline: Timeline,
    history: History,
    observers: Vec<Box<dyn Observer>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            timeline: Timeline::new(),
            history: History::new(),
            observers: Vec::new(),
        }
    }

    /// Builds a sequence from STL text. The load itself cannot be undone.
    pub fn from_stl(input: &str) -> Result<Self> {
        let mut seq = Self::new();
        seq.load_stl(input)?;
        seq.clear_undo_stack();
        Ok(seq)
    }

    /// Replaces the whole contents with the subtitles in `input`, as a single
    /// undoable step.
    ///
    /// Overlapping subtitles in the input are resolved the same way
    /// [`add_subtitle`](Self::add_subtitle) resolves them. Nothing changes if
    /// the input fails to load.
    pub fn load_stl(&mut self, input: &str) -> Result<()> {
        let mut loaded = Timeline::new();
        for sub in stl::parse(input)? {
            loaded.insert(sub)?;
        }
        tracing::debug!("Loaded {} subtitles", loaded.len());
        self.execute(Command::BulkLoad {
            subtitles: loaded.swap_contents(Vec::new()),
        })?;
        Ok(())
    }

    pub fn to_stl(&self) -> String {
        stl::to_stl(self.iter())
    }

    pub fn write_stl<W: Write>(&self, buf: &mut W) -> Result<()> {
        stl::write_stl(buf, self.iter())
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subtitle> {
        self.timeline.as_slice().iter()
    }

    /// The subtitle shown at `time`. Ends are exclusive.
    pub fn subtitle_at(&self, time: Frame) -> Option<&Subtitle> {
        self.timeline.find(time).map(|(_, sub)| sub)
    }

    /// The subtitle shown at `time`, or else the next one to be shown.
    pub fn subtitle_at_or_after(&self, time: Frame) -> Option<&Subtitle> {
        self.timeline.get(self.timeline.index_from_time(time))
    }

    /// Subtitles ending after `start` and starting before `end`, in order.
    pub fn subtitles_between(&self, start: Frame, end: Frame) -> Subtitles<'_> {
        Subtitles {
            subtitles: self.timeline.as_slice(),
            index: self.timeline.index_from_time(start),
            end,
        }
    }

    /// Calls `visit(start, end, text, next_start)` for each subtitle in
    /// `start..end`.
    pub fn each_subtitle<F>(&self, start: Frame, end: Frame, mut visit: F)
    where
        F: FnMut(Frame, Frame, &str, Option<Frame>),
    {
        for entry in self.subtitles_between(start, end) {
            visit(entry.start, entry.end, entry.text, entry.next_start);
        }
    }

    /// Adds a subtitle. It is cut short where the next subtitle starts, and
    /// cuts short a preceding subtitle still running at `start`.
    ///
    /// Line endings in `text` are stored as `\n` break markers, the same form
    /// the subtitle is written and read back in.
    pub fn add_subtitle(
        &mut self,
        start: Frame,
        end: Frame,
        text: impl Into<String>,
    ) -> Result<TimeSpan> {
        self.execute(Command::Insert {
            subtitle: Subtitle::new(start, end, encode_line_breaks(&text.into())),
            truncated: None,
        })
    }

    /// Removes the subtitle shown at `time`.
    ///
    /// A preceding subtitle ending right where the removed one started is
    /// extended over its time, unless the options say otherwise.
    pub fn remove_start_of_subtitle_at(
        &mut self,
        time: Frame,
        options: RemoveOptions,
    ) -> Result<TimeSpan> {
        let subtitle = self.owner(time)?.clone();
        self.execute(Command::RemoveStart {
            subtitle,
            preserve_preceding_end: options.preserve_preceding_subtitle_end,
        })
    }

    /// Extends the subtitle shown at `time` up to the start of the next one.
    pub fn remove_end_of_subtitle_at(&mut self, time: Frame) -> Result<TimeSpan> {
        let (index, old) = self
            .timeline
            .find(time)
            .ok_or(SubtitleError::NoSubtitle(time))?;
        let next_start = self
            .timeline
            .get(index + 1)
            .map(|next| next.start)
            .ok_or(SubtitleError::Boundary)?;
        let new = Subtitle {
            end: next_start,
            ..old.clone()
        };
        let old = old.clone();
        self.execute(Command::Replace { old, new })
    }

    /// Sets the text shown at `time`.
    ///
    /// Empty text removes the subtitle shown at `time`, leaving the preceding
    /// one alone; with nothing shown there it does nothing and returns `None`.
    /// Text typed into a gap starts a new subtitle at `time` lasting until the
    /// next one. Line endings are stored as break markers, as in
    /// [`add_subtitle`](Self::add_subtitle).
    pub fn change_subtitle_text_at_time_to(
        &mut self,
        time: Frame,
        text: impl Into<String>,
    ) -> Result<Option<TimeSpan>> {
        let text = encode_line_breaks(&text.into());
        let owner = self.timeline.find(time).map(|(_, sub)| sub.clone());

        let command = match owner {
            Some(_) if text.is_empty() => {
                let options = RemoveOptions {
                    preserve_preceding_subtitle_end: true,
                };
                return self.remove_start_of_subtitle_at(time, options).map(Some);
            }
            None if text.is_empty() => return Ok(None),
            Some(old) => Command::Replace {
                new: Subtitle {
                    text,
                    ..old.clone()
                },
                old,
            },
            None => {
                let end = self
                    .subtitle_at_or_after(time)
                    .map_or(UNBOUNDED, |next| next.start);
                Command::Insert {
                    subtitle: Subtitle::new(time, end, text),
                    truncated: None,
                }
            }
        };
        self.execute(command).map(Some)
    }

    /// Merges the two most recent edits into one undoable step.
    pub fn compound_last_two_commands(&mut self) -> Result<()> {
        self.history.compound_last_two()
    }

    /// Reverts the most recent edit. Returns `None` when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> Result<Option<TimeSpan>> {
        let mut command = match self.history.pop_undo() {
            Some(command) => command,
            None => return Ok(None),
        };
        match command.undo(&mut self.timeline) {
            Ok(changed) => {
                tracing::debug!("Undid {} at {:?}", command.name(), changed);
                self.history.push_redo(command);
                self.notify(changed);
                Ok(Some(changed))
            }
            Err(err) => {
                self.history.push_undo(command);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone edit. Returns `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<Option<TimeSpan>> {
        let mut command = match self.history.pop_redo() {
            Some(command) => command,
            None => return Ok(None),
        };
        match command.apply(&mut self.timeline) {
            Ok(changed) => {
                tracing::debug!("Redid {} at {:?}", command.name(), changed);
                self.history.push_undo(command);
                self.notify(changed);
                Ok(Some(changed))
            }
            Err(err) => {
                self.history.push_redo(command);
                Err(err)
            }
        }
    }

    pub fn undo_available(&self) -> bool {
        self.history.can_undo()
    }

    pub fn redo_available(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Forgets all history without touching the subtitles.
    pub fn clear_undo_stack(&mut self) {
        self.history.clear();
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn register_observer<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    fn owner(&self, time: Frame) -> Result<&Subtitle> {
        self.subtitle_at(time).ok_or(SubtitleError::NoSubtitle(time))
    }

    fn execute(&mut self, mut command: Command) -> Result<TimeSpan> {
        let changed = command.apply(&mut self.timeline)?;
        tracing::debug!("Applied {} at {:?}", command.name(), changed);
        self.history.record(command);
        self.notify(changed);
        Ok(changed)
    }

    fn notify(&mut self, changed: TimeSpan) {
        for observer in self.observers.iter_mut() {
            observer.notify(changed);
        }
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Sequence")
            .field("subtitles", &self.timeline.as_slice())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("observers", &self.observers.len())
            .finish()
    }
}
