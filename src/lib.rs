//! Editable, undoable timelines of frame-based subtitles, and the STL text
//! format they are stored in.

mod command;
mod error;
mod history;
mod sequence;
pub mod stl;
mod subtitle;
pub mod timecode;
mod timeline;

pub use crate::error::{Result, SubtitleError};
pub use crate::sequence::{Observer, RemoveOptions, Sequence, SubtitleEntry, Subtitles};
pub use crate::subtitle::{Subtitle, TimeSpan};
pub use crate::timecode::{Frame, FPS, UNBOUNDED};
