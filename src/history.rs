//! Linear undo/redo history.

use crate::command::Command;
use crate::error::{Result, SubtitleError};

#[derive(Debug, Default)]
pub(crate) struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly applied command. Anything that could be redone is
    /// forgotten.
    pub fn record(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push(command);
    }

    pub fn pop_undo(&mut self) -> Option<Command> {
        self.undo_stack.pop()
    }

    pub fn push_undo(&mut self, command: Command) {
        self.undo_stack.push(command);
    }

    pub fn pop_redo(&mut self) -> Option<Command> {
        self.redo_stack.pop()
    }

    pub fn push_redo(&mut self, command: Command) {
        self.redo_stack.push(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Merges the two most recent commands into one undoable step.
    pub fn compound_last_two(&mut self) -> Result<()> {
        if self.undo_stack.len() < 2 {
            return Err(SubtitleError::State);
        }
        let second = self.undo_stack.pop().ok_or(SubtitleError::State)?;
        let first = self.undo_stack.pop().ok_or(SubtitleError::State)?;
        self.undo_stack
            .push(Command::Compound(Box::new(first), Box::new(second)));
        Ok(())
    }
}
