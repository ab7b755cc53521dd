//! Linear undo/redo log over whole drawings.
//!
//! Every transition takes the history by value and returns the next one, so
//! a caller can never observe a half-applied step.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::shape::Drawing;

#[derive(Debug, Clone)]
pub enum HistoryEvent {
    Append(Rc<Drawing>),
    Undo,
    Redo,
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// Oldest first; the last entry is the current drawing.
    past: Vec<Rc<Drawing>>,
    /// Next drawing to redo first.
    future: VecDeque<Rc<Drawing>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(self, event: HistoryEvent) -> Self {
        match event {
            HistoryEvent::Append(drawing) => self.append(drawing),
            HistoryEvent::Undo => self.undo(),
            HistoryEvent::Redo => self.redo(),
            HistoryEvent::Reset => self.reset(),
        }
    }

    /// Record a new drawing. Any redo branch is discarded.
    pub fn append(mut self, drawing: Rc<Drawing>) -> Self {
        self.past.push(drawing);
        self.future.clear();
        self
    }

    /// Step back one drawing. The oldest drawing is never popped.
    pub fn undo(mut self) -> Self {
        if self.past.len() > 1 {
            if let Some(last) = self.past.pop() {
                self.future.push_front(last);
            }
        }
        self
    }

    pub fn redo(mut self) -> Self {
        if let Some(next) = self.future.pop_front() {
            self.past.push(next);
        }
        self
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Rc<Drawing>> {
        self.past.last()
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn future(&self) -> impl Iterator<Item = &Rc<Drawing>> {
        self.future.iter()
    }
}
