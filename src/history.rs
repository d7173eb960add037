// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! History system for undo/redo functionality.
//!
//! Snapshots are whole-document clones. The owning editor saves the
//! pre-mutation state before every committed change.

/// Default number of undo states kept per document.
pub const MAX_UNDO_COUNT: usize = 1000;

/// Bounded undo stack plus redo stack over document snapshots.
#[derive(Debug, Clone)]
pub struct UndoRedoManager<T> {
    /// Undo stack (past states)
    undo_stack: Vec<T>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<T>,
    /// Maximum undo history size
    max_size: usize,
}

impl<T: Clone + PartialEq> Default for UndoRedoManager<T> {
    fn default() -> Self {
        Self::new(MAX_UNDO_COUNT)
    }
}

impl<T: Clone + PartialEq> UndoRedoManager<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Save the current state before making a change.
    ///
    /// A state equal to the top of the undo stack is ignored.
    pub fn save_undo_state(&mut self, state: &T) {
        if self.undo_stack.last() == Some(state) {
            return;
        }
        if self.undo_stack.len() == self.max_size {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(state.clone());
        // Clear redo stack when new action is performed
        self.redo_stack.clear();
    }

    /// Undo: push `current` onto the redo stack and return the previous state.
    pub fn perform_undo(&mut self, current: &T) -> Option<T> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Redo: push `current` onto the undo stack and return the next state.
    pub fn perform_redo(&mut self, current: &T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        if self.undo_stack.len() == self.max_size {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
