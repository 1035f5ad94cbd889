//! Bounded undo/redo history of executed commands.

use std::collections::VecDeque;

use diagramkit_core::Result;

use crate::commands::{Command, DiagramCommand};
use crate::store::EntityStore;

pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Debug)]
pub struct CommandHistory {
    undo_stack: VecDeque<DiagramCommand>,
    redo_stack: Vec<DiagramCommand>,
    max_depth: usize,
    enabled: bool,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl CommandHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            enabled: true,
        }
    }

    /// Records an already executed command. Clears the redo stack and drops
    /// the oldest entry past `max_depth`; ignored while disabled.
    pub fn record(&mut self, command: DiagramCommand) {
        if !self.enabled {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Undoes the newest command. `Ok(false)` when there is nothing to undo;
    /// a failed undo stays on the undo stack.
    pub fn undo(&mut self, store: &mut EntityStore) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        match command.undo(store) {
            Ok(()) => {
                self.redo_stack.push(command);
                Ok(true)
            }
            Err(err) => {
                self.undo_stack.push_back(command);
                Err(err)
            }
        }
    }

    pub fn redo(&mut self, store: &mut EntityStore) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match command.execute(store) {
            Ok(()) => {
                self.undo_stack.push_back(command);
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(command);
                Err(err)
            }
        }
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

    /// Name of the command [`undo`](Self::undo) would revert
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.name())
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.name())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Disabling also clears both stacks.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}
