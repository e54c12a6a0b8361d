//! Undo/Redo History
//!
//! Linear history over full-tree snapshots. The undo stack is bounded; when
//! it overflows the oldest snapshot is dropped. Recording a new mutation
//! discards the redo stack.
//!
//! Restores go through [`NodeStore::replace_with`], so ids come back
//! verbatim and the store's id sequence is never rewound.

use crate::models::Snapshot;
use crate::store::{NodeStore, StoreError};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Default number of undo steps kept
pub const DEFAULT_UNDO_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl HistoryManager {
    /// History keeping at most `capacity` undo steps (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Snapshot `store` ahead of a mutation
    pub fn record_before_mutation(&mut self, store: &NodeStore) {
        self.push(store.snapshot());
    }

    /// Record a snapshot taken before a mutation that has since succeeded
    pub fn push(&mut self, snapshot: Snapshot) {
        self.push_undo(snapshot);
        self.redo.clear();
    }

    /// Append to the undo stack, evicting the oldest entry when full
    fn push_undo(&mut self, snapshot: Snapshot) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
            warn!(capacity = self.capacity, "Undo history full, dropped oldest entry");
        }
        self.undo.push_back(snapshot);
    }

    /// Restore the most recent snapshot
    ///
    /// Returns `false` when there is nothing to undo. If the snapshot cannot
    /// be restored both stacks and the store are left as they were.
    pub fn undo(&mut self, store: &mut NodeStore) -> Result<bool, StoreError> {
        let Some(previous) = self.undo.pop_back() else {
            return Ok(false);
        };

        let current = store.snapshot();
        if let Err(e) = store.replace_with(previous.clone()) {
            self.undo.push_back(previous);
            return Err(e);
        }
        self.redo.push(current);

        debug!(undo = self.undo.len(), redo = self.redo.len(), "Undo");
        Ok(true)
    }

    /// Re-apply the most recently undone snapshot
    pub fn redo(&mut self, store: &mut NodeStore) -> Result<bool, StoreError> {
        let Some(next) = self.redo.pop() else {
            return Ok(false);
        };

        let current = store.snapshot();
        if let Err(e) = store.replace_with(next.clone()) {
            self.redo.push(next);
            return Err(e);
        }
        self.push_undo(current);

        debug!(undo = self.undo.len(), redo = self.redo.len(), "Redo");
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
