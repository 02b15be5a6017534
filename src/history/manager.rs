use std::collections::VecDeque;

use crate::foundation::ids::now_millis;

/// Default number of entries kept before the oldest is evicted.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Kind of mutation a history entry reverses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    LayerAdd,
    LayerEdit,
    LayerDelete,
    CropApply,
    FilterChange,
    ImageLoad,
}

/// One reversible mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry<S> {
    pub kind: MutationKind,
    pub before: S,
    pub after: S,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Bounded undo/redo log with a cursor.
///
/// `cursor` counts applied entries: entries `[0, cursor)` can be undone, `[cursor, len)` redone.
/// Replays are bracketed by [`Self::undo`]/[`Self::redo`] and [`Self::finish_replay`]; while a
/// replay is in progress [`Self::record`] ignores new entries.
#[derive(Clone, Debug)]
pub struct HistoryManager<S> {
    entries: VecDeque<HistoryEntry<S>>,
    cursor: usize,
    limit: usize,
    replaying: bool,
}

impl<S: Clone> Default for HistoryManager<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<S: Clone> HistoryManager<S> {
    /// History keeping at most `limit` entries (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
            replaying: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Index of the newest applied entry, `None` when everything is undone.
    pub fn index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<S>> + '_ {
        self.entries.iter()
    }

    /// Record a mutation, discarding the redo tail and evicting the oldest entry past the limit.
    ///
    /// Returns `false` (and records nothing) during a replay.
    pub fn record(&mut self, kind: MutationKind, before: S, after: S) -> bool {
        if self.replaying {
            return false;
        }
        self.entries.truncate(self.cursor);
        self.entries.push_back(HistoryEntry {
            kind,
            before,
            after,
            timestamp_ms: now_millis(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len();
        tracing::debug!(?kind, len = self.entries.len(), "history recorded");
        true
    }

    /// Step back one entry and return the state to restore.
    ///
    /// Starts a replay that lasts until [`Self::finish_replay`]. `None` (and no replay) when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Option<(MutationKind, S)> {
        if self.replaying || self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.replaying = true;
        let entry = &self.entries[self.cursor];
        tracing::debug!(kind = ?entry.kind, cursor = self.cursor, "history undo");
        Some((entry.kind, entry.before.clone()))
    }

    /// Step forward one entry and return the state to restore.
    ///
    /// Starts a replay that lasts until [`Self::finish_replay`]. `None` when already at the newest
    /// entry.
    pub fn redo(&mut self) -> Option<(MutationKind, S)> {
        if self.replaying || self.cursor >= self.entries.len() {
            return None;
        }
        let entry = &self.entries[self.cursor];
        self.cursor += 1;
        self.replaying = true;
        tracing::debug!(kind = ?entry.kind, cursor = self.cursor, "history redo");
        Some((entry.kind, entry.after.clone()))
    }

    /// End the replay started by a successful undo/redo.
    pub fn finish_replay(&mut self) {
        self.replaying = false;
    }

    /// Rewrite every stored snapshot in place. Used to backfill data that resolved after the
    /// entries were recorded (hosted URLs, decoded bitmaps) without adding an entry.
    pub fn amend(&mut self, mut f: impl FnMut(&mut S)) {
        for entry in &mut self.entries {
            f(&mut entry.before);
            f(&mut entry.after);
        }
    }

    /// Drop every entry, e.g. when a new document is loaded.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.replaying = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/manager.rs"]
mod tests;
