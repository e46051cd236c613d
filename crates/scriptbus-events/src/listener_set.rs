use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::EventError;
use crate::listener::ListenerResult;

struct Entry<L: ?Sized> {
    /// Insertion sequence number, strictly increasing within a set
    seq: u64,
    listener: Arc<L>,
}

struct Inner<L: ?Sized> {
    /// Sorted by `seq`
    entries: Vec<Entry<L>>,
    next_seq: u64,
}

/// Ordered listener collection shared between a bus and its host adapter.
///
/// The lock is only held for structural changes and for locating the next
/// entry during a dispatch, never while a listener runs. Listeners may add or
/// remove listeners (including themselves) from inside a callback.
///
/// Dispatch is weakly consistent: entries are visited in insertion order by
/// sequence number, so an entry is never visited twice in one dispatch,
/// entries appended after the dispatch started are skipped, and an entry
/// removed mid-dispatch is skipped only if the cursor has not reached it yet.
pub struct ListenerSet<L: ?Sized> {
    inner: RwLock<Inner<L>>,
}

impl<L: ?Sized> ListenerSet<L> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                next_seq: 0,
            }),
        }
    }

    /// Append a listener, returning true if the set was empty before
    pub fn push(&self, listener: Arc<L>) -> bool {
        let mut inner = self.inner.write();
        let was_empty = inner.entries.is_empty();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry { seq, listener });
        was_empty
    }

    /// Remove the first entry holding this exact handle.
    ///
    /// Returns the number of remaining entries, or `None` if the handle was
    /// not present.
    pub fn remove(&self, listener: &Arc<L>) -> Option<usize> {
        let mut inner = self.inner.write();
        let index = inner
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.listener, listener))?;
        inner.entries.remove(index);
        Some(inner.entries.len())
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.inner
            .read()
            .entries
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.listener, listener))
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Call `f` for each listener in insertion order, stopping at the first
    /// error.
    pub fn dispatch<F>(&self, mut f: F) -> Result<(), EventError>
    where
        F: FnMut(&Arc<L>) -> ListenerResult,
    {
        let end = self.inner.read().next_seq;
        let mut cursor = 0u64;
        let mut position = 0usize;

        while let Some((seq, listener)) = self.next_entry(cursor, end) {
            cursor = seq + 1;
            f(&listener).map_err(|source| EventError::Listener { position, source })?;
            position += 1;
        }

        Ok(())
    }

    /// First entry with `cursor <= seq < end`
    fn next_entry(&self, cursor: u64, end: u64) -> Option<(u64, Arc<L>)> {
        let inner = self.inner.read();
        let index = inner.entries.partition_point(|entry| entry.seq < cursor);
        inner
            .entries
            .get(index)
            .filter(|entry| entry.seq < end)
            .map(|entry| (entry.seq, Arc::clone(&entry.listener)))
    }
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerSet<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}
