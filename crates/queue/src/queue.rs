//! Thread-safe FIFO queue of pending transfers.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::error::TransferError;
use crate::item::TransferItem;

/// Ordered collection of pending transfers for one named queue.
///
/// A single mutex guards both the FIFO sequence and the set of destination
/// filenames, so no caller ever observes one updated without the other. The
/// filename set is a presence check, not a count: duplicate destination
/// filenames may coexist in the sequence. No method performs I/O while the
/// lock is held.
#[derive(Debug)]
pub struct TransferQueue {
    name: String,
    inner: Mutex<QueueInner>,
}

#[derive(Debug)]
struct QueueInner {
    items: VecDeque<TransferItem>,
    /// Destination filenames currently enqueued.
    filenames: HashSet<String>,
}

impl TransferQueue {
    /// Creates an empty queue with the given persistence name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                filenames: HashSet::new(),
            }),
        }
    }

    /// The queue's immutable identity, used as persistence key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an item to the tail.
    ///
    /// Fails with [`TransferError::Validation`] when the destination path has
    /// no filename component; the queue is left untouched in that case.
    pub fn enqueue(&self, item: TransferItem) -> Result<(), TransferError> {
        let filename = item.dest_filename();
        if filename.is_empty() {
            return Err(TransferError::Validation(
                "destination path should contain a filename".into(),
            ));
        }
        let filename = filename.to_string();

        let mut inner = self.inner.lock().unwrap();
        inner.filenames.insert(filename);
        inner.items.push_back(item);
        Ok(())
    }

    /// Pops the head item, or `None` when the queue is empty.
    pub fn dequeue(&self) -> Option<TransferItem> {
        let mut inner = self.inner.lock().unwrap();
        let item = inner.items.pop_front()?;
        let filename = item.dest_filename().to_string();
        inner.filenames.remove(&filename);
        Some(item)
    }

    /// Whether any enqueued item's destination ends in `dest_filename`.
    ///
    /// Compared against the last path segment of destinations, not full
    /// paths: two items targeting the same filename in different folders
    /// collide here, destination naming must be queue-unique.
    pub fn contains(&self, dest_filename: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.filenames.contains(dest_filename)
    }

    /// Atomically drains the whole queue, returning items in insertion order.
    ///
    /// This is the only bulk operation; the manager uses it to get a stable
    /// point-in-time batch, so items enqueued during processing land in the
    /// emptied queue rather than the batch being iterated.
    pub fn flush_items(&self) -> Vec<TransferItem> {
        let mut inner = self.inner.lock().unwrap();
        inner.filenames.clear();
        inner.items.drain(..).collect()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
