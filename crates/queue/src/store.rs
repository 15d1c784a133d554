//! Capability traits consumed by the transfer manager.
//!
//! The manager never talks to a network or a disk directly: delivery,
//! fallback blob storage, and queue persistence are all injected behind
//! these seams.

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::StorageError;
use crate::queue::TransferQueue;

/// A rewindable byte stream.
///
/// Streams must be seekable so that a failed send can still be persisted
/// from offset 0 afterwards.
pub trait ByteSource: Read + Seek + Send {}

impl<T: Read + Seek + Send + ?Sized> ByteSource for T {}

impl std::fmt::Debug for dyn ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ByteSource")
    }
}

/// Durable storage for the bytes of transfers that could not be delivered.
pub trait BlobStore {
    /// Saves the file at `path` and returns a unique identifier for it.
    fn save_file(&self, path: &Path) -> Result<String, StorageError>;

    /// Saves the stream contents and returns a unique identifier.
    ///
    /// The identifier is unique per call, even for repeated saves of the
    /// same bytes within the same instant.
    fn save_stream(&self, stream: &mut dyn ByteSource) -> Result<String, StorageError>;

    /// Opens the blob saved under `id`.
    ///
    /// Fails with a [`StorageAction::Read`](crate::error::StorageAction)
    /// error when the id is unknown or unreadable.
    fn fetch(&self, id: &str) -> Result<Box<dyn ByteSource>, StorageError>;

    /// Removes the blob saved under `id`. Deleting an unknown id is a
    /// silent no-op.
    fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// Persistence for a named [`TransferQueue`].
pub trait QueueRepository {
    /// Loads the queue persisted under `name`.
    ///
    /// Returns an empty queue named `name` when no persisted state exists;
    /// "not found" is never an error.
    fn load(&self, name: &str) -> Result<TransferQueue, StorageError>;

    /// Persists the queue's full current contents.
    ///
    /// Implementations drain the queue via
    /// [`flush_items`](TransferQueue::flush_items) to take the snapshot, so
    /// the queue is empty of pending items once this returns.
    fn save(&self, queue: &TransferQueue) -> Result<(), StorageError>;

    /// Creates a fresh empty queue named `name`.
    fn create(&self, name: &str) -> TransferQueue;
}

/// The external capability that performs the actual delivery.
///
/// All transport failures collapse to `false`; implementations never fail
/// with an error past this boundary. They may cache transport state (a
/// last-known remote working directory, say) behind interior mutability,
/// which is invisible to the manager.
pub trait Sender {
    fn send(&self, stream: &mut dyn ByteSource, dest_path: &str) -> bool;
}
