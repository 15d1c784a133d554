//! Durable outbound transfer queue with retry on transport failure.
//!
//! Callers hand files or streams to a [`TransferManager`] for delivery to a
//! remote destination. Delivery goes through an injected [`Sender`]; when the
//! transport rejects an item, its bytes are persisted through a [`BlobStore`]
//! and the item is re-queued for a later cycle. The queue itself survives
//! process restarts through a [`QueueRepository`].
//!
//! The manager processes items sequentially on the calling thread. The only
//! shared mutable state is the [`TransferQueue`], which is safe to feed from
//! other threads while a cycle is running.

pub mod error;
pub mod item;
pub mod manager;
pub mod queue;
pub mod store;

pub use error::{StorageAction, StorageError, TransferError};
pub use item::{ItemSource, TransferItem};
pub use manager::{Notification, NotificationHook, TransferManager};
pub use queue::TransferQueue;
pub use store::{BlobStore, ByteSource, QueueRepository, Sender};
