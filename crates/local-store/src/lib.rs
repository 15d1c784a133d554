//! Reference local implementations of the storage capabilities.
//!
//! [`LocalBlobStore`] keeps fallback blobs as individual files in one
//! directory; [`LocalQueueRepository`] persists each queue as a JSON file.
//! Both are plain-filesystem implementations of the `filerelay-queue`
//! traits, suitable for batch jobs that retry from the same host.

pub mod blob;
pub mod repository;

pub use blob::LocalBlobStore;
pub use repository::LocalQueueRepository;
