//! Error taxonomy for the transfer queue.
//!
//! Transport failure is deliberately absent: a rejected send is the designed
//! case driving the retry loop and surfaces as a `false` return from
//! [`Sender::send`](crate::store::Sender::send), never as an error.

use std::fmt;

/// Storage action that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    Read,
    Write,
    Delete,
}

impl fmt::Display for StorageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAction::Read => f.write_str("read"),
            StorageAction::Write => f.write_str("write"),
            StorageAction::Delete => f.write_str("delete"),
        }
    }
}

/// A blob store or queue repository failure, tagged with the action that
/// failed.
#[derive(Debug, thiserror::Error)]
#[error("storage {action} failure: {message}")]
pub struct StorageError {
    pub action: StorageAction,
    pub message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    pub fn read(message: impl Into<String>) -> Self {
        Self::new(StorageAction::Read, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(StorageAction::Write, message)
    }

    pub fn delete(message: impl Into<String>) -> Self {
        Self::new(StorageAction::Delete, message)
    }

    fn new(action: StorageAction, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Errors produced by the transfer queue core.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Caller supplied an empty required argument or a destination without a
    /// filename component. Never retried, never queued.
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
