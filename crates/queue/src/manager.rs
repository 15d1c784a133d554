//! Queue orchestration: attempt delivery, re-queue failures, notify.

use std::fs::File;

use tracing::{error, warn};

use crate::error::{StorageError, TransferError};
use crate::item::TransferItem;
use crate::queue::TransferQueue;
use crate::store::{BlobStore, ByteSource, QueueRepository, Sender};

/// Per-item outcome kind delivered to notification hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The item was delivered.
    Success,
    /// The transport rejected the item; it has been re-queued.
    Warn,
    /// The item could not be processed and was dropped from this cycle.
    Error,
}

/// Hook invoked synchronously, on the calling thread, once per outcome.
///
/// Hooks must not block significantly; they run inside the manager's
/// control flow.
pub type NotificationHook = Box<dyn Fn(Notification, &TransferItem) + Send + Sync>;

/// Orchestrates delivery attempts for one named queue.
///
/// A cycle is: [`init`](Self::init) to load the persisted queue,
/// [`apply_queue`](Self::apply_queue) to drain it and attempt every item,
/// [`save`](Self::save) to persist whatever remains. Ad-hoc sends go through
/// [`try_send_file`](Self::try_send_file) /
/// [`try_send_stream`](Self::try_send_stream) and fall into the same queue on
/// rejection.
///
/// The queue is internally synchronized and may be fed from other threads
/// while a cycle runs. The manager's own operations are not: callers that
/// share a manager across threads must serialize its calls themselves.
pub struct TransferManager {
    queue_name: String,
    queue: TransferQueue,
    repository: Box<dyn QueueRepository>,
    store: Box<dyn BlobStore>,
    sender: Box<dyn Sender>,
    hooks: Vec<NotificationHook>,
}

impl TransferManager {
    /// Creates a manager for the queue named `queue_name`.
    ///
    /// The in-memory queue starts empty; call [`init`](Self::init) to load
    /// persisted state.
    pub fn new(
        queue_name: impl Into<String>,
        repository: Box<dyn QueueRepository>,
        store: Box<dyn BlobStore>,
        sender: Box<dyn Sender>,
    ) -> Self {
        let queue_name = queue_name.into();
        Self {
            queue: TransferQueue::new(queue_name.clone()),
            queue_name,
            repository,
            store,
            sender,
            hooks: Vec::new(),
        }
    }

    /// Subscribes a notification hook. Hooks fire in subscription order.
    pub fn subscribe(&mut self, hook: NotificationHook) {
        self.hooks.push(hook);
    }

    /// The live queue, for callers that need `contains` or length checks.
    pub fn queue(&self) -> &TransferQueue {
        &self.queue
    }

    /// Replaces the in-memory queue with the persisted one. No transport I/O.
    pub fn init(&mut self) -> Result<(), StorageError> {
        self.queue = self.repository.load(&self.queue_name)?;
        Ok(())
    }

    /// [`init`](Self::init) followed by [`apply_queue`](Self::apply_queue).
    pub fn init_and_apply(&mut self) -> Result<(), StorageError> {
        self.init()?;
        self.apply_queue();
        Ok(())
    }

    /// Drains the queue and attempts delivery of every item in FIFO order.
    ///
    /// Rejected items are re-queued (blob-backed when the bytes came from
    /// the blob store or a stream). An item whose blob cannot be fetched is
    /// dropped from this cycle with an [`Notification::Error`]; its bytes
    /// may be unreachable, so it is not retried automatically. No single
    /// item's failure aborts the batch.
    pub fn apply_queue(&self) {
        for item in self.queue.flush_items() {
            if let Err(err) = self.apply_item(&item) {
                match &err {
                    TransferError::Storage(_) => {
                        error!(item = %item, error = %err, "cannot send item: storage failure");
                    }
                    _ => {
                        error!(item = %item, error = %err, "cannot send item: unmanaged failure");
                    }
                }
                self.notify(Notification::Error, &item);
            }
        }
    }

    fn apply_item(&self, item: &TransferItem) -> Result<(), TransferError> {
        if let Some(src_path) = item.src_path() {
            self.try_send_file(src_path, item.dest_path())?;
        } else if let Some(id) = item.blob_id() {
            let mut stream = self.store.fetch(id)?;
            let sent = self.send_stream(stream.as_mut(), item.dest_path(), Some(id))?;
            if sent {
                // Delivery already succeeded; a stale blob is not worth
                // failing the item over.
                if let Err(err) = self.store.delete(id) {
                    warn!(id = %id, error = %err, "cannot delete delivered blob");
                }
            }
        }
        Ok(())
    }

    /// [`apply_queue`](Self::apply_queue) followed by [`save`](Self::save).
    pub fn apply_and_save(&self) -> Result<(), StorageError> {
        self.apply_queue();
        self.save()
    }

    /// Persists the current queue contents — after
    /// [`apply_queue`](Self::apply_queue), that is the post-retry remainder.
    /// No transport I/O.
    pub fn save(&self) -> Result<(), StorageError> {
        self.repository.save(&self.queue)
    }

    /// Attempts to deliver a local file to `dest_path`.
    ///
    /// Returns `Ok(true)` on delivery. On transport rejection the item is
    /// enqueued path-backed for a later cycle and `Ok(false)` is returned.
    /// Fails with [`TransferError::Validation`] when either argument is
    /// empty, and with [`TransferError::Io`] when the file cannot be opened.
    pub fn try_send_file(&self, src_path: &str, dest_path: &str) -> Result<bool, TransferError> {
        if src_path.is_empty() {
            return Err(TransferError::Validation(
                "source path should not be empty".into(),
            ));
        }
        if dest_path.is_empty() {
            return Err(TransferError::Validation(
                "destination path should not be empty".into(),
            ));
        }

        let mut file = File::open(src_path)?;
        let item = TransferItem::from_path(src_path, dest_path);
        if self.sender.send(&mut file, dest_path) {
            self.notify(Notification::Success, &item);
            return Ok(true);
        }

        self.queue.enqueue(item.clone())?;
        self.notify(Notification::Warn, &item);
        Ok(false)
    }

    /// Attempts to deliver a stream to `dest_path`.
    ///
    /// Returns `Ok(true)` on delivery. On transport rejection the stream is
    /// persisted through the blob store (so the bytes survive a process
    /// restart) and a blob-backed item is enqueued; a storage write failure
    /// there propagates, since the item cannot be safely queued without a
    /// valid identifier.
    pub fn try_send_stream(
        &self,
        stream: &mut dyn ByteSource,
        dest_path: &str,
    ) -> Result<bool, TransferError> {
        if dest_path.is_empty() {
            return Err(TransferError::Validation(
                "destination path should not be empty".into(),
            ));
        }
        self.send_stream(stream, dest_path, None)
    }

    fn send_stream(
        &self,
        stream: &mut dyn ByteSource,
        dest_path: &str,
        known_id: Option<&str>,
    ) -> Result<bool, TransferError> {
        if self.sender.send(stream, dest_path) {
            let item = TransferItem::from_blob(known_id.unwrap_or_default(), dest_path);
            self.notify(Notification::Success, &item);
            return Ok(true);
        }

        warn!(dest = %dest_path, "cannot send stream, queueing it for retry");

        let id = match known_id {
            Some(id) => id.to_string(),
            None => self.store.save_stream(stream)?,
        };

        let item = TransferItem::from_blob(id, dest_path);
        self.queue.enqueue(item.clone())?;
        self.notify(Notification::Warn, &item);
        Ok(false)
    }

    fn notify(&self, kind: Notification, item: &TransferItem) {
        for hook in &self.hooks {
            hook(kind, item);
        }
    }
}
