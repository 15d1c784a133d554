//! JSON-file persistence for named transfer queues.

use std::path::PathBuf;

use tracing::warn;

use filerelay_queue::error::StorageError;
use filerelay_queue::item::TransferItem;
use filerelay_queue::queue::TransferQueue;
use filerelay_queue::store::QueueRepository;

/// Characters stripped from queue names to form a legal filename.
const REJECTED_NAME_CHARS: [char; 8] = ['?', '%', '*', ':', '|', '"', '/', '\\'];

/// Suffix appended to the sanitized queue name to form the storage key.
const QUEUE_FILE_SUFFIX: &str = ".queue";

/// Persists each queue as one JSON file named `<sanitized name>.queue`
/// inside a configured directory. The on-disk array is in FIFO order.
pub struct LocalQueueRepository {
    dir: PathBuf,
}

impl LocalQueueRepository {
    /// Creates a repository over an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn queue_path(&self, name: &str) -> PathBuf {
        let cleaned: String = name
            .chars()
            .filter(|c| !REJECTED_NAME_CHARS.contains(c))
            .collect();
        self.dir.join(format!("{cleaned}{QUEUE_FILE_SUFFIX}"))
    }
}

impl QueueRepository for LocalQueueRepository {
    fn load(&self, name: &str) -> Result<TransferQueue, StorageError> {
        let queue = self.create(name);
        let path = self.queue_path(name);

        if !path.exists() {
            warn!(queue = %name, path = %path.display(), "queue has no persisted state");
            return Ok(queue);
        }

        let contents = std::fs::read_to_string(&path).map_err(|err| {
            StorageError::read(format!("cannot read the queue file \"{}\"", path.display()))
                .with_source(err)
        })?;

        let items: Vec<TransferItem> = serde_json::from_str(&contents).map_err(|err| {
            StorageError::read(format!(
                "the queue file \"{}\" is corrupt: {err}",
                path.display()
            ))
        })?;

        for item in items {
            // A persisted destination without a filename is corrupt state.
            queue.enqueue(item).map_err(|err| {
                StorageError::read(format!(
                    "the queue file \"{}\" holds an invalid item: {err}",
                    path.display()
                ))
            })?;
        }

        Ok(queue)
    }

    fn save(&self, queue: &TransferQueue) -> Result<(), StorageError> {
        let items = queue.flush_items();
        let json = serde_json::to_string_pretty(&items).map_err(|err| {
            StorageError::write(format!(
                "cannot serialize the queue \"{}\": {err}",
                queue.name()
            ))
        })?;

        let path = self.queue_path(queue.name());
        std::fs::write(&path, json).map_err(|err| {
            StorageError::write(format!(
                "cannot write the queue file \"{}\"",
                path.display()
            ))
            .with_source(err)
        })
    }

    fn create(&self, name: &str) -> TransferQueue {
        TransferQueue::new(name)
    }
}
