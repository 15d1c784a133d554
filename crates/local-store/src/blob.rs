//! Single-directory blob store for undelivered bytes.

use std::fs::File;
use std::io::{SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tracing::error;
use uuid::Uuid;

use filerelay_queue::error::StorageError;
use filerelay_queue::store::{BlobStore, ByteSource};

/// Stores every blob as one file in a single directory, named by a derived
/// unique identifier.
///
/// The identifier combines a hash of the source path, a nanosecond
/// timestamp, and a per-instance sequence counter, so repeated saves of the
/// same input yield distinct ids even within the same instant. The original
/// extension is kept at the end of the id.
pub struct LocalBlobStore {
    dir: PathBuf,
    seq: AtomicU64,
}

impl LocalBlobStore {
    /// Creates a store over an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    fn unique_id(&self, full_path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(full_path.as_bytes());
        let digest = hex::encode(&hasher.finalize()[..16]);

        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let ext = extension_of(full_path);

        format!("{digest}-{nanos:x}-{seq:x}{ext}")
    }
}

impl BlobStore for LocalBlobStore {
    fn save_file(&self, path: &Path) -> Result<String, StorageError> {
        let id = self.unique_id(&path.to_string_lossy());
        let target = self.dir.join(&id);

        if let Err(err) = std::fs::copy(path, &target) {
            error!(path = %path.display(), error = %err, "cannot save file into blob store");
            return Err(StorageError::write(format!(
                "cannot write the file \"{}\" into the blob store",
                path.display()
            ))
            .with_source(err));
        }

        Ok(id)
    }

    fn save_stream(&self, stream: &mut dyn ByteSource) -> Result<String, StorageError> {
        // Simulate a full path so anonymous streams get the same id scheme.
        let pseudo_path = format!("{}.stream", Uuid::new_v4());
        let id = self.unique_id(&pseudo_path);
        let target = self.dir.join(&id);

        match copy_from_start(stream, &target) {
            Ok(()) => Ok(id),
            Err(err) => {
                error!(error = %err, "cannot save stream into blob store");
                Err(
                    StorageError::write("cannot write the stream into the blob store")
                        .with_source(err),
                )
            }
        }
    }

    fn fetch(&self, id: &str) -> Result<Box<dyn ByteSource>, StorageError> {
        let path = self.dir.join(id);
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(err) => {
                error!(id = %id, error = %err, "cannot read blob");
                Err(
                    StorageError::read(format!("cannot read the blob with id \"{id}\""))
                        .with_source(err),
                )
            }
        }
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.dir.join(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // An already-gone blob is the desired end state.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::delete(format!(
                "the blob with id \"{id}\" cannot be deleted"
            ))
            .with_source(err)),
        }
    }
}

/// Rewinds the stream and copies it into a new file at `target`.
fn copy_from_start(stream: &mut dyn ByteSource, target: &Path) -> std::io::Result<()> {
    stream.seek(SeekFrom::Start(0))?;
    let mut file = File::create(target)?;

    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
    }
    Ok(())
}

/// Returns the extension of the filename component, dot included.
fn extension_of(path: &str) -> &str {
    let name = match path.rfind(['/', '\\']) {
        Some(i) => &path[i + 1..],
        None => path,
    };
    match name.rfind('.') {
        Some(i) if i > 0 => &name[i..],
        _ => "",
    }
}
