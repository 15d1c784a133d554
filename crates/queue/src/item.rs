//! A single queued transfer and its wire representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the bytes of a queued transfer come from.
///
/// A sum type rather than two optional fields: an item is always in exactly
/// one of the two states, "both set" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    /// Bytes are read fresh from a local filesystem path at send time.
    Path(String),
    /// Bytes were persisted to the blob store and are referenced by an
    /// opaque identifier.
    Blob(String),
}

/// A file or stream waiting to be delivered to a remote destination.
///
/// The destination path doubles as the queue-uniqueness key: its filename
/// component (the part after the last path separator) is what
/// [`TransferQueue::contains`](crate::queue::TransferQueue::contains) checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct TransferItem {
    source: ItemSource,
    dest_path: String,
}

impl TransferItem {
    /// Creates a path-backed item.
    pub fn from_path(src_path: impl Into<String>, dest_path: impl Into<String>) -> Self {
        Self {
            source: ItemSource::Path(src_path.into()),
            dest_path: dest_path.into(),
        }
    }

    /// Creates a blob-backed item.
    ///
    /// An empty identifier is allowed: success notifications for ad-hoc
    /// stream sends carry one, since no blob was ever persisted.
    pub fn from_blob(blob_id: impl Into<String>, dest_path: impl Into<String>) -> Self {
        Self {
            source: ItemSource::Blob(blob_id.into()),
            dest_path: dest_path.into(),
        }
    }

    pub fn source(&self) -> &ItemSource {
        &self.source
    }

    /// The local source path, when path-backed.
    pub fn src_path(&self) -> Option<&str> {
        match &self.source {
            ItemSource::Path(p) => Some(p),
            ItemSource::Blob(_) => None,
        }
    }

    /// The blob store identifier, when blob-backed.
    pub fn blob_id(&self) -> Option<&str> {
        match &self.source {
            ItemSource::Blob(id) => Some(id),
            ItemSource::Path(_) => None,
        }
    }

    pub fn dest_path(&self) -> &str {
        &self.dest_path
    }

    /// The filename component of the destination path.
    ///
    /// Both `/` and `\` are treated as separators regardless of the host OS,
    /// since destinations are remote paths. Empty when the destination ends
    /// in a separator.
    pub fn dest_filename(&self) -> &str {
        filename_of(&self.dest_path)
    }

    /// Makes the item path-backed, replacing any blob identifier.
    pub fn set_src_path(&mut self, src_path: impl Into<String>) {
        self.source = ItemSource::Path(src_path.into());
    }

    /// Makes the item blob-backed, replacing any source path.
    pub fn set_blob_id(&mut self, blob_id: impl Into<String>) {
        self.source = ItemSource::Blob(blob_id.into());
    }
}

impl fmt::Display for TransferItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ItemSource::Blob(id) => write!(f, "identifier: {id}, dest: {}", self.dest_path),
            ItemSource::Path(p) => write!(f, "src: {p}, dest: {}", self.dest_path),
        }
    }
}

/// Returns the substring after the last `/` or `\`.
pub(crate) fn filename_of(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// On-disk shape of a [`TransferItem`].
///
/// Only non-empty fields are written: blob-backed items omit `SrcPath`,
/// path-backed items omit `Identifier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(rename = "Identifier", default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(rename = "SrcPath", default, skip_serializing_if = "Option::is_none")]
    src_path: Option<String>,
    #[serde(rename = "DestPath")]
    dest_path: String,
}

impl From<TransferItem> for ItemRecord {
    fn from(item: TransferItem) -> Self {
        let (identifier, src_path) = match item.source {
            ItemSource::Blob(id) => (Some(id), None),
            ItemSource::Path(p) => (None, Some(p)),
        };
        Self {
            identifier: identifier.filter(|s| !s.is_empty()),
            src_path: src_path.filter(|s| !s.is_empty()),
            dest_path: item.dest_path,
        }
    }
}

impl TryFrom<ItemRecord> for TransferItem {
    type Error = String;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let identifier = record.identifier.filter(|s| !s.is_empty());
        let src_path = record.src_path.filter(|s| !s.is_empty());

        let source = match (identifier, src_path) {
            (Some(id), None) => ItemSource::Blob(id),
            (None, Some(p)) => ItemSource::Path(p),
            (Some(_), Some(_)) => {
                return Err("item carries both Identifier and SrcPath".into());
            }
            (None, None) => {
                return Err("item carries neither Identifier nor SrcPath".into());
            }
        };

        Ok(Self {
            source,
            dest_path: record.dest_path,
        })
    }
}
