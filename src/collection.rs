//! The ordered collection of pending files.
//!
//! Insertion order is merge order and is semantically significant: it defines
//! the order of content units in the output document. The collection is only
//! mutated through its operation contract (append, remove-by-identity,
//! move-by-index-pair), which keeps the invariants (unique identities, no
//! holes) intact no matter what a racing UI asks for. Misuse with stale data
//! (an identity already removed, an index from an outdated render) is a
//! tolerated no-op, never an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blob::ByteSource;
use crate::intake::RawFile;
use crate::utils::format_file_size;

/// Stable identity of a pending file.
///
/// Generated from a per-collection monotonically increasing counter, so two
/// same-named files added in the same batch can never collide. Unique for the
/// lifetime of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(u64);

/// One user-selected input awaiting merge.
///
/// Holds a reference to the payload handle, never an eager copy of the
/// content. `name` and `size` are derived, read-only presentation data.
#[derive(Clone)]
pub struct PendingFile {
    id: FileId,
    name: String,
    size: u64,
    payload: Arc<dyn ByteSource>,
}

impl PendingFile {
    /// Stable identity within the collection's lifetime.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Filename for presentation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Payload size as a human-readable string.
    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }

    /// Readable handle to the payload.
    pub fn payload(&self) -> &Arc<dyn ByteSource> {
        &self.payload
    }
}

impl fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Ordered sequence of pending files.
#[derive(Debug, Default)]
pub struct OrderedCollection {
    entries: Vec<PendingFile>,
    next_id: u64,
}

impl OrderedCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append already-screened files to the tail, in input order.
    ///
    /// Each entry receives a freshly generated unique identity. Returns the
    /// assigned identities, in the same order as the input.
    pub fn append(&mut self, files: Vec<RawFile>) -> Vec<FileId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let id = FileId(self.next_id);
            self.next_id += 1;
            self.entries.push(PendingFile {
                id,
                name: file.name,
                size: file.size,
                payload: file.source,
            });
            ids.push(id);
        }
        ids
    }

    /// Remove the entry with the given identity.
    ///
    /// Returns `true` if an entry was removed. An absent identity is a no-op,
    /// not an error.
    pub fn remove(&mut self, id: FileId) -> bool {
        match self.entries.iter().position(|f| f.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Relocate the entry at `from` to position `to`, shifting the entries
    /// in between.
    ///
    /// Both indices must reference valid positions at call time; equal or
    /// out-of-bounds indices (stale indices from a rendered snapshot) are
    /// tolerated as no-ops rather than corrupting the order. Returns `true`
    /// if the order changed.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Current entries, in merge order.
    pub fn entries(&self) -> &[PendingFile] {
        &self.entries
    }

    /// Current order of identities.
    pub fn order(&self) -> Vec<FileId> {
        self.entries.iter().map(PendingFile::id).collect()
    }

    /// Frozen copy of the current entries for a merge session.
    ///
    /// The order is frozen; payloads are shared references. Mutations to the
    /// live collection after this call cannot affect the snapshot.
    pub fn snapshot(&self) -> Vec<PendingFile> {
        self.entries.clone()
    }
}
