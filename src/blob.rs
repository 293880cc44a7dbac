//! Byte payload handles.
//!
//! A pending file never owns an eager copy of its content. It holds a
//! [`ByteSource`]: the pipeline's view of the host's file-handle abstraction
//! (a browser `File`, a memory buffer, a test double). Reading the payload in
//! full is a suspension point of the merge loop, so `read` returns a future.

use std::io;
use std::sync::Arc;

use futures::future::BoxFuture;

/// A readable handle to a file's raw bytes.
///
/// Implementations must be cheap to clone behind an `Arc` and must yield the
/// complete payload on every `read` call. Documents are treated as whole
/// units; there is no streaming contract.
pub trait ByteSource: Send + Sync {
    /// Read the full byte payload.
    fn read(&self) -> BoxFuture<'_, io::Result<Vec<u8>>>;
}

/// An in-memory payload.
///
/// Holds a shared reference to the bytes; cloning a `Blob` (or the
/// `Arc<dyn ByteSource>` wrapping it) never copies the content.
#[derive(Debug, Clone)]
pub struct Blob {
    bytes: Arc<[u8]>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into().into(),
        }
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl ByteSource for Blob {
    fn read(&self) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        Box::pin(async move { Ok(self.bytes.to_vec()) })
    }
}
