//! Artifact emission.
//!
//! A successful merge produces exactly one [`Artifact`]: an immutable binary
//! payload tagged with the family's canonical output filename and MIME type.
//! Emission hands it to a [`DownloadHost`], the host environment's
//! persist/download capability, in two explicit stages (acquire a transient
//! handle, then deliver) so that merge success can be tested independently of
//! host download mechanics. The transient handle is released on every exit
//! path, whether or not the delivery itself succeeded.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};
use crate::intake::DocumentFamily;
use crate::utils::format_file_size;

/// The merged, download-ready binary.
///
/// Produced once per successful merge session; immutable once created.
#[derive(Clone)]
pub struct Artifact {
    family: DocumentFamily,
    bytes: Vec<u8>,
}

impl Artifact {
    /// Create an artifact for a family from serialized output bytes.
    pub fn new(family: DocumentFamily, bytes: Vec<u8>) -> Self {
        Self { family, bytes }
    }

    /// The document family this artifact belongs to.
    pub fn family(&self) -> DocumentFamily {
        self.family
    }

    /// Canonical output filename (`merged-document.pdf` / `.docx`).
    pub fn filename(&self) -> &'static str {
        self.family.output_filename()
    }

    /// Standard MIME type for the artifact.
    pub fn mime(&self) -> &'static str {
        self.family.mime()
    }

    /// The binary payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact, returning the payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("family", &self.family)
            .field("filename", &self.filename())
            .field("size", &format_file_size(self.len()))
            .finish()
    }
}

/// The host environment's persist/download capability.
///
/// Mirrors the browser pattern of creating a temporary addressable reference
/// to the bytes, triggering the download, and revoking the reference. The
/// delivery result is the single completion signal the emission step waits
/// for before releasing resources.
pub trait DownloadHost {
    /// Transient reference to the staged bytes (an object URL, a temp file).
    type Handle;

    /// Stage the artifact's bytes, acquiring a transient handle.
    fn begin(&self, artifact: &Artifact) -> Result<Self::Handle>;

    /// Hand the staged bytes off under the artifact's filename.
    fn deliver(&self, handle: &Self::Handle, artifact: &Artifact) -> Result<()>;

    /// Release the transient handle. Runs on every exit path; must not fail.
    fn release(&self, handle: Self::Handle);
}

/// Hand an artifact to the host, releasing the transient handle on all paths.
///
/// # Errors
///
/// Returns [`MergeError::EmissionFailed`] if staging or delivery fails,
/// distinct from merge failure, since a valid artifact already exists.
pub fn emit<H: DownloadHost>(host: &H, artifact: &Artifact) -> Result<()> {
    let handle = host.begin(artifact)?;
    let delivered = host.deliver(&handle, artifact);
    // The handle is released whether or not delivery succeeded.
    host.release(handle);
    delivered
}

/// A download host that persists artifacts into a directory.
///
/// Staging writes the bytes to a temporary sibling file; delivery renames it
/// into place under the artifact's canonical filename, so a failed delivery
/// never leaves a partial output behind.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    dir: PathBuf,
}

impl DirectoryHost {
    /// Create a host that saves into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Final path an artifact will be saved to.
    pub fn target_path(&self, artifact: &Artifact) -> PathBuf {
        self.dir.join(artifact.filename())
    }

    fn emission(err: impl fmt::Display) -> MergeError {
        MergeError::emission_failed(err.to_string())
    }
}

impl DownloadHost for DirectoryHost {
    type Handle = PathBuf;

    fn begin(&self, artifact: &Artifact) -> Result<Self::Handle> {
        let staged = self.target_path(artifact).with_extension("tmp");
        std::fs::write(&staged, artifact.bytes()).map_err(Self::emission)?;
        Ok(staged)
    }

    fn deliver(&self, handle: &Self::Handle, artifact: &Artifact) -> Result<()> {
        std::fs::rename(handle, self.target_path(artifact)).map_err(Self::emission)
    }

    fn release(&self, handle: Self::Handle) {
        // After a successful rename the staged file is gone already.
        remove_if_exists(&handle);
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}
