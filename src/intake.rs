//! Selection intake.
//!
//! Files arrive from the host's picker/drag-and-drop collaborator as
//! [`RawFile`]s carrying a declared MIME type and a filename. Each document
//! family screens them against its accepted-type predicate: rejected entries
//! are dropped and counted, accepted entries move on to the ordered
//! collection. The counts come back as an [`IntakeReport`] so the host can
//! notify the user; rejection is never an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blob::{Blob, ByteSource};

/// MIME type of page-based (PDF) documents.
pub const PDF_MIME: &str = "application/pdf";

/// MIME type of section-based (WordprocessingML) documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two document families the pipeline can merge.
///
/// Both families share the same pipeline shape; they differ in the assembly
/// capability behind it and in the granularity of a content unit (page vs.
/// section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentFamily {
    /// Page-based containers (PDF).
    Pdf,
    /// Section-based containers (Word `.docx`).
    Docx,
}

impl DocumentFamily {
    /// Check a raw input against this family's accepted-type predicate.
    ///
    /// PDF accepts by declared MIME type alone; Word accepts by MIME type or
    /// a `.docx` filename extension, since pickers frequently hand over Word
    /// files with a missing or generic MIME type.
    pub fn accepts(&self, file: &RawFile) -> bool {
        match self {
            Self::Pdf => file.mime.as_deref() == Some(PDF_MIME),
            Self::Docx => {
                file.mime.as_deref() == Some(DOCX_MIME)
                    || file.name.to_lowercase().ends_with(".docx")
            }
        }
    }

    /// Canonical filename of this family's merged artifact.
    pub fn output_filename(&self) -> &'static str {
        match self {
            Self::Pdf => "merged-document.pdf",
            Self::Docx => "merged-document.docx",
        }
    }

    /// MIME type of this family's merged artifact.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "Word"),
        }
    }
}

/// A user-selected file as handed over by the host, before screening.
#[derive(Clone)]
pub struct RawFile {
    /// Filename as reported by the host.
    pub name: String,

    /// Declared MIME type, if the host provided one.
    pub mime: Option<String>,

    /// Payload size in bytes.
    pub size: u64,

    /// Readable handle to the payload.
    pub source: Arc<dyn ByteSource>,
}

impl RawFile {
    /// Create a raw input from an in-memory payload.
    pub fn new(name: impl Into<String>, mime: Option<&str>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            size: blob.len(),
            source: Arc::new(blob),
        }
    }
}

impl fmt::Debug for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Accepted/rejected counts from one intake batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReport {
    /// Number of files that passed the type predicate.
    pub accepted: usize,

    /// Number of files dropped by the type predicate.
    pub rejected: usize,
}

/// Screen a batch of raw inputs against a family's type predicate.
///
/// Returns the accepted entries in input order together with the counts for
/// caller notification. Rejected entries are dropped; they never affect
/// already-accepted files.
pub fn screen(family: DocumentFamily, files: Vec<RawFile>) -> (Vec<RawFile>, IntakeReport) {
    let total = files.len();
    let accepted: Vec<RawFile> = files.into_iter().filter(|f| family.accepts(f)).collect();
    let report = IntakeReport {
        accepted: accepted.len(),
        rejected: total - accepted.len(),
    };
    (accepted, report)
}
