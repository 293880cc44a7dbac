//! The merge driver.
//!
//! Consumes a frozen snapshot of the ordered collection, decodes each payload
//! through the document-assembly capability, batch-copies its content units
//! into the accumulating output, and publishes fractional progress after each
//! file. The merge is all-or-nothing: any failure aborts the session with no
//! partial artifact.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::assembly::DocumentAssembly;
use crate::collection::PendingFile;
use crate::emit::Artifact;
use crate::error::{MergeError, Result};
use crate::session::MergeSession;
use crate::utils::format_file_size;

/// Statistics about a completed merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of files merged.
    pub files_merged: usize,

    /// Total content units (pages or sections) in the output.
    pub total_units: usize,

    /// Total size of the input payloads in bytes.
    pub input_bytes: u64,

    /// Time taken for the whole merge.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl MergeStatistics {
    /// Format input size as a human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_bytes)
    }
}

/// Result of a successful merge: the artifact plus statistics.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The merged, download-ready artifact.
    pub artifact: Artifact,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Drives one merge over a frozen snapshot.
#[derive(Debug, Default)]
pub struct MergeDriver<A: DocumentAssembly> {
    assembly: A,
}

impl<A: DocumentAssembly> MergeDriver<A> {
    /// Create a driver over an assembly capability.
    pub fn new(assembly: A) -> Self {
        Self { assembly }
    }

    /// The underlying assembly capability.
    pub fn assembly(&self) -> &A {
        &self.assembly
    }

    /// Run a merge over `snapshot`, publishing progress into `session`.
    ///
    /// Content units appear in the output in exactly the snapshot's file
    /// order and, within each file, in that file's original internal order.
    /// Progress is observable through the session's channel before the next
    /// file is touched.
    ///
    /// # Errors
    ///
    /// - [`MergeError::EmptyCollection`] if the snapshot is empty (no
    ///   progress is published).
    /// - [`MergeError::ReadFailed`] / [`MergeError::DecodeFailed`] /
    ///   [`MergeError::MergeFailed`] / [`MergeError::SerializationFailed`]
    ///   abort the whole session; no partial artifact is produced.
    pub async fn run(
        &self,
        snapshot: &[PendingFile],
        session: &MergeSession,
    ) -> Result<MergeOutcome> {
        if snapshot.is_empty() {
            return Err(MergeError::EmptyCollection);
        }

        let start = Instant::now();
        let total = snapshot.len();
        let mut output = self.assembly.new_output()?;
        let mut total_units = 0;
        let mut input_bytes = 0u64;

        for (index, file) in snapshot.iter().enumerate() {
            let bytes = file
                .payload()
                .read()
                .await
                .map_err(|source| MergeError::ReadFailed {
                    name: file.name().to_string(),
                    source,
                })?;
            input_bytes += bytes.len() as u64;

            let document = self.assembly.decode(file.name(), &bytes)?;
            total_units += self.assembly.append_document(&mut output, document)?;

            session.advance(index + 1, total);
        }

        let bytes = self.assembly.serialize(output)?;
        let artifact = Artifact::new(self.assembly.family(), bytes);

        Ok(MergeOutcome {
            artifact,
            statistics: MergeStatistics {
                files_merged: total,
                total_units,
                input_bytes,
                elapsed: start.elapsed(),
            },
        })
    }
}
