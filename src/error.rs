//! Error types for docjoin.
//!
//! This module defines the failure taxonomy of the merge pipeline. Fatal
//! errors terminate the current merge session; rejections (`EmptyCollection`,
//! `MergeInProgress`) are refused up front and never create or disturb a
//! session. Intake rejections and collection misuse (absent identity, stale
//! index) are deliberately *not* errors: they are counted or ignored so the
//! embedding UI stays simple and race-tolerant.

use std::io;

/// Result type alias for docjoin operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Main error type for the merge pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A merge was triggered with zero pending files.
    #[error("no files to merge")]
    EmptyCollection,

    /// A merge was triggered (or the collection mutated) while a session
    /// is already running.
    #[error("a merge is already in progress")]
    MergeInProgress,

    /// The raw bytes of a pending file could not be read.
    #[error("failed to read {name}")]
    ReadFailed {
        /// Display name of the file whose payload was unreadable.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file's bytes could not be parsed as the expected document format.
    ///
    /// Fatal to the whole session: the merge is all-or-nothing, so a decode
    /// failure aborts without producing a partial artifact.
    #[error("failed to decode {name}: {reason}")]
    DecodeFailed {
        /// Display name of the offending file.
        name: String,
        /// Details from the document-assembly capability.
        reason: String,
    },

    /// A structural failure while appending content units to the output.
    #[error("merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The fully-assembled output could not be serialized to bytes.
    #[error("failed to serialize merged document: {reason}")]
    SerializationFailed {
        /// Details from the document-assembly capability.
        reason: String,
    },

    /// The host hand-off failed after a valid artifact was produced.
    ///
    /// Distinct from merge failure: the merge itself succeeded.
    #[error("failed to deliver artifact: {reason}")]
    EmissionFailed {
        /// Details from the download host.
        reason: String,
    },
}

impl MergeError {
    /// Create a `DecodeFailed` error.
    pub fn decode_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a `MergeFailed` error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a `SerializationFailed` error.
    pub fn serialization_failed(reason: impl Into<String>) -> Self {
        Self::SerializationFailed {
            reason: reason.into(),
        }
    }

    /// Create an `EmissionFailed` error.
    pub fn emission_failed(reason: impl Into<String>) -> Self {
        Self::EmissionFailed {
            reason: reason.into(),
        }
    }

    /// Check if this error is an up-front refusal.
    ///
    /// Refusals are reported to the caller without creating a session or
    /// touching the observable session state.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::EmptyCollection | Self::MergeInProgress)
    }

    /// Check if this error occurred after a successful merge.
    ///
    /// Emission failures leave a valid artifact behind; callers may offer a
    /// retry of the hand-off alone.
    pub fn is_post_merge(&self) -> bool {
        matches!(self, Self::EmissionFailed { .. })
    }
}
