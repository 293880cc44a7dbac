//! docjoin - Merge PDF and Word documents into a single download-ready artifact.
//!
//! This library implements an ordered-file merge pipeline: user-selected
//! files accumulate in a mutable ordered collection, can be reordered or
//! removed, and are then assembled sequentially (page by page for PDF,
//! section by section for Word) into one output document, with fractional
//! progress reporting and all-or-nothing failure semantics. It supports:
//!
//! - Intake screening by declared MIME type and filename extension
//! - Stable identities and index-pair reordering with stale-input tolerance
//! - Snapshot-isolated merge sessions with observable progress
//! - Single-flight merges (a second trigger is refused, never interleaved)
//! - Artifact emission with guaranteed release of transient host handles
//!
//! # Examples
//!
//! ## Merging PDFs
//!
//! ```no_run
//! use docjoin::{Blob, DirectoryHost, PdfPipeline, RawFile, emit};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = PdfPipeline::pdf();
//!
//! let report = pipeline.append(vec![
//!     RawFile::new("a.pdf", Some("application/pdf"), Blob::new(std::fs::read("a.pdf")?)),
//!     RawFile::new("b.pdf", Some("application/pdf"), Blob::new(std::fs::read("b.pdf")?)),
//! ])?;
//! println!("{} accepted, {} rejected", report.accepted, report.rejected);
//!
//! let outcome = pipeline.merge().await?;
//! println!(
//!     "merged {} files into {} pages",
//!     outcome.statistics.files_merged,
//!     outcome.statistics.total_units
//! );
//!
//! emit(&DirectoryHost::new("."), &outcome.artifact)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching progress
//!
//! ```no_run
//! # async fn example(pipeline: docjoin::PdfPipeline) {
//! let mut progress = pipeline.subscribe();
//! tokio::spawn(async move {
//!     while progress.changed().await.is_ok() {
//!         let state = *progress.borrow();
//!         println!("{:?} {:.0}%", state.phase, state.ratio * 100.0);
//!     }
//! });
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembly;
pub mod blob;
pub mod collection;
pub mod emit;
pub mod error;
pub mod intake;
pub mod merge;
pub mod pipeline;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use assembly::{DocumentAssembly, DocxAssembly, PdfAssembly};
pub use blob::{Blob, ByteSource};
pub use collection::{FileId, OrderedCollection, PendingFile};
pub use emit::{Artifact, DirectoryHost, DownloadHost, emit};
pub use error::{MergeError, Result};
pub use intake::{DocumentFamily, IntakeReport, RawFile};
pub use merge::{MergeDriver, MergeOutcome, MergeStatistics};
pub use pipeline::{DocxPipeline, MergePipeline, PdfPipeline};
pub use session::{MergePhase, MergeSession, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
