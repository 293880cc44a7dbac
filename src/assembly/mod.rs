//! Document-assembly capabilities.
//!
//! The merge driver is generic over a [`DocumentAssembly`]: the external
//! capability that parses, copies, and serializes a family's binary format.
//! The driver treats it as a black box with five operations: create an empty
//! output, decode raw bytes, count content units, batch-copy a decoded
//! document's units into the output, and serialize the output to bytes.
//!
//! Two implementations are provided:
//!
//! - [`PdfAssembly`]: page-based containers, built on `lopdf`.
//! - [`DocxAssembly`]: section-based containers, built on `zip` + `quick-xml`.

use crate::error::Result;
use crate::intake::DocumentFamily;

pub mod docx;
pub mod pdf;

pub use docx::DocxAssembly;
pub use pdf::PdfAssembly;

/// The capability seam between the merge driver and a document format.
///
/// Content units (pages or sections) carry structural metadata (fonts,
/// styles, resource tables) that must be re-linked when moved into a new
/// containing document. [`append_document`](Self::append_document) is
/// therefore the copy primitive, invoked once per source document (batched),
/// not once per content unit, so implementations can deduplicate shared
/// resources.
pub trait DocumentAssembly: Send + Sync {
    /// A decoded source document in the capability's native representation.
    type Document: Send;

    /// The accumulating output document.
    type Output: Send;

    /// The document family this capability assembles.
    fn family(&self) -> DocumentFamily;

    /// Create an empty accumulating output document.
    fn new_output(&self) -> Result<Self::Output>;

    /// Decode raw bytes into the native document representation.
    ///
    /// `name` is the file's display name, used only for error context.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeFailed`](crate::MergeError::DecodeFailed) if the bytes
    /// are not a valid document of this family.
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Self::Document>;

    /// Number of content units in a decoded document.
    fn content_units(&self, document: &Self::Document) -> usize;

    /// Copy all of `document`'s content units into `output`, preserving
    /// their original internal order.
    ///
    /// Returns the number of units appended.
    fn append_document(&self, output: &mut Self::Output, document: Self::Document)
    -> Result<usize>;

    /// Serialize the fully-assembled output to bytes.
    fn serialize(&self, output: Self::Output) -> Result<Vec<u8>>;
}
