//! Page-based assembly, built on `lopdf`.
//!
//! Merging PDFs cannot splice bytes: every page references shared objects
//! (fonts, resource tables) by id. Appending a source document renumbers its
//! objects past the output's current ceiling and moves them across in one
//! batch, so shared resources stay deduplicated within each source. The page
//! tree is rebuilt once at serialization time from the accumulated page order.

use lopdf::dictionary;
use lopdf::{Document, Object, ObjectId};

use crate::error::{MergeError, Result};
use crate::intake::DocumentFamily;

use super::DocumentAssembly;

/// The `lopdf`-backed assembly capability for the PDF family.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfAssembly;

impl PdfAssembly {
    /// Create the PDF assembly capability.
    pub fn new() -> Self {
        Self
    }
}

/// Accumulating PDF output: merged object store plus page order.
pub struct PdfOutput {
    document: Document,
    pages: Vec<ObjectId>,
    max_id: u32,
}

impl DocumentAssembly for PdfAssembly {
    type Document = Document;
    type Output = PdfOutput;

    fn family(&self) -> DocumentFamily {
        DocumentFamily::Pdf
    }

    fn new_output(&self) -> Result<Self::Output> {
        Ok(PdfOutput {
            document: Document::with_version("1.5"),
            pages: Vec::new(),
            max_id: 0,
        })
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Self::Document> {
        let document = Document::load_mem(bytes).map_err(|e| {
            let reason = e.to_string();
            if reason.contains("encrypt") || reason.contains("password") {
                MergeError::decode_failed(name, "PDF is encrypted")
            } else {
                MergeError::decode_failed(name, reason)
            }
        })?;

        if document.get_pages().is_empty() {
            return Err(MergeError::decode_failed(name, "PDF has no pages"));
        }

        Ok(document)
    }

    fn content_units(&self, document: &Self::Document) -> usize {
        document.get_pages().len()
    }

    fn append_document(
        &self,
        output: &mut Self::Output,
        mut document: Self::Document,
    ) -> Result<usize> {
        // Renumber past the output's ceiling so object ids cannot collide.
        document.renumber_objects_with(output.max_id + 1);
        output.max_id = document.max_id;

        // get_pages is keyed by page number, so iteration yields the
        // document's original internal page order.
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        let appended = page_ids.len();

        output.document.objects.extend(document.objects);
        output.pages.extend(page_ids);

        Ok(appended)
    }

    fn serialize(&self, output: Self::Output) -> Result<Vec<u8>> {
        let PdfOutput {
            mut document,
            pages,
            max_id,
        } = output;

        if pages.is_empty() {
            return Err(MergeError::merge_failed("output document has no pages"));
        }

        document.max_id = max_id;
        let pages_id = document.new_object_id();
        let catalog_id = document.new_object_id();

        // Re-link every page to the new page tree.
        for &page_id in &pages {
            let page = document
                .get_object_mut(page_id)
                .map_err(|e| MergeError::merge_failed(format!("failed to get page: {e}")))?;
            match page {
                Object::Dictionary(dict) => dict.set("Parent", Object::Reference(pages_id)),
                _ => {
                    return Err(MergeError::merge_failed("page object is not a dictionary"));
                }
            }
        }

        let kids: Vec<Object> = pages.iter().map(|&id| Object::Reference(id)).collect();
        let pages_dict = lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        };
        let catalog = lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };

        document.objects.insert(pages_id, pages_dict.into());
        document.objects.insert(catalog_id, catalog.into());
        document.trailer.set("Root", catalog_id);

        document.compress();
        document.renumber_objects();

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;

        Ok(bytes)
    }
}
