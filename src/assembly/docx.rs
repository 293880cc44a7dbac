//! Section-based assembly, built on `zip` + `quick-xml`.
//!
//! A `.docx` file is a ZIP archive whose `word/document.xml` carries the
//! body content; styles, numbering, and relationships live in sibling
//! entries. This capability works at the coarser granularity the family
//! allows: it accepts whole-document binaries in order and produces one
//! merged binary at serialization time. The first document's archive becomes
//! the output template; every document contributes its body content, and each
//! non-final document's trailing body-level `w:sectPr` is demoted to a
//! paragraph-level section break so all input sections survive with their
//! own page setup.

use std::io::{Cursor, Read, Write};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{MergeError, Result};
use crate::intake::DocumentFamily;

use super::DocumentAssembly;

const DOCUMENT_XML: &str = "word/document.xml";

/// The `zip`/`quick-xml`-backed assembly capability for the Word family.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxAssembly;

impl DocxAssembly {
    /// Create the Word assembly capability.
    pub fn new() -> Self {
        Self
    }
}

/// A decoded Word document: the original archive plus its split body.
pub struct DocxDocument {
    archive: Vec<u8>,
    content: String,
    trailing_sect: Option<String>,
    sections: usize,
}

/// Accumulating Word output: template archive plus body slices in order.
#[derive(Default)]
pub struct DocxOutput {
    template: Option<Vec<u8>>,
    bodies: Vec<BodySlice>,
}

struct BodySlice {
    content: String,
    trailing_sect: Option<String>,
}

impl DocumentAssembly for DocxAssembly {
    type Document = DocxDocument;
    type Output = DocxOutput;

    fn family(&self) -> DocumentFamily {
        DocumentFamily::Docx
    }

    fn new_output(&self) -> Result<Self::Output> {
        Ok(DocxOutput::default())
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Self::Document> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            MergeError::decode_failed(name, format!("not a Word (.docx) container: {e}"))
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_XML)
            .map_err(|_| MergeError::decode_failed(name, "missing word/document.xml"))?
            .read_to_string(&mut xml)
            .map_err(|e| MergeError::decode_failed(name, e.to_string()))?;

        let parts = split_body(&xml).map_err(|reason| MergeError::decode_failed(name, reason))?;

        Ok(DocxDocument {
            archive: bytes.to_vec(),
            content: parts.content,
            trailing_sect: parts.trailing_sect,
            // A body with no explicit sectPr is still one section.
            sections: parts.sections.max(1),
        })
    }

    fn content_units(&self, document: &Self::Document) -> usize {
        document.sections
    }

    fn append_document(
        &self,
        output: &mut Self::Output,
        document: Self::Document,
    ) -> Result<usize> {
        if output.template.is_none() {
            output.template = Some(document.archive);
        }
        output.bodies.push(BodySlice {
            content: document.content,
            trailing_sect: document.trailing_sect,
        });
        Ok(document.sections)
    }

    fn serialize(&self, output: Self::Output) -> Result<Vec<u8>> {
        let template = output
            .template
            .ok_or_else(|| MergeError::merge_failed("output document has no content"))?;

        let mut archive = ZipArchive::new(Cursor::new(template.as_slice()))
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;

        let mut shell = String::new();
        archive
            .by_name(DOCUMENT_XML)
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?
            .read_to_string(&mut shell)
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;
        let parts = split_body(&shell).map_err(MergeError::serialization_failed)?;

        // Bodies in merge order; only the final document keeps its trailing
        // sectPr at body level.
        let mut body = String::new();
        let last = output.bodies.len() - 1;
        for (index, slice) in output.bodies.iter().enumerate() {
            body.push_str(&slice.content);
            if let Some(sect) = &slice.trailing_sect {
                if index == last {
                    body.push_str(sect);
                } else {
                    body.push_str("<w:p><w:pPr>");
                    body.push_str(sect);
                    body.push_str("</w:pPr></w:p>");
                }
            }
        }

        let merged_xml = format!(
            "{}{}{}",
            &shell[..parts.inner_start],
            body,
            &shell[parts.inner_end..]
        );

        // Rebuild the template archive with the merged document.xml; all
        // other entries (styles, relationships, content types) pass through.
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| MergeError::serialization_failed(e.to_string()))?;
            if entry.name() == DOCUMENT_XML {
                continue;
            }
            writer
                .raw_copy_file(entry)
                .map_err(|e| MergeError::serialization_failed(e.to_string()))?;
        }
        writer
            .start_file(DOCUMENT_XML, SimpleFileOptions::default())
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;
        writer
            .write_all(merged_xml.as_bytes())
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;

        let cursor = writer
            .finish()
            .map_err(|e| MergeError::serialization_failed(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

struct BodyParts {
    /// Byte offset just past the `<w:body>` start tag.
    inner_start: usize,
    /// Byte offset of the `</w:body>` end tag.
    inner_end: usize,
    /// Body content without the trailing body-level sectPr.
    content: String,
    /// The trailing body-level sectPr, verbatim, if present.
    trailing_sect: Option<String>,
    /// Number of `w:sectPr` elements anywhere in the body.
    sections: usize,
}

/// Locate the body of a WordprocessingML document and split off its trailing
/// body-level `w:sectPr`.
///
/// Spans are tracked in bytes over the original XML so the extracted slices
/// are verbatim, with namespaces and formatting untouched.
fn split_body(xml: &str) -> std::result::Result<BodyParts, String> {
    const BODY: &[u8] = b"w:body";
    const SECT_PR: &[u8] = b"w:sectPr";

    let mut reader = Reader::from_str(xml);

    let mut pos = 0usize;
    let mut in_body = false;
    let mut rel_depth = 0usize;
    let mut inner_start = 0usize;
    let mut inner: Option<(usize, usize)> = None;
    let mut sections = 0usize;
    let mut open_sect_start: Option<usize> = None;
    let mut last_sect: Option<(usize, usize)> = None;

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        let end = reader.buffer_position();

        match event {
            Event::Start(e) => {
                if !in_body {
                    if e.name().as_ref() == BODY {
                        in_body = true;
                        inner_start = end;
                        rel_depth = 0;
                    }
                } else {
                    if e.name().as_ref() == SECT_PR {
                        sections += 1;
                        if rel_depth == 0 {
                            open_sect_start = Some(pos);
                        }
                    }
                    rel_depth += 1;
                }
            }
            Event::Empty(e) => {
                if !in_body {
                    if e.name().as_ref() == BODY {
                        return Err("document body is empty".to_string());
                    }
                } else if e.name().as_ref() == SECT_PR {
                    sections += 1;
                    if rel_depth == 0 {
                        last_sect = Some((pos, end));
                    }
                }
            }
            Event::End(e) => {
                if in_body {
                    if rel_depth == 0 {
                        if e.name().as_ref() != BODY {
                            return Err("unbalanced element inside w:body".to_string());
                        }
                        inner = Some((inner_start, pos));
                        break;
                    }
                    rel_depth -= 1;
                    if rel_depth == 0
                        && e.name().as_ref() == SECT_PR
                        && let Some(start) = open_sect_start.take()
                    {
                        last_sect = Some((start, end));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }

        pos = end;
    }

    let Some((start, end)) = inner else {
        return Err("missing w:body element".to_string());
    };

    // Only a sectPr with nothing but whitespace after it is the body-level
    // trailer; anything else stays embedded in the content.
    let mut content_end = end;
    let mut trailing_sect = None;
    if let Some((sect_start, sect_end)) = last_sect
        && xml[sect_end..end].trim().is_empty()
    {
        trailing_sect = Some(xml[sect_start..sect_end].to_string());
        content_end = sect_start;
    }

    Ok(BodyParts {
        inner_start: start,
        inner_end: end,
        content: xml[start..content_end].to_string(),
        trailing_sect,
        sections,
    })
}
