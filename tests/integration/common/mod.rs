//! Integration tests for docjoin.
//!
//! These tests exercise the full pipeline flow using fixture documents built
//! programmatically (minimal PDFs through `lopdf`, minimal Word archives
//! through `zip`), so no binary fixtures are checked in.

use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use docjoin::{Blob, ByteSource, RawFile, SessionState};
use futures::future::BoxFuture;
use lopdf::dictionary;
use lopdf::{Document, Object};
use tokio::sync::{Semaphore, watch};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const PDF_MIME: &str = "application/pdf";

/// Build a minimal PDF with one page per entry in `widths`, each page tagged
/// with its MediaBox width so output order can be asserted.
pub fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for &width in widths {
        let page_id = doc.new_object_id();
        let page = lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
        };
        doc.objects.insert(page_id, page.into());
        kids.push(Object::Reference(page_id));
    }

    let pages = lopdf::dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => widths.len() as i64,
    };
    doc.objects.insert(pages_id, pages.into());

    let catalog_id = doc.new_object_id();
    let catalog = lopdf::dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    doc.objects.insert(catalog_id, catalog.into());
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// MediaBox widths of a serialized PDF's pages, in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let Object::Dictionary(dict) = doc.get_object(page_id).unwrap() else {
                panic!("page is not a dictionary");
            };
            let Object::Array(media_box) = dict.get(b"MediaBox").unwrap() else {
                panic!("MediaBox is not an array");
            };
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// Build a minimal .docx archive with the given paragraph texts.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for text in paragraphs {
        body.push_str(&format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"));
    }
    body.push_str(r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#);
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Read `word/document.xml` out of a serialized .docx.
pub fn docx_document_xml(bytes: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

/// A PDF raw input with tagged page widths.
pub fn pdf_file(name: &str, widths: &[i64]) -> RawFile {
    RawFile::new(name, Some(PDF_MIME), Blob::new(pdf_with_widths(widths)))
}

/// A payload that records the observable session state at the moment it is
/// read, proving progress updates land before the next file is processed.
pub struct ObservingSource {
    inner: Blob,
    watch: watch::Receiver<SessionState>,
    observed: Arc<Mutex<Vec<SessionState>>>,
}

impl ObservingSource {
    pub fn new(
        bytes: Vec<u8>,
        watch: watch::Receiver<SessionState>,
        observed: Arc<Mutex<Vec<SessionState>>>,
    ) -> Self {
        Self {
            inner: Blob::new(bytes),
            watch,
            observed,
        }
    }
}

impl ByteSource for ObservingSource {
    fn read(&self) -> BoxFuture<'_, std::io::Result<Vec<u8>>> {
        Box::pin(async move {
            self.observed.lock().unwrap().push(*self.watch.borrow());
            self.inner.read().await
        })
    }
}

/// A payload whose read suspends until a permit is released, keeping a merge
/// deterministically in flight while the test pokes at the pipeline.
pub struct GatedSource {
    inner: Blob,
    gate: Arc<Semaphore>,
}

impl GatedSource {
    pub fn new(bytes: Vec<u8>, gate: Arc<Semaphore>) -> Self {
        Self {
            inner: Blob::new(bytes),
            gate,
        }
    }
}

impl ByteSource for GatedSource {
    fn read(&self) -> BoxFuture<'_, std::io::Result<Vec<u8>>> {
        Box::pin(async move {
            self.gate.acquire().await.unwrap().forget();
            self.inner.read().await
        })
    }
}
