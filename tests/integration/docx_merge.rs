//! Integration tests for the section-based (Word) pipeline.

use docjoin::{Blob, DocxPipeline, MergeError, MergePhase, RawFile};

use crate::common::{docx_document_xml, docx_with_paragraphs};

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn docx_file(name: &str, paragraphs: &[&str]) -> RawFile {
    RawFile::new(name, Some(DOCX_MIME), Blob::new(docx_with_paragraphs(paragraphs)))
}

#[tokio::test]
async fn test_merge_keeps_first_document_before_second() {
    let pipeline = DocxPipeline::docx();
    pipeline
        .append(vec![
            docx_file("a.docx", &["first document body"]),
            docx_file("b.docx", &["second document body"]),
        ])
        .unwrap();

    let outcome = pipeline.merge().await.unwrap();

    assert_eq!(outcome.artifact.filename(), "merged-document.docx");
    assert_eq!(
        outcome.artifact.mime(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(outcome.statistics.files_merged, 2);
    assert_eq!(outcome.statistics.total_units, 2);

    let xml = docx_document_xml(outcome.artifact.bytes());
    let first = xml.find("first document body").unwrap();
    let second = xml.find("second document body").unwrap();
    assert!(first < second);

    assert_eq!(pipeline.state().phase, MergePhase::Succeeded);
}

#[tokio::test]
async fn test_intake_accepts_docx_by_extension_without_mime() {
    let pipeline = DocxPipeline::docx();

    let report = pipeline
        .append(vec![RawFile::new(
            "Report.DOCX",
            None,
            Blob::new(docx_with_paragraphs(&["hello"])),
        )])
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 0);

    let outcome = pipeline.merge().await.unwrap();
    assert!(docx_document_xml(outcome.artifact.bytes()).contains("hello"));
}

#[tokio::test]
async fn test_merge_rejects_corrupt_archive() {
    let pipeline = DocxPipeline::docx();
    pipeline
        .append(vec![
            docx_file("a.docx", &["fine"]),
            RawFile::new("broken.docx", Some(DOCX_MIME), Blob::new(b"not a zip".to_vec())),
        ])
        .unwrap();

    let result = pipeline.merge().await;

    assert!(matches!(result, Err(MergeError::DecodeFailed { .. })));
    assert_eq!(pipeline.state().phase, MergePhase::Failed);
}

#[tokio::test]
async fn test_merge_of_three_preserves_every_section() {
    let pipeline = DocxPipeline::docx();
    pipeline
        .append(vec![
            docx_file("a.docx", &["alpha"]),
            docx_file("b.docx", &["beta"]),
            docx_file("c.docx", &["gamma"]),
        ])
        .unwrap();

    let outcome = pipeline.merge().await.unwrap();
    assert_eq!(outcome.statistics.total_units, 3);

    let xml = docx_document_xml(outcome.artifact.bytes());
    // Two demoted section breaks plus the body-level trailer.
    assert_eq!(xml.matches("<w:sectPr>").count(), 3);
    let order: Vec<usize> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|needle| xml.find(needle).unwrap())
        .collect();
    assert!(order[0] < order[1] && order[1] < order[2]);
}
