//! Integration tests for the page-based (PDF) pipeline.

use std::sync::{Arc, Mutex};

use docjoin::{Blob, MergeError, MergePhase, PdfPipeline, RawFile};

use crate::common::{PDF_MIME, page_widths, pdf_file, pdf_with_widths, ObservingSource};

#[tokio::test]
async fn test_merge_concatenates_pages_in_input_order() {
    let pipeline = PdfPipeline::pdf();
    pipeline
        .append(vec![
            pdf_file("a.pdf", &[101, 102, 103]),
            pdf_file("b.pdf", &[201]),
        ])
        .unwrap();

    let outcome = pipeline.merge().await.unwrap();

    assert_eq!(outcome.artifact.filename(), "merged-document.pdf");
    assert_eq!(outcome.artifact.mime(), "application/pdf");
    assert_eq!(outcome.statistics.files_merged, 2);
    assert_eq!(outcome.statistics.total_units, 4);
    assert_eq!(page_widths(outcome.artifact.bytes()), vec![101, 102, 103, 201]);

    let state = pipeline.state();
    assert_eq!(state.phase, MergePhase::Succeeded);
    assert_eq!(state.ratio, 1.0);
}

#[tokio::test]
async fn test_reorder_changes_output_order() {
    let pipeline = PdfPipeline::pdf();
    pipeline
        .append(vec![
            pdf_file("a.pdf", &[1]),
            pdf_file("b.pdf", &[2]),
            pdf_file("c.pdf", &[3]),
        ])
        .unwrap();

    assert!(pipeline.move_entry(2, 0).unwrap());

    let outcome = pipeline.merge().await.unwrap();
    assert_eq!(page_widths(outcome.artifact.bytes()), vec![3, 1, 2]);
}

#[tokio::test]
async fn test_decode_failure_aborts_without_artifact() {
    let pipeline = PdfPipeline::pdf();
    pipeline
        .append(vec![
            pdf_file("a.pdf", &[1]),
            RawFile::new("broken.pdf", Some(PDF_MIME), Blob::new(b"garbage".to_vec())),
        ])
        .unwrap();

    let result = pipeline.merge().await;

    assert!(matches!(result, Err(MergeError::DecodeFailed { .. })));
    let state = pipeline.state();
    assert_eq!(state.phase, MergePhase::Failed);
    assert!(state.ratio < 1.0);
}

#[tokio::test]
async fn test_progress_is_observable_between_files() {
    let pipeline = PdfPipeline::pdf();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let files: Vec<RawFile> = (0..3)
        .map(|i| {
            let source = ObservingSource::new(
                pdf_with_widths(&[i + 1]),
                pipeline.subscribe(),
                Arc::clone(&observed),
            );
            RawFile {
                name: format!("f{i}.pdf"),
                mime: Some(PDF_MIME.to_string()),
                size: 0,
                source: Arc::new(source),
            }
        })
        .collect();
    pipeline.append(files).unwrap();

    pipeline.merge().await.unwrap();

    let observed = observed.lock().unwrap();
    let ratios: Vec<f64> = observed.iter().map(|s| s.ratio).collect();
    assert_eq!(ratios.len(), 3);

    // Each file sees the progress of everything already completed, and the
    // sequence never decreases or reaches 1.0 before success.
    assert_eq!(ratios[0], 0.0);
    assert!((ratios[1] - 1.0 / 3.0).abs() < 1e-9);
    assert!((ratios[2] - 2.0 / 3.0).abs() < 1e-9);
    assert!(observed.iter().all(|s| s.phase == MergePhase::Running));
    assert!(ratios.iter().all(|r| *r < 1.0));

    assert_eq!(pipeline.state().ratio, 1.0);
    assert_eq!(pipeline.state().phase, MergePhase::Succeeded);
}

#[tokio::test]
async fn test_progress_never_completes_after_mid_merge_failure() {
    let pipeline = PdfPipeline::pdf();
    pipeline
        .append(vec![
            pdf_file("a.pdf", &[1]),
            RawFile::new("broken.pdf", Some(PDF_MIME), Blob::new(b"junk".to_vec())),
            pdf_file("c.pdf", &[3]),
        ])
        .unwrap();

    let mut rx = pipeline.subscribe();
    pipeline.merge().await.unwrap_err();

    // The channel's final value is the failure, short of completion.
    let state = *rx.borrow_and_update();
    assert_eq!(state.phase, MergePhase::Failed);
    assert!((state.ratio - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_merged_output_is_itself_mergeable() {
    let first = PdfPipeline::pdf();
    first
        .append(vec![pdf_file("a.pdf", &[10]), pdf_file("b.pdf", &[20])])
        .unwrap();
    let merged = first.merge().await.unwrap();

    let second = PdfPipeline::pdf();
    second
        .append(vec![
            RawFile::new(
                "merged.pdf",
                Some(PDF_MIME),
                Blob::new(merged.artifact.bytes().to_vec()),
            ),
            pdf_file("c.pdf", &[30]),
        ])
        .unwrap();
    let outcome = second.merge().await.unwrap();

    assert_eq!(page_widths(outcome.artifact.bytes()), vec![10, 20, 30]);
}
