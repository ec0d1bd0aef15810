//! Integration tests for error handling.

use pagemill::assemble::Assembler;
use pagemill::config::{
    CompressionScope, CompressionSettings, ExportSettings, Orientation, OverwriteMode, PageSizeSettings,
    SplitMode,
};
use pagemill::error::ErrorCategory;
use pagemill::ingest::InputFile;
use pagemill::io::{ArtifactWriter, InputReader};
use pagemill::model::{MixOptions, Thumbnail};
use pagemill::render::{PageRenderer, PlaceholderRenderer};
use pagemill::{PageId, PageMillError, Workspace};
use rstest::rstest;
use std::path::Path;

use crate::common::{pdf_bytes, pdf_input, temp_output_path, workspace_with};

#[test]
fn test_empty_selection_is_rejected_everywhere() {
    let (mut ws, _) = workspace_with(&[3]);
    ws.deselect_all();
    let assembler = Assembler::default();

    for result in [
        assembler.merge(&ws).map(|_| ()),
        assembler.export_images(&ws).map(|_| ()),
        assembler.split_archive(&ws, SplitMode::Chunks(2), "x").map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, PageMillError::EmptySelection));
        assert_eq!(err.category(), ErrorCategory::Selection);
    }
}

#[test]
fn test_empty_workspace_cannot_assemble() {
    let ws = Workspace::new();
    assert!(matches!(Assembler::default().merge(&ws), Err(PageMillError::EmptySelection)));
}

/// Renders nothing, leaving every page without a thumbnail.
struct NoThumbnails;

impl PageRenderer for NoThumbnails {
    fn render_page(&self, _pdf: &[u8], page_number: u32, _scale: f32) -> pagemill::Result<Thumbnail> {
        Err(PageMillError::render_failed(page_number, "disabled"))
    }

    fn render_all(&self, _pdf: &[u8], _page_count: u32, _scale: f32) -> pagemill::Result<Vec<Thumbnail>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_missing_thumbnail_fails_image_export() {
    let mut ws = Workspace::new();
    ws.ingest(vec![pdf_input("bare.pdf", 2)], &NoThumbnails).unwrap();
    assert!(ws.pages().iter().all(|p| p.thumbnail.is_none()));

    let err = Assembler::default().export_images(&ws).unwrap_err();
    assert!(matches!(err, PageMillError::MissingThumbnail { id } if id == ws.pages()[0].id));
    assert_eq!(err.category(), ErrorCategory::Engine);

    // Merging does not need thumbnails.
    assert!(Assembler::default().merge(&ws).is_ok());
}

#[test]
fn test_invalid_page_size_rejected() {
    let (ws, _) = workspace_with(&[1]);
    let settings = ExportSettings {
        page_size: PageSizeSettings::custom(0.0, 500.0, Orientation::Portrait),
        ..ExportSettings::default()
    };
    assert!(matches!(
        Assembler::new(settings).merge(&ws),
        Err(PageMillError::InvalidConfig { .. })
    ));
}

#[rstest]
#[case(0.0)]
#[case(-0.5)]
#[case(1.5)]
fn test_quality_domain(#[case] quality: f32) {
    let (mut ws, _) = workspace_with(&[1]);
    let result = ws.set_compression(CompressionSettings {
        quality,
        target_size_kb: None,
        scope: CompressionScope::All,
    });
    assert!(matches!(result, Err(PageMillError::InvalidQuality { .. })));
    assert_eq!(ws.pages()[0].compression_quality, 1.0);
}

#[rstest]
#[case(45)]
#[case(100)]
fn test_rotation_must_be_quarter_turns(#[case] degrees: i32) {
    let (mut ws, _) = workspace_with(&[1]);
    let id = ws.pages()[0].id;
    assert!(matches!(ws.rotate(id, degrees), Err(PageMillError::InvalidRotation { .. })));
}

#[test]
fn test_unknown_ids_are_reported() {
    let (mut ws, sources) = workspace_with(&[1, 1]);
    let ghost = PageId::new(sources[0], 42);

    assert!(matches!(ws.toggle_selection(ghost), Err(PageMillError::PageNotFound { .. })));
    assert!(matches!(ws.remove_page(ghost), Err(PageMillError::PageNotFound { .. })));

    ws.remove_source(sources[1]).unwrap();
    assert!(matches!(
        ws.mix(sources[0], sources[1], MixOptions::default()),
        Err(PageMillError::InvalidMix { .. })
    ));
}

#[test]
fn test_oversized_page_rejects_batch() {
    let huge = 1_000_000_000_000;
    let batch = vec![
        pdf_input("fine.pdf", 2),
        InputFile::new("huge.pdf", pdf_bytes(1, huge, huge), "application/pdf"),
    ];

    let mut ws = Workspace::new();
    let err = ws.ingest(batch, &PlaceholderRenderer::new()).unwrap_err();
    assert!(matches!(err, PageMillError::IngestFailed { .. }));
    assert!(ws.is_empty());
}

#[test]
fn test_errors_leave_workspace_usable() {
    let (mut ws, _) = workspace_with(&[2]);
    assert!(ws.select_range("abc").is_err());
    assert!(ws.select_range("").is_err());
    assert!(ws.select_range("2-1").is_err());
    assert_eq!(ws.len(), 2);
    assert!(Assembler::default().merge(&ws).is_ok());
}

#[tokio::test]
async fn test_reader_reports_missing_file() {
    let err = InputReader::new()
        .load(Path::new("/definitely/not/here.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, PageMillError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_no_clobber_refuses_existing_output() {
    let (_dir, path) = temp_output_path("taken.pdf");
    std::fs::write(&path, b"existing").unwrap();

    let err = ArtifactWriter::new()
        .check_output(&path, OverwriteMode::NoClobber)
        .await
        .unwrap_err();
    assert!(matches!(err, PageMillError::OutputExists { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), b"existing");
}
