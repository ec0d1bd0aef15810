//! Integration tests for ingesting files into a workspace.

use pagemill::ingest::InputFile;
use pagemill::io::InputReader;
use pagemill::render::PlaceholderRenderer;
use pagemill::{PageMillError, Workspace};

use crate::common::{pdf_bytes, pdf_input, png_bytes, temp_output_path};

#[test]
fn test_mixed_batch_appends_in_order() {
    let mut workspace = Workspace::new();
    let batch = vec![
        pdf_input("report.pdf", 2),
        InputFile::new("photo.png", png_bytes(40, 20), "image/png"),
        InputFile::new("notes.txt", b"hello\nworld".to_vec(), "text/plain"),
        InputFile::new("archive.zip", vec![1, 2, 3], "application/zip"),
    ];

    let summary = workspace.ingest(batch, &PlaceholderRenderer).unwrap();

    assert_eq!(summary.sources_added.len(), 3);
    assert_eq!(summary.pages_added, 4);
    assert_eq!(summary.skipped, vec!["archive.zip".to_string()]);

    let names: Vec<&str> = workspace.pages().iter().map(|p| p.source_name.as_str()).collect();
    assert_eq!(names, vec!["report.pdf", "report.pdf", "photo.png", "notes.txt"]);
    assert!(workspace.pages().iter().all(|p| p.selected && p.thumbnail.is_some()));

    let photo = workspace.sources().get(summary.sources_added[1]).unwrap();
    assert!(photo.is_image_derived);
    assert_eq!(photo.page_count, 1);
}

#[test]
fn test_image_page_matches_pixel_size() {
    let mut workspace = Workspace::new();
    workspace
        .ingest(
            vec![InputFile::new("wide.png", png_bytes(300, 100), "image/png")],
            &PlaceholderRenderer,
        )
        .unwrap();

    // Thumbnails are rendered at half scale.
    let thumbnail = workspace.pages()[0].thumbnail.as_ref().unwrap();
    assert_eq!((thumbnail.width, thumbnail.height), (150, 50));
}

#[test]
fn test_failed_batch_leaves_workspace_untouched() {
    let mut workspace = Workspace::new();
    workspace.ingest(vec![pdf_input("keep.pdf", 1)], &PlaceholderRenderer).unwrap();

    let batch = vec![
        pdf_input("fine.pdf", 3),
        InputFile::new("broken.pdf", b"not a pdf at all".to_vec(), "application/pdf"),
    ];
    let result = workspace.ingest(batch, &PlaceholderRenderer);

    assert!(matches!(result, Err(PageMillError::IngestFailed { .. })));
    assert_eq!(workspace.len(), 1);
    assert_eq!(workspace.sources().len(), 1);
}

#[test]
fn test_later_batches_append() {
    let mut workspace = Workspace::new();
    workspace.ingest(vec![pdf_input("a.pdf", 2)], &PlaceholderRenderer).unwrap();
    workspace.ingest(vec![pdf_input("b.pdf", 1)], &PlaceholderRenderer).unwrap();

    let names: Vec<&str> = workspace.pages().iter().map(|p| p.source_name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "a.pdf", "b.pdf"]);
}

#[tokio::test]
async fn test_read_from_disk_then_ingest() {
    let (_dir, pdf_path) = temp_output_path("from-disk.pdf");
    std::fs::write(&pdf_path, pdf_bytes(3, 595, 842)).unwrap();
    let png_path = pdf_path.with_file_name("picture.png");
    std::fs::write(&png_path, png_bytes(10, 10)).unwrap();

    let reader = InputReader::new();
    let (results, stats) = reader.load_all(&[pdf_path, png_path]).await;
    assert_eq!(stats.success_count, 2);

    let files: Vec<InputFile> = results.into_iter().map(|r| r.unwrap().file).collect();
    let mut workspace = Workspace::new();
    let summary = workspace.ingest(files, &PlaceholderRenderer).unwrap();

    assert_eq!(summary.pages_added, 4);
    assert_eq!(workspace.pages()[0].source_name, "from-disk.pdf");
    assert_eq!(workspace.pages()[3].source_name, "picture.png");
}
