//! Integration tests for building output artifacts.

use lopdf::Document;
use pagemill::assemble::{Assembler, DEFAULT_SPLIT_PREFIX};
use pagemill::config::{ExportSettings, Orientation, PageSizePreset, PageSizeSettings, SplitMode};
use pagemill::io::ArtifactWriter;
use pagemill::AssemblyWarning;
use rstest::rstest;

use crate::common::{page_count, rotations, temp_output_path, workspace_with, zip_names};

#[test]
fn test_merge_rotates_second_page() {
    let (mut ws, _) = workspace_with(&[3]);
    let second = ws.pages()[1].id;
    ws.rotate(second, 90).unwrap();

    let output = Assembler::default().merge(&ws).unwrap();

    assert_eq!(page_count(&output.bytes), 3);
    assert_eq!(rotations(&output.bytes), vec![0, 90, 0]);
    assert_eq!(output.statistics.documents, 1);
}

#[test]
fn test_merge_across_sources_with_selection() {
    let (mut ws, sources) = workspace_with(&[2, 3]);
    ws.set_group_selection(sources[0], false).unwrap();
    ws.toggle_selection(ws.pages()[0].id).unwrap();

    let output = Assembler::default().merge(&ws).unwrap();
    assert_eq!(page_count(&output.bytes), 4);
    assert_eq!(output.statistics.pages, 4);
}

#[test]
fn test_rotation_overrides_source_rotation() {
    let (mut ws, _) = workspace_with(&[1]);
    let id = ws.pages()[0].id;
    ws.rotate(id, -90).unwrap();
    let rotated = Assembler::default().merge(&ws).unwrap();
    assert_eq!(rotations(&rotated.bytes), vec![270]);

    ws.rotate(id, 0).unwrap();
    let restored = Assembler::default().merge(&ws).unwrap();
    assert_eq!(rotations(&restored.bytes), vec![0]);
}

#[rstest]
#[case(PageSizePreset::A4, Orientation::Portrait, (595.28, 841.89))]
#[case(PageSizePreset::A4, Orientation::Landscape, (841.89, 595.28))]
#[case(PageSizePreset::Legal, Orientation::Portrait, (612.0, 1008.0))]
fn test_page_size_presets(
    #[case] preset: PageSizePreset,
    #[case] orientation: Orientation,
    #[case] expected: (f32, f32),
) {
    let (ws, _) = workspace_with(&[2]);
    let settings = ExportSettings {
        page_size: PageSizeSettings::preset(preset, orientation),
        ..ExportSettings::default()
    };
    let output = Assembler::new(settings).merge(&ws).unwrap();

    let doc = Document::load_mem(&output.bytes).unwrap();
    for page_id in doc.get_pages().values() {
        let media_box = doc.get_dictionary(*page_id).unwrap().get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - expected.0).abs() < 0.01, "width {width}");
        assert!((height - expected.1).abs() < 0.01, "height {height}");
    }
}

#[test]
fn test_split_five_pages_in_chunks_of_two() {
    let (ws, _) = workspace_with(&[5]);
    let assembler = Assembler::default();

    let split = assembler.split_documents(&ws, SplitMode::Chunks(2), "scan").unwrap();
    let counts: Vec<usize> = split.documents.iter().map(|d| page_count(&d.bytes)).collect();
    assert_eq!(counts, vec![2, 2, 1]);

    let archive = assembler.split_archive(&ws, SplitMode::Chunks(2), "scan").unwrap();
    assert_eq!(zip_names(&archive.bytes), vec!["scan-1.pdf", "scan-2.pdf", "scan-3.pdf"]);
}

#[test]
fn test_split_individual_uses_default_prefix() {
    let (ws, _) = workspace_with(&[1, 2]);
    let archive = Assembler::default()
        .split_archive(&ws, SplitMode::Individual, DEFAULT_SPLIT_PREFIX)
        .unwrap();
    assert_eq!(zip_names(&archive.bytes), vec!["split-1.pdf", "split-2.pdf", "split-3.pdf"]);
    assert_eq!(archive.statistics.documents, 3);
}

#[test]
fn test_split_keeps_rotation() {
    let (mut ws, _) = workspace_with(&[2]);
    let id = ws.pages()[1].id;
    ws.rotate(id, 180).unwrap();

    let split = Assembler::default()
        .split_documents(&ws, SplitMode::Individual, "p")
        .unwrap();
    assert_eq!(rotations(&split.documents[1].bytes), vec![180]);
}

#[test]
fn test_export_images_counts_selected_pages() {
    let (mut ws, _) = workspace_with(&[4]);
    ws.deselect_all();
    ws.select_range("2, 4").unwrap();

    let output = Assembler::default().export_images(&ws).unwrap();
    assert_eq!(zip_names(&output.bytes), vec!["page-1.jpg", "page-2.jpg"]);
}

#[test]
fn test_password_is_reported_not_applied() {
    let (ws, _) = workspace_with(&[1]);
    let settings = ExportSettings {
        password: Some("hunter2".into()),
        ..ExportSettings::default()
    };
    let output = Assembler::new(settings).merge(&ws).unwrap();

    assert_eq!(output.warnings, vec![AssemblyWarning::PasswordNotApplied]);
    let doc = Document::load_mem(&output.bytes).unwrap();
    assert!(!doc.is_encrypted());
}

#[tokio::test]
async fn test_write_merged_output() {
    let (ws, _) = workspace_with(&[2]);
    let output = Assembler::default().merge(&ws).unwrap();
    let (_dir, path) = temp_output_path("merged.pdf");

    let stats = ArtifactWriter::new()
        .save_with_stats(output.bytes, &path)
        .await
        .unwrap();

    assert!(path.exists());
    assert_eq!(page_count(&std::fs::read(&path).unwrap()), 2);
    assert!(stats.file_size > 0);
}
