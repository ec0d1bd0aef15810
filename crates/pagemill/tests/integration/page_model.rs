//! Integration tests for page sequence transforms.

use pagemill::config::{CompressionScope, CompressionSettings};
use pagemill::model::{MixOptions, MixPattern, RotateDirection};
use pagemill::range::RangePreset;
use pagemill::{PageId, PageMillError, Rotation};
use rstest::rstest;

use crate::common::workspace_with;

fn selected_positions(workspace: &pagemill::Workspace) -> Vec<usize> {
    workspace
        .pages()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.selected)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_range_selection_is_additive() {
    let (mut ws, _) = workspace_with(&[6]);
    ws.deselect_all();
    ws.toggle_selection(ws.pages()[5].id).unwrap();

    let count = ws.select_range("1-2, 4").unwrap();

    assert_eq!(count, 3);
    assert_eq!(selected_positions(&ws), vec![0, 1, 3, 5]);
}

#[rstest]
#[case(RangePreset::All, vec![0, 1, 2, 3, 4])]
#[case(RangePreset::Odd, vec![0, 2, 4])]
#[case(RangePreset::Even, vec![1, 3])]
#[case(RangePreset::FirstHalf, vec![0, 1, 2])]
#[case(RangePreset::SecondHalf, vec![3, 4])]
fn test_presets(#[case] preset: RangePreset, #[case] expected: Vec<usize>) {
    let (mut ws, _) = workspace_with(&[5]);
    ws.deselect_all();
    ws.select_preset(preset).unwrap();
    assert_eq!(selected_positions(&ws), expected);
}

#[test]
fn test_invalid_range_changes_nothing() {
    let (mut ws, _) = workspace_with(&[3]);
    ws.deselect_all();
    let result = ws.select_range("1, 9");
    assert!(matches!(result, Err(PageMillError::InvalidPageRange { ref token, .. }) if token == "9"));
    assert_eq!(ws.selected_count(), 0);
}

#[test]
fn test_rotation_cycles_back() {
    let (mut ws, _) = workspace_with(&[1]);
    let id = ws.pages()[0].id;
    for _ in 0..4 {
        ws.rotate_page(id, RotateDirection::Clockwise).unwrap();
    }
    assert_eq!(ws.page(id).unwrap().rotation, Rotation::None);

    ws.rotate_page(id, RotateDirection::CounterClockwise).unwrap();
    assert_eq!(ws.page(id).unwrap().rotation.as_degrees(), 270);
}

#[test]
fn test_rotate_selected_only_touches_selection() {
    let (mut ws, _) = workspace_with(&[3]);
    ws.toggle_selection(ws.pages()[1].id).unwrap();

    let rotated = ws.rotate_selected(RotateDirection::Clockwise);

    assert_eq!(rotated, 2);
    let degrees: Vec<u16> = ws.pages().iter().map(|p| p.rotation.as_degrees()).collect();
    assert_eq!(degrees, vec![90, 0, 90]);
}

#[test]
fn test_reorder_is_validated() {
    let (mut ws, sources) = workspace_with(&[3]);
    let ids: Vec<PageId> = ws.pages().iter().map(|p| p.id).collect();

    let reversed: Vec<PageId> = ids.iter().rev().copied().collect();
    ws.reorder(&reversed).unwrap();
    assert_eq!(ws.pages()[0].page_number(), 3);

    let duplicate = vec![ids[0], ids[0], ids[1]];
    assert!(matches!(ws.reorder(&duplicate), Err(PageMillError::InvalidReorder { .. })));

    let unknown = vec![ids[0], ids[1], PageId::new(sources[0], 99)];
    assert!(matches!(ws.reorder(&unknown), Err(PageMillError::InvalidReorder { .. })));

    assert!(matches!(ws.reorder(&ids[..2]), Err(PageMillError::InvalidReorder { .. })));
    assert_eq!(ws.pages()[0].page_number(), 3);
}

#[rstest]
#[case(MixPattern::OneToOne, false, vec![(0, 1), (1, 1), (0, 2), (1, 2), (0, 3), (1, 3)])]
#[case(MixPattern::OneToOne, true, vec![(0, 1), (1, 3), (0, 2), (1, 2), (0, 3), (1, 1)])]
#[case(MixPattern::TwoToOne, false, vec![(0, 1), (0, 2), (1, 1), (0, 3), (1, 2), (1, 3)])]
#[case(MixPattern::OneToTwo, false, vec![(0, 1), (1, 1), (1, 2), (0, 2), (1, 3), (0, 3)])]
fn test_mix_patterns(
    #[case] pattern: MixPattern,
    #[case] reverse_second: bool,
    #[case] expected: Vec<(usize, u32)>,
) {
    let (mut ws, sources) = workspace_with(&[3, 3]);
    ws.mix(sources[0], sources[1], MixOptions { pattern, reverse_second }).unwrap();

    let order: Vec<(usize, u32)> = ws
        .pages()
        .iter()
        .map(|p| {
            let side = sources.iter().position(|s| *s == p.source_id()).unwrap();
            (side, p.page_number())
        })
        .collect();
    assert_eq!(order, expected);
}

#[test]
fn test_mix_appends_other_sources() {
    let (mut ws, sources) = workspace_with(&[2, 1, 2]);
    ws.mix(sources[0], sources[2], MixOptions::default()).unwrap();

    let owners: Vec<usize> = ws
        .pages()
        .iter()
        .map(|p| sources.iter().position(|s| *s == p.source_id()).unwrap())
        .collect();
    assert_eq!(owners, vec![0, 2, 0, 2, 1]);
}

#[test]
fn test_mix_rejects_same_source() {
    let (mut ws, sources) = workspace_with(&[2]);
    assert!(matches!(
        ws.mix(sources[0], sources[0], MixOptions::default()),
        Err(PageMillError::InvalidMix { .. })
    ));
}

#[test]
fn test_remove_source_drops_its_pages() {
    let (mut ws, sources) = workspace_with(&[2, 3]);
    let removed = ws.remove_source(sources[0]).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(ws.len(), 3);
    assert!(ws.pages().iter().all(|p| p.source_id() == sources[1]));
    assert!(ws.sources().get(sources[0]).is_none());
    assert!(matches!(ws.remove_source(sources[0]), Err(PageMillError::SourceNotFound { .. })));
}

#[test]
fn test_remove_selected_and_clear() {
    let (mut ws, _) = workspace_with(&[4]);
    ws.deselect_all();
    ws.select_indices(&[0, 2, 17]);

    assert_eq!(ws.remove_selected(), 2);
    assert_eq!(ws.len(), 2);

    ws.clear();
    assert!(ws.is_empty());
    assert!(ws.sources().is_empty());
}

#[test]
fn test_groups_track_selection_and_collapse() {
    let (mut ws, sources) = workspace_with(&[2, 2]);
    ws.set_group_selection(sources[1], false).unwrap();
    assert!(ws.toggle_collapsed(sources[0]));

    let groups = ws.groups();
    assert_eq!(groups.len(), 2);
    assert!(groups[0].all_selected && groups[0].collapsed);
    assert!(!groups[1].all_selected && !groups[1].collapsed);
    assert_eq!(groups[1].display_name, "doc2.pdf");
}

#[test]
fn test_compression_scope_and_estimate() {
    let (mut ws, _) = workspace_with(&[4]);
    ws.toggle_selection(ws.pages()[0].id).unwrap();

    let changed = ws
        .set_compression(CompressionSettings {
            quality: 0.5,
            target_size_kb: None,
            scope: CompressionScope::Selected,
        })
        .unwrap();
    assert_eq!(changed, 3);
    assert_eq!(ws.pages()[0].compression_quality, 1.0);
    assert_eq!(ws.pages()[1].compression_quality, 0.5);

    let estimate = ws.estimate_compressed_size(0.5, CompressionScope::All).unwrap();
    assert_eq!(estimate.page_count, 4);
    assert_eq!(estimate.estimated, estimate.original / 2);
}
