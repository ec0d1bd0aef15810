//! Integration tests for keyboard shortcuts and annotation sessions.

use pagemill::assemble::Assembler;
use pagemill::model::{
    Annotation, AnnotationKind, AnnotationSession, Direction, FocusState, Point, ShortcutAction,
    apply_shortcut,
};
use pagemill::{PageMillError, Rotation};

use crate::common::workspace_with;

#[test]
fn test_shortcut_selection_and_deletion() {
    let (mut ws, _) = workspace_with(&[5]);
    let mut focus = FocusState::new();

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::DeselectAll, 3);
    assert_eq!(ws.selected_count(), 0);

    // Focus the second page and select it.
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Right), 3);
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Right), 3);
    assert_eq!(focus.index(), Some(1));
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::ToggleFocused, 3);
    assert!(ws.pages()[1].selected);

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::DeleteSelected, 3);
    assert_eq!(ws.len(), 4);
    assert!(ws.pages().iter().all(|p| p.page_number() != 2));

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::SelectAll, 3);
    assert_eq!(ws.selected_count(), 4);
}

#[test]
fn test_shortcut_rotation_and_escape() {
    let (mut ws, _) = workspace_with(&[2]);
    let mut focus = FocusState::new();

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::RotateRight, 4);
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::RotateRight, 4);
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::RotateLeft, 4);
    assert!(ws.pages().iter().all(|p| p.rotation == Rotation::Clockwise90));

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Down), 4);
    assert_eq!(focus.index(), Some(0));
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Escape, 4);
    assert_eq!(focus.index(), None);
}

#[test]
fn test_vertical_navigation_clamps() {
    let (mut ws, _) = workspace_with(&[7]);
    let mut focus = FocusState::new();
    focus.focus(1);

    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Down), 3);
    assert_eq!(focus.index(), Some(4));
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Down), 3);
    assert_eq!(focus.index(), Some(6));
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::Navigate(Direction::Up), 10);
    assert_eq!(focus.index(), Some(0));
}

#[test]
fn test_focus_is_positional_after_removal() {
    let (mut ws, _) = workspace_with(&[3]);
    let mut focus = FocusState::new();
    focus.focus(2);

    ws.remove_page(ws.pages()[0].id).unwrap();
    // The stale index now points past the end; toggling does nothing.
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::DeselectAll, 3);
    apply_shortcut(&mut ws, &mut focus, ShortcutAction::ToggleFocused, 3);
    assert_eq!(ws.selected_count(), 0);
    assert_eq!(focus.index(), Some(2));
}

#[test]
fn test_session_save_and_discard() {
    let (mut ws, _) = workspace_with(&[1]);
    let id = ws.pages()[0].id;

    let mut session = AnnotationSession::open(&ws, id).unwrap();
    session.add(Annotation::new(AnnotationKind::Highlight, 0.1, 0.1, 0.5, 0.1));
    session.add(Annotation::drawing(vec![Point { x: 0.1, y: 0.9 }, Point { x: 0.9, y: 0.9 }]));
    assert!(session.undo());
    session.save(&mut ws).unwrap();
    assert_eq!(ws.page(id).unwrap().annotations.len(), 1);

    let mut discarded = AnnotationSession::open(&ws, id).unwrap();
    discarded.clear_all();
    drop(discarded);
    assert_eq!(ws.page(id).unwrap().annotations.len(), 1);
}

#[test]
fn test_session_on_removed_page_fails_to_save() {
    let (mut ws, _) = workspace_with(&[2]);
    let id = ws.pages()[0].id;
    let mut session = AnnotationSession::open(&ws, id).unwrap();
    session.add(Annotation::text(0.5, 0.5, "gone"));

    ws.remove_page(id).unwrap();
    assert!(matches!(session.save(&mut ws), Err(PageMillError::PageNotFound { .. })));
}

#[test]
fn test_annotated_page_assembles() {
    let (mut ws, _) = workspace_with(&[1]);
    let id = ws.pages()[0].id;
    let mut session = AnnotationSession::open(&ws, id).unwrap();
    session.add(Annotation::new(AnnotationKind::Highlight, 0.0, 0.0, 1.0, 0.2).with_color("#00ff00"));
    session.add(Annotation::text(0.1, 0.5, "Reviewed"));
    session.save(&mut ws).unwrap();

    let output = Assembler::default().merge(&ws).unwrap();
    let doc = lopdf::Document::load_mem(&output.bytes).unwrap();
    let page = doc.get_pages()[&1];
    assert_eq!(doc.get_page_contents(page).len(), 4);
    assert!(output.warnings.is_empty());
}
