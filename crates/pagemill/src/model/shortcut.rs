//! Keyboard actions over the page grid.

use crate::model::focus::{Direction, FocusState};
use crate::model::page::RotateDirection;
use crate::model::workspace::Workspace;

/// An action a key binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Select every page (Ctrl+A).
    SelectAll,
    /// Deselect every page (Ctrl+D).
    DeselectAll,
    /// Remove selected pages (Delete, Backspace).
    DeleteSelected,
    /// Move focus (arrow keys).
    Navigate(Direction),
    /// Turn selected pages clockwise (R).
    RotateRight,
    /// Turn selected pages counter-clockwise (Shift+R).
    RotateLeft,
    /// Flip selection of the focused page (Space).
    ToggleFocused,
    /// Drop focus (Escape).
    Escape,
}

/// Apply `action` to a workspace and its focus state.
///
/// `columns` is the width of the grid used for vertical moves. Actions that
/// need a focused page do nothing without one.
pub fn apply_shortcut(workspace: &mut Workspace, focus: &mut FocusState, action: ShortcutAction, columns: usize) {
    match action {
        ShortcutAction::SelectAll => workspace.select_all(),
        ShortcutAction::DeselectAll => workspace.deselect_all(),
        ShortcutAction::DeleteSelected => {
            workspace.remove_selected();
        }
        ShortcutAction::Navigate(direction) => focus.navigate(direction, columns, workspace.len()),
        ShortcutAction::RotateRight => {
            workspace.rotate_selected(RotateDirection::Clockwise);
        }
        ShortcutAction::RotateLeft => {
            workspace.rotate_selected(RotateDirection::CounterClockwise);
        }
        ShortcutAction::ToggleFocused => {
            if let Some(index) = focus.index() {
                workspace.toggle_selection_at(index);
            }
        }
        ShortcutAction::Escape => focus.clear(),
    }
}
