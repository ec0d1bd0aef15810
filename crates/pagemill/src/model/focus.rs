//! Keyboard focus over the page grid.

/// Direction of a focus move in the page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// Previous page.
    Left,
    /// Next page.
    Right,
}

/// Index of the focused page in the current sequence.
///
/// The index is not tied to a page id: after pages are removed or reordered
/// it points at whatever page now occupies that position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    focused: Option<usize>,
}

impl FocusState {
    /// No page focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused index, if any.
    pub fn index(&self) -> Option<usize> {
        self.focused
    }

    /// Drop focus.
    pub fn clear(&mut self) {
        self.focused = None;
    }

    /// Focus an explicit index.
    pub fn focus(&mut self, index: usize) {
        self.focused = Some(index);
    }

    /// Move focus in a grid of `columns` columns over `len` pages.
    ///
    /// The first move from no focus lands on index 0 whatever the direction.
    /// Moves are clamped to `0..len`; with no pages focus stays empty.
    pub fn navigate(&mut self, direction: Direction, columns: usize, len: usize) {
        if len == 0 {
            self.focused = None;
            return;
        }
        let Some(current) = self.focused else {
            self.focused = Some(0);
            return;
        };

        let last = len - 1;
        let step = columns.max(1);
        let next = match direction {
            Direction::Left => current.saturating_sub(1),
            Direction::Right => current.saturating_add(1),
            Direction::Up => current.saturating_sub(step),
            Direction::Down => current.saturating_add(step),
        };
        self.focused = Some(next.min(last));
    }
}
