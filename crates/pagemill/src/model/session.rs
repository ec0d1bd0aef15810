//! Annotation editing with bounded undo/redo.

use std::collections::VecDeque;

use crate::error::{PageMillError, Result};
use crate::model::annotation::Annotation;
use crate::model::page::PageId;
use crate::model::workspace::Workspace;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Editing session over one page's annotations.
///
/// Edits stay local to the session until [`save`](Self::save) writes them
/// back. Dropping the session discards both the edits and the history.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    page_id: PageId,
    current: Vec<Annotation>,
    undo: VecDeque<Vec<Annotation>>,
    redo: Vec<Vec<Annotation>>,
    depth: usize,
}

impl AnnotationSession {
    /// Open a session on a page, starting from its current annotations.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] for an unknown id.
    pub fn open(workspace: &Workspace, page_id: PageId) -> Result<Self> {
        let page = workspace
            .page(page_id)
            .ok_or(PageMillError::PageNotFound { id: page_id })?;
        Ok(Self::with_annotations(page_id, page.annotations.clone()))
    }

    /// Start a session from an explicit annotation list.
    pub fn with_annotations(page_id: PageId, annotations: Vec<Annotation>) -> Self {
        Self {
            page_id,
            current: annotations,
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: DEFAULT_HISTORY_DEPTH,
        }
    }

    /// Limit the undo history. The oldest steps are dropped first.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self.trim();
        self
    }

    /// Page being edited.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Current annotation list.
    pub fn annotations(&self) -> &[Annotation] {
        &self.current
    }

    /// Replace the annotation list, recording the previous one for undo.
    ///
    /// Any redo history is discarded.
    pub fn commit(&mut self, annotations: Vec<Annotation>) {
        let previous = std::mem::replace(&mut self.current, annotations);
        self.undo.push_back(previous);
        self.redo.clear();
        self.trim();
    }

    /// Append one annotation.
    pub fn add(&mut self, annotation: Annotation) {
        let mut next = self.current.clone();
        next.push(annotation);
        self.commit(next);
    }

    /// Remove every annotation, as one undoable step.
    pub fn clear_all(&mut self) {
        self.commit(Vec::new());
    }

    /// Step back. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(&mut self.current, previous));
        true
    }

    /// Step forward again. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(&mut self.current, next));
        self.trim();
        true
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Write the current list back to the page.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] if the page was removed while
    /// the session was open.
    pub fn save(self, workspace: &mut Workspace) -> Result<()> {
        workspace.set_annotations(self.page_id, self.current)
    }

    fn trim(&mut self) {
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
    }
}
