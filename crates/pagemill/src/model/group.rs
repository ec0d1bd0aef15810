//! Per-source grouping of the page sequence.

use std::collections::BTreeSet;

use crate::model::page::Page;
use crate::model::source::SourceId;

/// Pages of one source, in sequence order.
#[derive(Debug, Clone)]
pub struct DocumentGroup<'a> {
    /// Source of every page in the group.
    pub source_id: SourceId,
    /// Display name of the source.
    pub display_name: &'a str,
    /// The source's pages, in page-sequence order.
    pub pages: Vec<&'a Page>,
    /// Whether every page of the group is selected.
    pub all_selected: bool,
    /// Whether the group is collapsed in the view.
    pub collapsed: bool,
}

/// Group `pages` by source, in the order each source first appears.
///
/// This is a pure projection: it is recomputed from the page sequence on
/// every call and never stored.
pub fn group_pages<'a>(pages: &'a [Page], collapsed: &BTreeSet<SourceId>) -> Vec<DocumentGroup<'a>> {
    let mut groups: Vec<DocumentGroup<'a>> = Vec::new();

    for page in pages {
        let source_id = page.source_id();
        match groups.iter_mut().find(|g| g.source_id == source_id) {
            Some(group) => {
                group.all_selected &= page.selected;
                group.pages.push(page);
            }
            None => groups.push(DocumentGroup {
                source_id,
                display_name: &page.source_name,
                pages: vec![page],
                all_selected: page.selected,
                collapsed: collapsed.contains(&source_id),
            }),
        }
    }

    groups
}
