//! The workspace aggregate: sources, the page sequence and view state.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::{CompressionScope, CompressionSettings};
use crate::error::{PageMillError, Result};
use crate::ingest::{self, InputFile};
use crate::model::annotation::Annotation;
use crate::model::group::{DocumentGroup, group_pages};
use crate::model::mix::{MixOptions, interleave};
use crate::model::page::{Page, PageId, RotateDirection, Rotation};
use crate::model::source::{SourceDocument, SourceId, SourceRegistry};
use crate::range::{PageRange, RangePreset};
use crate::render::{PageRenderer, THUMBNAIL_SCALE};

/// Size assumed for a page without an estimate, in bytes.
pub const DEFAULT_PAGE_SIZE_ESTIMATE: u64 = 50_000;

/// Outcome of an ingestion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Ids of the sources added, in input order.
    pub sources_added: Vec<SourceId>,
    /// Number of pages appended to the sequence.
    pub pages_added: usize,
    /// Names of inputs skipped for their media type.
    pub skipped: Vec<String>,
}

/// Byte sizes before and after a prospective compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    /// Pages the estimate covers.
    pub page_count: usize,
    /// Estimated current size.
    pub original: u64,
    /// Estimated size after compression.
    pub estimated: u64,
}

impl SizeEstimate {
    /// Estimated savings in bytes.
    pub fn savings(&self) -> u64 {
        self.original.saturating_sub(self.estimated)
    }

    /// Estimated savings as a percentage of the original size.
    pub fn savings_percent(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        self.savings() as f64 / self.original as f64 * 100.0
    }
}

/// Owner of everything a page-editing session works on.
///
/// Holds the source registry, the ordered page sequence (which is also the
/// output order) and the set of collapsed groups. All operations are
/// synchronous; a failed operation leaves the workspace unchanged.
#[derive(Debug, Default)]
pub struct Workspace {
    sources: SourceRegistry,
    pages: Vec<Page>,
    collapsed: BTreeSet<SourceId>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded sources.
    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// The page sequence, in output order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Look up a page.
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    /// Number of pages in the sequence.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Selected pages, in sequence order.
    pub fn selected_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|page| page.selected)
    }

    /// Number of selected pages.
    pub fn selected_count(&self) -> usize {
        self.selected_pages().count()
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages
            .iter_mut()
            .find(|page| page.id == id)
            .ok_or(PageMillError::PageNotFound { id })
    }

    /// Ingest a batch of inputs.
    ///
    /// Each supported input becomes a source whose pages are appended to the
    /// sequence, selected, with a thumbnail from `renderer`. Unsupported
    /// media types are skipped and listed in the summary.
    ///
    /// # Errors
    ///
    /// Any parse, decode or render failure rejects the whole batch with one
    /// [`PageMillError::IngestFailed`]; nothing from the batch is added.
    pub fn ingest<I>(&mut self, batch: I, renderer: &dyn PageRenderer) -> Result<IngestSummary>
    where
        I: IntoIterator<Item = InputFile>,
    {
        let mut staged: Vec<(SourceDocument, Vec<Page>)> = Vec::new();
        let mut skipped = Vec::new();

        for input in batch {
            let Some(converted) = ingest::convert(&input)? else {
                skipped.push(input.name);
                continue;
            };

            let thumbnails = renderer
                .render_all(&converted.bytes, converted.page_count, THUMBNAIL_SCALE)
                .map_err(|e| PageMillError::ingest_failed(e.to_string()))?;

            let document = SourceDocument {
                id: self.sources.allocate_id(),
                display_name: input.name,
                bytes: converted.bytes,
                page_count: converted.page_count,
                is_image_derived: converted.is_image_derived,
            };
            let estimate = document.page_size_estimate();

            let pages = (1..=document.page_count)
                .zip(thumbnails.into_iter().map(Some).chain(std::iter::repeat(None)))
                .map(|(page_number, thumbnail)| {
                    let mut page = Page::new(PageId::new(document.id, page_number), &document.display_name);
                    page.thumbnail = thumbnail;
                    page.original_size_estimate = Some(estimate);
                    page
                })
                .collect();

            staged.push((document, pages));
        }

        let mut summary = IngestSummary {
            skipped,
            ..IngestSummary::default()
        };
        for (document, pages) in staged {
            log::debug!(
                "Added {} as {} ({} pages)",
                document.display_name,
                document.id,
                document.page_count
            );
            summary.sources_added.push(document.id);
            summary.pages_added += pages.len();
            self.sources.insert(document);
            self.pages.extend(pages);
        }

        log::info!(
            "Ingested {} sources ({} pages), skipped {}",
            summary.sources_added.len(),
            summary.pages_added,
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Remove a source and every page that belongs to it.
    ///
    /// Returns the number of pages removed.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::SourceNotFound`] if no such source is loaded.
    pub fn remove_source(&mut self, id: SourceId) -> Result<usize> {
        let document = self
            .sources
            .remove(id)
            .ok_or(PageMillError::SourceNotFound { id })?;

        let before = self.pages.len();
        self.pages.retain(|page| page.source_id() != id);
        self.collapsed.remove(&id);

        let removed = before - self.pages.len();
        log::debug!("Removed {} ({removed} pages)", document.display_name);
        Ok(removed)
    }

    /// Remove every source and page.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.pages.clear();
        self.collapsed.clear();
    }

    /// Flip one page's selection.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] for an unknown id.
    pub fn toggle_selection(&mut self, id: PageId) -> Result<()> {
        let page = self.page_mut(id)?;
        page.selected = !page.selected;
        Ok(())
    }

    /// Flip the selection of the page at sequence position `index`.
    ///
    /// Returns the new state, or `None` when `index` is past the end.
    pub fn toggle_selection_at(&mut self, index: usize) -> Option<bool> {
        let page = self.pages.get_mut(index)?;
        page.selected = !page.selected;
        Some(page.selected)
    }

    /// Select every page.
    pub fn select_all(&mut self) {
        self.pages.iter_mut().for_each(|page| page.selected = true);
    }

    /// Deselect every page.
    pub fn deselect_all(&mut self) {
        self.pages.iter_mut().for_each(|page| page.selected = false);
    }

    /// Select the pages at these zero-indexed positions.
    ///
    /// Additive: pages not listed keep their state. Positions past the end
    /// are ignored.
    pub fn select_indices(&mut self, indices: &[usize]) {
        for &index in indices {
            if let Some(page) = self.pages.get_mut(index) {
                page.selected = true;
            }
        }
    }

    /// Parse a range expression over the current sequence and select it.
    ///
    /// Returns the number of positions in the range.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidPageRange`] if the expression is
    /// rejected; no page is touched in that case.
    pub fn select_range(&mut self, expression: &str) -> Result<usize> {
        let range = PageRange::parse(expression, self.pages.len())?;
        self.select_indices(range.indices());
        Ok(range.indices().len())
    }

    /// Select a canned range.
    ///
    /// # Errors
    ///
    /// Returns an error when the preset covers no page, e.g. `Even` over a
    /// single page.
    pub fn select_preset(&mut self, preset: RangePreset) -> Result<usize> {
        let expression = preset.expression(self.pages.len());
        self.select_range(&expression)
    }

    /// Select or deselect every page of one source.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::SourceNotFound`] if no such source is loaded.
    pub fn set_group_selection(&mut self, id: SourceId, selected: bool) -> Result<()> {
        if !self.sources.contains(id) {
            return Err(PageMillError::SourceNotFound { id });
        }
        self.pages
            .iter_mut()
            .filter(|page| page.source_id() == id)
            .for_each(|page| page.selected = selected);
        Ok(())
    }

    /// Remove every selected page. Sources are kept.
    ///
    /// Returns the number of pages removed.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.pages.len();
        self.pages.retain(|page| !page.selected);
        before - self.pages.len()
    }

    /// Remove one page. Its source is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] for an unknown id.
    pub fn remove_page(&mut self, id: PageId) -> Result<()> {
        let position = self
            .pages
            .iter()
            .position(|page| page.id == id)
            .ok_or(PageMillError::PageNotFound { id })?;
        self.pages.remove(position);
        Ok(())
    }

    /// Set a page's absolute rotation.
    ///
    /// Any multiple of 90 is accepted and normalized, see
    /// [`Rotation::from_degrees`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown page or a non-quarter-turn angle.
    pub fn rotate(&mut self, id: PageId, degrees: i32) -> Result<()> {
        let rotation = Rotation::from_degrees(degrees)?;
        self.page_mut(id)?.rotation = rotation;
        Ok(())
    }

    /// Turn one page a quarter.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] for an unknown id.
    pub fn rotate_page(&mut self, id: PageId, direction: RotateDirection) -> Result<()> {
        let page = self.page_mut(id)?;
        page.rotation = page.rotation.turned(direction);
        Ok(())
    }

    /// Turn every selected page a quarter. Returns how many were turned.
    pub fn rotate_selected(&mut self, direction: RotateDirection) -> usize {
        let mut turned = 0;
        for page in self.pages.iter_mut().filter(|page| page.selected) {
            page.rotation = page.rotation.turned(direction);
            turned += 1;
        }
        turned
    }

    /// Replace the sequence order.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidReorder`] unless `order` holds exactly
    /// the current page ids, each once.
    pub fn reorder(&mut self, order: &[PageId]) -> Result<()> {
        if order.len() != self.pages.len() {
            return Err(PageMillError::invalid_reorder(format!(
                "expected {} pages, got {}",
                self.pages.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(PageMillError::invalid_reorder(format!("page {id} appears twice")));
            }
            if self.page(*id).is_none() {
                return Err(PageMillError::invalid_reorder(format!("page {id} is not in the sequence")));
            }
        }

        let mut by_id: HashMap<PageId, Page> = self.pages.drain(..).map(|page| (page.id, page)).collect();
        self.pages = order.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    /// Interleave the pages of two sources.
    ///
    /// The mixed block comes first; pages of every other source follow in
    /// their current relative order.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidMix`] if `a == b` or either source is
    /// not loaded.
    pub fn mix(&mut self, a: SourceId, b: SourceId, options: MixOptions) -> Result<()> {
        if a == b {
            return Err(PageMillError::invalid_mix("pick two different documents"));
        }
        for id in [a, b] {
            if !self.sources.contains(id) {
                return Err(PageMillError::invalid_mix(format!("{id} is not loaded")));
            }
        }

        let (mut first, mut second, mut others) = (Vec::new(), Vec::new(), Vec::new());
        for page in self.pages.drain(..) {
            match page.source_id() {
                id if id == a => first.push(page),
                id if id == b => second.push(page),
                _ => others.push(page),
            }
        }
        if options.reverse_second {
            second.reverse();
        }

        let mut mixed = interleave(first, second, options.pattern);
        mixed.append(&mut others);
        self.pages = mixed;
        Ok(())
    }

    /// Replace a page's annotations.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::PageNotFound`] for an unknown id.
    pub fn set_annotations(&mut self, id: PageId, annotations: Vec<Annotation>) -> Result<()> {
        self.page_mut(id)?.annotations = annotations;
        Ok(())
    }

    /// Record compression intent on the pages in scope.
    ///
    /// Nothing is recompressed here; assembly applies the quality. The
    /// target size is advisory and only logged. Returns how many pages were
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidQuality`] for a quality outside (0, 1].
    pub fn set_compression(&mut self, settings: CompressionSettings) -> Result<usize> {
        settings.validate()?;
        if let Some(target) = settings.target_size_kb {
            log::debug!("Target size {target} KB is advisory and not enforced");
        }

        let mut updated = 0;
        for page in self.pages_in_scope_mut(settings.scope) {
            page.compression_quality = settings.quality;
            updated += 1;
        }
        Ok(updated)
    }

    /// Estimate the size of the pages in scope before and after compressing
    /// at `quality`.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidQuality`] for a quality outside (0, 1].
    pub fn estimate_compressed_size(&self, quality: f32, scope: CompressionScope) -> Result<SizeEstimate> {
        CompressionSettings {
            quality,
            target_size_kb: None,
            scope,
        }
        .validate()?;

        let sizes: Vec<u64> = self
            .pages
            .iter()
            .filter(|page| scope == CompressionScope::All || page.selected)
            .map(|page| page.original_size_estimate.unwrap_or(DEFAULT_PAGE_SIZE_ESTIMATE))
            .collect();
        let original: u64 = sizes.iter().sum();

        Ok(SizeEstimate {
            page_count: sizes.len(),
            original,
            estimated: (original as f64 * f64::from(quality)).round() as u64,
        })
    }

    fn pages_in_scope_mut(&mut self, scope: CompressionScope) -> impl Iterator<Item = &mut Page> {
        self.pages
            .iter_mut()
            .filter(move |page| scope == CompressionScope::All || page.selected)
    }

    /// Pages grouped by source, in first-seen order.
    pub fn groups(&self) -> Vec<DocumentGroup<'_>> {
        group_pages(&self.pages, &self.collapsed)
    }

    /// Collapse or expand a group. Returns the new collapsed state.
    pub fn toggle_collapsed(&mut self, id: SourceId) -> bool {
        if self.collapsed.remove(&id) {
            false
        } else {
            self.collapsed.insert(id);
            true
        }
    }

    /// Whether a group is collapsed.
    pub fn is_collapsed(&self, id: SourceId) -> bool {
        self.collapsed.contains(&id)
    }
}
