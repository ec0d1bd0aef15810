//! Source registry: the files a workspace was built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an ingested source document.
///
/// Allocated by [`SourceRegistry`] and never reused within one registry, so a
/// removed source's id cannot be confused with a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(u64);

impl SourceId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// One originally ingested file, always held as PDF bytes.
///
/// Image and text inputs are converted to a PDF at ingestion time, so the
/// assembly engine only ever deals with PDF sources.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Registry-assigned identifier.
    pub id: SourceId,

    /// File name shown to the user.
    pub display_name: String,

    /// PDF bytes.
    pub bytes: Vec<u8>,

    /// Number of pages in `bytes`.
    pub page_count: u32,

    /// Whether the PDF was synthesized from a raster image.
    pub is_image_derived: bool,
}

impl SourceDocument {
    /// Rough per-page byte size, used for compression estimates.
    pub fn page_size_estimate(&self) -> u64 {
        if self.page_count == 0 {
            return 0;
        }
        self.bytes.len() as u64 / u64::from(self.page_count)
    }
}

/// Owner of all source documents in a workspace.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    next_id: u64,
    documents: Vec<SourceDocument>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id the next inserted document will receive.
    pub(crate) fn allocate_id(&mut self) -> SourceId {
        self.next_id += 1;
        SourceId(self.next_id)
    }

    /// Insert a document whose id was obtained from [`Self::allocate_id`].
    pub(crate) fn insert(&mut self, document: SourceDocument) {
        self.documents.push(document);
    }

    /// Look up a document.
    pub fn get(&self, id: SourceId) -> Option<&SourceDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Whether a document with this id is loaded.
    pub fn contains(&self, id: SourceId) -> bool {
        self.get(id).is_some()
    }

    /// Remove a document, returning it if it was present.
    pub(crate) fn remove(&mut self, id: SourceId) -> Option<SourceDocument> {
        let position = self.documents.iter().position(|doc| doc.id == id)?;
        Some(self.documents.remove(position))
    }

    /// Drop every document. Ids keep counting up.
    pub(crate) fn clear(&mut self) {
        self.documents.clear();
    }

    /// Documents in ingestion order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceDocument> {
        self.documents.iter()
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
