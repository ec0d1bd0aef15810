//! Copying pages between `lopdf` documents.
//!
//! `lopdf` has no "import page" primitive, so a page is copied by deep-copying
//! its dictionary and everything it references into the target, allocating
//! fresh object ids. One id map is kept per source so resources shared by
//! several pages of the same source are copied once.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::PageSizeSettings;
use crate::error::{PageMillError, Result};
use crate::model::{Rotation, SourceId, SourceRegistry};
use crate::pdf::{self, PdfBuilder};

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// A parsed source plus the object ids of its pages.
pub(crate) struct LoadedSource {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

/// Parses each source at most once per assembly.
pub(crate) struct SourceCache<'a> {
    registry: &'a SourceRegistry,
    loaded: HashMap<SourceId, LoadedSource>,
}

impl<'a> SourceCache<'a> {
    pub(crate) fn new(registry: &'a SourceRegistry) -> Self {
        Self {
            registry,
            loaded: HashMap::new(),
        }
    }

    /// The parsed source, loading it on first use.
    pub(crate) fn load(&mut self, id: SourceId) -> Result<&LoadedSource> {
        match self.loaded.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let source = self
                    .registry
                    .get(id)
                    .ok_or(PageMillError::SourceNotFound { id })?;
                let document = pdf::load(&source.bytes)
                    .map_err(|e| PageMillError::assembly_failed(format!("{}: {e}", source.display_name)))?;
                log::debug!("Parsed {} for assembly", source.display_name);
                let pages = document.get_pages();
                Ok(entry.insert(LoadedSource { document, pages }))
            }
        }
    }
}

/// Accumulates copied pages into a new document.
pub(crate) struct PageCopier {
    builder: PdfBuilder,
    id_maps: HashMap<SourceId, HashMap<ObjectId, ObjectId>>,
}

impl PageCopier {
    pub(crate) fn new() -> Self {
        Self {
            builder: PdfBuilder::new(),
            id_maps: HashMap::new(),
        }
    }

    /// The document being assembled.
    pub(crate) fn document_mut(&mut self) -> &mut Document {
        self.builder.document_mut()
    }

    /// Copy 1-indexed page `page_number` of `source` and append it.
    ///
    /// Returns the object id of the new page.
    pub(crate) fn copy_page(&mut self, source_id: SourceId, source: &LoadedSource, page_number: u32) -> Result<ObjectId> {
        let page_id = *source.pages.get(&page_number).ok_or_else(|| {
            PageMillError::assembly_failed(format!("{source_id} has no page {page_number}"))
        })?;
        let page = source
            .document
            .get_dictionary(page_id)
            .map_err(|e| PageMillError::assembly_failed(format!("{source_id} page {page_number}: {e}")))?;

        let mut flattened = page.clone();
        for key in INHERITABLE {
            if !flattened.has(key)
                && let Some(value) = pdf::inherited(&source.document, page, key)
            {
                flattened.set(key, value.clone());
            }
        }
        flattened.remove(b"Parent");

        let page_objects: HashSet<ObjectId> = source.pages.values().copied().collect();
        let mut id_map = self.id_maps.remove(&source_id).unwrap_or_default();
        let target_id = self.builder.reserve_page_id();
        let copied = {
            let mut copier = ObjectCopier {
                target: self.builder.document_mut(),
                source: &source.document,
                id_map: &mut id_map,
                page_objects: &page_objects,
            };
            copier.copy_dictionary(&flattened)
        };
        self.id_maps.insert(source_id, id_map);
        self.builder.insert_page(target_id, copied);

        Ok(target_id)
    }

    /// Set a page's rotation, replacing whatever the source declared.
    pub(crate) fn set_rotation(&mut self, page_id: ObjectId, rotation: Rotation) -> Result<()> {
        let page = self.page_mut(page_id)?;
        page.set("Rotate", i64::from(rotation.as_degrees()));
        Ok(())
    }

    /// Force the page box to the effective size. Content is not scaled.
    pub(crate) fn set_size(&mut self, page_id: ObjectId, page_size: &PageSizeSettings) -> Result<()> {
        let Some((width, height)) = page_size.effective_dimensions() else {
            return Ok(());
        };
        let page = self.page_mut(page_id)?;
        page.set("MediaBox", pdf::rectangle(width, height));
        page.set("CropBox", pdf::rectangle(width, height));
        Ok(())
    }

    fn page_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.builder
            .document_mut()
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PageMillError::assembly_failed(e.to_string()))
    }

    /// Finish the page tree and return the document.
    pub(crate) fn finish(self) -> Document {
        self.builder.finish()
    }
}

/// One deep copy of an object graph from `source` into `target`.
struct ObjectCopier<'a> {
    target: &'a mut Document,
    source: &'a Document,
    id_map: &'a mut HashMap<ObjectId, ObjectId>,
    page_objects: &'a HashSet<ObjectId>,
}

impl ObjectCopier<'_> {
    fn copy(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => Object::Array(items.iter().map(|item| self.copy(item)).collect()),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        // Page tree nodes point back up through Parent; never follow that.
        let is_page_node = matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"Page" || name == b"Pages"
        );
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if is_page_node && key == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.copy(value));
        }
        copy
    }

    fn copy_reference(&mut self, id: ObjectId) -> Object {
        if let Some(&mapped) = self.id_map.get(&id) {
            return Object::Reference(mapped);
        }
        // Links to other pages (annotation /P, /Dest) would drag whole pages
        // into the output.
        if self.page_objects.contains(&id) {
            return Object::Null;
        }
        let Ok(object) = self.source.get_object(id) else {
            return Object::Null;
        };

        let new_id = self.target.new_object_id();
        self.id_map.insert(id, new_id);
        let copied = self.copy(object);
        self.target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }
}
