//! Thin helpers over the `lopdf` engine.
//!
//! Parsing, saving, page box lookup and the skeleton of a fresh document
//! (catalog plus a flat page tree) live here so ingestion, rendering and
//! assembly all talk to the engine the same way.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

/// Nesting limit when walking `Parent` chains for inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Letter size in points, used when a page declares no usable MediaBox.
pub(crate) const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Parse PDF bytes.
pub(crate) fn load(bytes: &[u8]) -> Result<Document, String> {
    Document::load_mem(bytes).map_err(|e| e.to_string())
}

/// Serialize a document to bytes.
pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(|e| e.to_string())?;
    Ok(buffer)
}

/// Look up `key` on a page dictionary, walking up the page tree for
/// inheritable attributes (`MediaBox`, `CropBox`, `Resources`, `Rotate`).
pub(crate) fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Resolve an object that may be an indirect reference.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve an object that should be a dictionary.
pub(crate) fn resolve_dictionary<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, object)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Numeric value of an integer or real object.
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// A page's MediaBox as `[x0, y0, x1, y1]`, normalized so `x0 < x1` and
/// `y0 < y1`.
///
/// Falls back to Letter at the origin when the box is missing or malformed.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let (default_w, default_h) = DEFAULT_PAGE_SIZE;
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| inherited(doc, page, b"MediaBox"))
        .and_then(|media_box| resolve(doc, media_box))
        .and_then(|media_box| media_box.as_array().ok())
        .and_then(|values| {
            let values: Vec<f32> = values.iter().filter_map(number).collect();
            match values.as_slice() {
                [x0, y0, x1, y1] => Some([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)]),
                _ => None,
            }
        })
        .filter(|[x0, y0, x1, y1]| x1 - x0 > 0.0 && y1 - y0 > 0.0)
        .unwrap_or([0.0, 0.0, default_w, default_h])
}

/// Width and height of a page's MediaBox in points.
pub(crate) fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let [x0, y0, x1, y1] = page_box(doc, page_id);
    (x1 - x0, y1 - y0)
}

/// Encode text for the standard 14 fonts; characters outside Latin-1
/// become `?`.
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// A `[0 0 w h]` rectangle.
pub(crate) fn rectangle(width: f32, height: f32) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width),
        Object::Real(height),
    ])
}

/// Builds a new document with a flat page tree.
pub(crate) struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PdfBuilder {
    /// Start an empty document.
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// The document under construction.
    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    /// The document under construction, mutably.
    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Allocate an id for a page that will be inserted later.
    pub(crate) fn reserve_page_id(&mut self) -> ObjectId {
        self.doc.new_object_id()
    }

    /// Insert a page dictionary under a previously reserved id and append it
    /// to the page tree.
    pub(crate) fn insert_page(&mut self, page_id: ObjectId, mut page: Dictionary) {
        page.set("Type", "Page");
        page.set("Parent", self.pages_id);
        self.doc.objects.insert(page_id, Object::Dictionary(page));
        self.kids.push(page_id);
    }

    /// Append a page dictionary to the page tree.
    pub(crate) fn add_page(&mut self, page: Dictionary) -> ObjectId {
        let page_id = self.reserve_page_id();
        self.insert_page(page_id, page);
        page_id
    }

    /// Add a stream object and return its id.
    pub(crate) fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Number of pages added so far.
    pub(crate) fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Write the page tree and catalog and return the finished document.
    pub(crate) fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids.into_iter().map(Object::Reference).collect::<Vec<Object>>(),
            "Count" => count,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}
