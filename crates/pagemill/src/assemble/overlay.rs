//! Burning annotations into page content.
//!
//! Annotations are stored as fractions of the page box with a top-left
//! origin. They are drawn in the page's unrotated coordinate space, after
//! the existing content, which is wrapped in `q`/`Q` so its graphics state
//! cannot leak into the overlay.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::AssemblyWarning;
use crate::error::{PageMillError, Result};
use crate::model::{Annotation, AnnotationKind, PageId};
use crate::pdf;

const HIGHLIGHT_STATE: &str = "PMHighlight";
const HIGHLIGHT_ALPHA: f32 = 0.35;
const FONT: &str = "PMHelv";
const DEFAULT_FONT_SIZE: f32 = 14.0;
const STROKE_WIDTH: f32 = 2.0;

/// Page geometry used to map fractions to user space.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl Frame {
    fn x(&self, fraction: f32) -> f32 {
        self.left + fraction * self.width
    }

    fn y(&self, fraction: f32) -> f32 {
        self.top - fraction * self.height
    }
}

/// Draw `annotations` onto the page object `page_object`.
///
/// Signatures carrying an image are skipped with a warning.
pub(crate) fn burn_in(
    doc: &mut Document,
    page_object: ObjectId,
    page_id: PageId,
    annotations: &[Annotation],
    warnings: &mut Vec<AssemblyWarning>,
) -> Result<()> {
    if annotations.is_empty() {
        return Ok(());
    }

    let [x0, y0, x1, y1] = pdf::page_box(doc, page_object);
    let frame = Frame {
        left: x0,
        top: y1,
        width: x1 - x0,
        height: y1 - y0,
    };

    let mut operations = Vec::new();
    for annotation in annotations {
        if annotation.kind == AnnotationKind::Signature
            && annotation.content.as_deref().is_some_and(|c| c.starts_with("data:"))
        {
            log::warn!("Signature image on {page_id} cannot be embedded; skipped");
            warnings.push(AssemblyWarning::SignatureImageSkipped { page: page_id });
            continue;
        }
        operations.extend(draw(annotation, frame));
    }
    if operations.is_empty() {
        return Ok(());
    }

    let overlay = Content { operations }
        .encode()
        .map_err(|e| PageMillError::assembly_failed(e.to_string()))?;

    let resources = overlay_resources(doc, page_object);
    let contents = wrapped_contents(doc, page_object, overlay);

    let page = doc
        .get_object_mut(page_object)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PageMillError::assembly_failed(e.to_string()))?;
    page.set("Resources", resources);
    page.set("Contents", contents);

    log::debug!("Burned {} annotation(s) into {page_id}", annotations.len());
    Ok(())
}

fn draw(annotation: &Annotation, frame: Frame) -> Vec<Operation> {
    let (r, g, b) = annotation.rgb();
    let mut ops = vec![Operation::new("q", vec![])];

    match annotation.kind {
        AnnotationKind::Highlight => {
            ops.push(Operation::new("gs", vec![HIGHLIGHT_STATE.into()]));
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            let width = annotation.width * frame.width;
            let height = annotation.height * frame.height;
            ops.push(Operation::new(
                "re",
                vec![
                    frame.x(annotation.x).into(),
                    (frame.y(annotation.y) - height).into(),
                    width.into(),
                    height.into(),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
        }
        AnnotationKind::Drawing => {
            let [first, rest @ ..] = annotation.points.as_slice() else {
                return Vec::new();
            };
            if rest.is_empty() {
                return Vec::new();
            }
            ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
            ops.push(Operation::new("w", vec![STROKE_WIDTH.into()]));
            ops.push(Operation::new("J", vec![Object::Integer(1)]));
            ops.push(Operation::new("j", vec![Object::Integer(1)]));
            ops.push(Operation::new("m", vec![frame.x(first.x).into(), frame.y(first.y).into()]));
            for point in rest {
                ops.push(Operation::new("l", vec![frame.x(point.x).into(), frame.y(point.y).into()]));
            }
            ops.push(Operation::new("S", vec![]));
        }
        AnnotationKind::Text | AnnotationKind::Signature => {
            let Some(text) = annotation.content.as_deref().filter(|t| !t.is_empty()) else {
                return Vec::new();
            };
            let size = if annotation.height > 0.0 {
                annotation.height * frame.height * 0.8
            } else {
                DEFAULT_FONT_SIZE
            };
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec![FONT.into(), size.into()]));
            ops.push(Operation::new(
                "Td",
                vec![frame.x(annotation.x).into(), (frame.y(annotation.y) - size).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(pdf::win_ansi(text), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
    }

    ops.push(Operation::new("Q", vec![]));
    ops
}

/// The page's resources with the overlay font and graphics state added.
fn overlay_resources(doc: &Document, page_object: ObjectId) -> Dictionary {
    let mut resources = doc
        .get_dictionary(page_object)
        .ok()
        .and_then(|page| pdf::inherited(doc, page, b"Resources"))
        .and_then(|resources| pdf::resolve_dictionary(doc, resources))
        .cloned()
        .unwrap_or_default();

    let mut states = sub_dictionary(doc, &resources, b"ExtGState");
    states.set(
        HIGHLIGHT_STATE,
        dictionary! {
            "Type" => "ExtGState",
            "ca" => HIGHLIGHT_ALPHA,
            "CA" => HIGHLIGHT_ALPHA,
        },
    );
    resources.set("ExtGState", states);

    let mut fonts = sub_dictionary(doc, &resources, b"Font");
    fonts.set(
        FONT,
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        },
    );
    resources.set("Font", fonts);

    resources
}

fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|value| pdf::resolve_dictionary(doc, value))
        .cloned()
        .unwrap_or_default()
}

/// `[q, existing..., Q, overlay]` as a contents array.
fn wrapped_contents(doc: &mut Document, page_object: ObjectId, overlay: Vec<u8>) -> Object {
    let existing: Vec<Object> = match doc.get_dictionary(page_object).ok().and_then(|p| p.get(b"Contents").ok()) {
        Some(Object::Array(items)) => items.clone(),
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let overlay = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(save));
    contents.extend(existing);
    contents.push(Object::Reference(restore));
    contents.push(Object::Reference(overlay));
    Object::Array(contents)
}
