//! Best-effort image recompression.
//!
//! Only baseline JPEG image XObjects in DeviceRGB or DeviceGray are
//! touched: they are decoded and re-encoded at the requested quality, and
//! the new data replaces the old only when it is smaller. Anything else on
//! a page is left alone.
//!
//! Pages copied from the same source share image objects in the output. An
//! image is re-encoded only when every page using it asks for the same
//! quality; otherwise it is left as is and the pages asking for compression
//! get a warning.

use image::ImageFormat;
use lopdf::{Document, Object, ObjectId};
use std::collections::{BTreeMap, HashSet};

use super::AssemblyWarning;
use crate::model::PageId;
use crate::pdf;
use crate::render::encode_jpeg;

/// Outcome of recompressing one document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Recompressed {
    /// Images whose data was replaced.
    pub(crate) images: usize,
    /// Bytes saved across those images.
    pub(crate) saved: u64,
}

/// Compression asked for by one output page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageRequest {
    /// Page object in the output document.
    pub(crate) object: ObjectId,
    /// Workspace page it was copied from.
    pub(crate) page: PageId,
    /// Quality in (0, 1]. 1.0 leaves the page's images untouched.
    pub(crate) quality: f32,
}

impl PageRequest {
    /// JPEG quality in percent, or `None` when no recompression is wanted.
    fn jpeg_quality(&self) -> Option<u8> {
        (self.quality < 1.0).then(|| (self.quality * 100.0).round().clamp(1.0, 100.0) as u8)
    }
}

/// Recompress the JPEG images of `doc` as `requests` ask.
///
/// Every output page must be listed, including pages at quality 1.0, so
/// that images shared with them are kept intact. A page asking for
/// compression gets a [`AssemblyWarning::CompressionSkipped`] when it has no
/// eligible image or when one of its images is shared with a page at a
/// different quality.
pub(crate) fn recompress(
    doc: &mut Document,
    requests: &[PageRequest],
    warnings: &mut Vec<AssemblyWarning>,
) -> Recompressed {
    let mut users: BTreeMap<ObjectId, Vec<&PageRequest>> = BTreeMap::new();
    for request in requests {
        let images = eligible_images(doc, request.object);
        if images.is_empty() && request.jpeg_quality().is_some() {
            log::warn!("{} has no JPEG images to recompress", request.page);
            warnings.push(AssemblyWarning::CompressionSkipped {
                page: request.page,
                reason: "no JPEG images on page".into(),
            });
        }
        for image_id in images {
            users.entry(image_id).or_default().push(request);
        }
    }

    let mut conflicted: HashSet<PageId> = HashSet::new();
    let mut outcome = Recompressed::default();
    for (image_id, pages) in users {
        let qualities: HashSet<Option<u8>> = pages.iter().map(|r| r.jpeg_quality()).collect();
        match qualities.into_iter().collect::<Vec<_>>().as_slice() {
            [None] => {}
            [Some(quality)] => {
                if let Some(saved) = reencode(doc, image_id, *quality) {
                    outcome.images += 1;
                    outcome.saved += saved;
                }
            }
            _ => {
                log::warn!("Image {image_id:?} is shared by pages at different qualities; leaving it as is");
                for request in pages {
                    if request.jpeg_quality().is_some() && conflicted.insert(request.page) {
                        warnings.push(AssemblyWarning::CompressionSkipped {
                            page: request.page,
                            reason: "image shared with a page at a different quality".into(),
                        });
                    }
                }
            }
        }
    }

    log::debug!(
        "Recompressed {} image(s), saved {} bytes",
        outcome.images,
        outcome.saved
    );
    outcome
}

/// Re-encode one image stream. Returns the bytes saved if it was replaced.
fn reencode(doc: &mut Document, image_id: ObjectId, quality: u8) -> Option<u64> {
    let Ok(Object::Stream(stream)) = doc.get_object_mut(image_id) else {
        return None;
    };
    let decoded = match image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Leaving image {image_id:?} as is: {e}");
            return None;
        }
    };
    let encoded = match encode_jpeg(&decoded, quality) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::debug!("Re-encoding image {image_id:?} failed: {e}");
            return None;
        }
    };
    if encoded.len() >= stream.content.len() {
        return None;
    }
    let saved = (stream.content.len() - encoded.len()) as u64;
    stream.set_content(encoded);
    Some(saved)
}

/// Ids of image XObjects on the page that can be re-encoded as JPEG.
fn eligible_images(doc: &Document, page_object: ObjectId) -> Vec<ObjectId> {
    let Some(xobjects) = doc
        .get_dictionary(page_object)
        .ok()
        .and_then(|page| pdf::inherited(doc, page, b"Resources"))
        .and_then(|resources| pdf::resolve_dictionary(doc, resources))
        .and_then(|resources| resources.get(b"XObject").ok())
        .and_then(|xobjects| pdf::resolve_dictionary(doc, xobjects))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, value)| value.as_reference().ok())
        .filter(|id| {
            doc.get_object(*id)
                .and_then(Object::as_stream)
                .is_ok_and(|stream| is_plain_jpeg(doc, &stream.dict))
        })
        .collect()
}

fn is_plain_jpeg(doc: &Document, dict: &lopdf::Dictionary) -> bool {
    let name_is = |key: &[u8], expected: &[&[u8]]| {
        dict.get(key)
            .ok()
            .and_then(|value| pdf::resolve(doc, value))
            .and_then(|value| match value {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(items) if items.len() == 1 => items[0].as_name().ok(),
                _ => None,
            })
            .is_some_and(|name| expected.contains(&name))
    };

    name_is(b"Subtype", &[b"Image"])
        && name_is(b"Filter", &[b"DCTDecode"])
        && name_is(b"ColorSpace", &[b"DeviceRGB", b"DeviceGray"])
        && !dict.has(b"SMask")
}
