//! MuPDF-backed rasterization.

use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix};

use super::{PageRenderer, THUMBNAIL_QUALITY, encode_jpeg, raster_size};
use crate::error::{PageMillError, Result};
use crate::model::Thumbnail;

/// Renders pages with MuPDF and encodes them as JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfRenderer;

impl MupdfRenderer {
    /// Create a MuPDF renderer.
    pub fn new() -> Self {
        Self
    }
}

impl PageRenderer for MupdfRenderer {
    fn render_page(&self, pdf: &[u8], page_number: u32, scale: f32) -> Result<Thumbnail> {
        let doc = open(pdf, page_number)?;
        render(&doc, page_number, scale)
    }

    fn render_all(&self, pdf: &[u8], page_count: u32, scale: f32) -> Result<Vec<Thumbnail>> {
        let doc = open(pdf, 1)?;
        (1..=page_count)
            .map(|page_number| render(&doc, page_number, scale))
            .collect()
    }
}

fn open(pdf: &[u8], page_number: u32) -> Result<Document> {
    Document::from_bytes(pdf, "application/pdf")
        .map_err(|e| PageMillError::render_failed(page_number, e.to_string()))
}

fn render(doc: &Document, page_number: u32, scale: f32) -> Result<Thumbnail> {
    let failed = |e: mupdf::Error| PageMillError::render_failed(page_number, e.to_string());

    let index = page_number
        .checked_sub(1)
        .and_then(|index| i32::try_from(index).ok())
        .ok_or_else(|| PageMillError::render_failed(page_number, "page not found"))?;
    let page = doc.load_page(index).map_err(failed)?;

    let bounds = page.bounds().map_err(failed)?;
    raster_size(page_number, bounds.x1 - bounds.x0, bounds.y1 - bounds.y0, scale)?;

    let pixmap = page
        .to_pixmap(&Matrix::new_scale(scale, scale), &Colorspace::device_rgb(), false, true)
        .map_err(failed)?;
    let (width, height) = (pixmap.width() as u32, pixmap.height() as u32);
    let channels = pixmap.n() as usize;
    if channels < 3 {
        return Err(PageMillError::render_failed(
            page_number,
            format!("unexpected pixmap with {channels} channel(s)"),
        ));
    }

    let rgb: Vec<u8> = pixmap
        .samples()
        .chunks_exact(channels)
        .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
        .collect();
    let raster = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| PageMillError::render_failed(page_number, "pixmap size does not match its samples"))?;
    let jpeg = encode_jpeg(&DynamicImage::ImageRgb8(raster), THUMBNAIL_QUALITY)
        .map_err(|reason| PageMillError::render_failed(page_number, reason))?;

    log::debug!("Rendered page {page_number} at {width}x{height}");
    Ok(Thumbnail { jpeg, width, height })
}
