//! Page rasterization.
//!
//! Thumbnails are produced by a [`PageRenderer`] during ingestion. With the
//! `mupdf` feature, [`MupdfRenderer`] rasterizes pages with MuPDF. Without
//! it, [`PlaceholderRenderer`] draws a blank page of the right proportions
//! so thumbnails and image export still work end to end.
//! [`default_renderer`] picks whichever is built in.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};

use crate::error::{PageMillError, Result};
use crate::model::Thumbnail;
use crate::pdf;

#[cfg(feature = "mupdf")]
mod mupdf_renderer;

#[cfg(feature = "mupdf")]
pub use mupdf_renderer::MupdfRenderer;

/// Scale at which thumbnails are rendered during ingestion.
pub const THUMBNAIL_SCALE: f32 = 0.5;

/// JPEG quality of thumbnails, in percent.
pub const THUMBNAIL_QUALITY: u8 = 80;

/// Largest raster a thumbnail may have, in pixels.
pub const MAX_THUMBNAIL_PIXELS: u64 = 64 * 1024 * 1024;

/// Pixel size of a `width` x `height` point page at `scale`.
///
/// Fails for non-finite sizes and for rasters above
/// [`MAX_THUMBNAIL_PIXELS`].
pub fn raster_size(page_number: u32, width: f32, height: f32, scale: f32) -> Result<(u32, u32)> {
    let too_large = || {
        PageMillError::render_failed(page_number, format!("page of {width}x{height} points is too large to render"))
    };
    let dimension = |points: f32| {
        let pixels = (points * scale).round();
        if !pixels.is_finite() || pixels > MAX_THUMBNAIL_PIXELS as f32 {
            return Err(too_large());
        }
        Ok((pixels as u32).max(1))
    };

    let (w, h) = (dimension(width)?, dimension(height)?);
    if u64::from(w) * u64::from(h) > MAX_THUMBNAIL_PIXELS {
        return Err(too_large());
    }
    Ok((w, h))
}

/// A page rasterization engine.
pub trait PageRenderer {
    /// Render 1-indexed page `page_number` of `pdf` at `scale` (1.0 = 72 dpi).
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::RenderFailed`] if the page cannot be rendered.
    fn render_page(&self, pdf: &[u8], page_number: u32, scale: f32) -> Result<Thumbnail>;

    /// Render pages `1..=page_count` of `pdf` in order.
    ///
    /// The default calls [`render_page`](Self::render_page) once per page.
    /// Engines that pay a parse cost per call should override it.
    fn render_all(&self, pdf: &[u8], page_count: u32, scale: f32) -> Result<Vec<Thumbnail>> {
        (1..=page_count)
            .map(|page_number| self.render_page(pdf, page_number, scale))
            .collect()
    }

    /// True if pages come out blank instead of showing their content.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// The best renderer this build has.
pub fn default_renderer() -> Box<dyn PageRenderer> {
    #[cfg(feature = "mupdf")]
    {
        Box::new(MupdfRenderer::new())
    }
    #[cfg(not(feature = "mupdf"))]
    {
        Box::new(PlaceholderRenderer::new())
    }
}

/// Renders every page as a white JPEG sized to its MediaBox times the scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    /// Create a placeholder renderer.
    pub fn new() -> Self {
        Self
    }

    fn blank(&self, page_number: u32, width: f32, height: f32, scale: f32) -> Result<Thumbnail> {
        let (width, height) = raster_size(page_number, width, height, scale)?;
        let raster = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let jpeg = encode_jpeg(&DynamicImage::ImageRgb8(raster), THUMBNAIL_QUALITY)
            .map_err(|reason| PageMillError::render_failed(page_number, reason))?;

        Ok(Thumbnail {
            jpeg,
            width,
            height,
        })
    }
}

impl PageRenderer for PlaceholderRenderer {
    fn render_page(&self, pdf: &[u8], page_number: u32, scale: f32) -> Result<Thumbnail> {
        let doc = pdf::load(pdf).map_err(|reason| PageMillError::render_failed(page_number, reason))?;
        let page_id = doc
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(|| PageMillError::render_failed(page_number, "page not found"))?;
        let (width, height) = pdf::page_dimensions(&doc, page_id);
        self.blank(page_number, width, height, scale)
    }

    fn render_all(&self, pdf: &[u8], page_count: u32, scale: f32) -> Result<Vec<Thumbnail>> {
        let doc = pdf::load(pdf).map_err(|reason| PageMillError::render_failed(1, reason))?;
        let pages = doc.get_pages();

        (1..=page_count)
            .map(|page_number| {
                let page_id = pages.get(&page_number).ok_or_else(|| {
                    PageMillError::render_failed(page_number, "page not found")
                })?;
                let (width, height) = pdf::page_dimensions(&doc, *page_id);
                self.blank(page_number, width, height, scale)
            })
            .collect()
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// Encode a raster as JPEG at `quality` percent.
pub(crate) fn encode_jpeg(image: &DynamicImage, quality: u8) -> std::result::Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    image.write_with_encoder(encoder).map_err(|e| e.to_string())?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfBuilder;
    use lopdf::dictionary;

    fn two_page_pdf() -> Vec<u8> {
        let mut builder = PdfBuilder::new();
        builder.add_page(dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        builder.add_page(dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
        });
        let mut doc = builder.finish();
        pdf::save(&mut doc).unwrap()
    }

    #[test]
    fn test_placeholder_sizes_follow_media_box() {
        let renderer = PlaceholderRenderer::new();
        let thumbnails = renderer
            .render_all(&two_page_pdf(), 2, THUMBNAIL_SCALE)
            .unwrap();

        assert_eq!(thumbnails.len(), 2);
        assert_eq!((thumbnails[0].width, thumbnails[0].height), (306, 396));
        assert_eq!((thumbnails[1].width, thumbnails[1].height), (100, 50));
        assert_eq!(&thumbnails[0].jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_render_single_page() {
        let renderer = PlaceholderRenderer::new();
        let thumbnail = renderer.render_page(&two_page_pdf(), 2, 1.0).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (200, 100));
    }

    #[test]
    fn test_render_missing_page_fails() {
        let renderer = PlaceholderRenderer::new();
        let err = renderer.render_page(&two_page_pdf(), 5, 1.0).unwrap_err();
        assert!(matches!(err, PageMillError::RenderFailed { page_number: 5, .. }));
    }

    #[test]
    fn test_huge_media_box_fails_instead_of_panicking() {
        let mut builder = PdfBuilder::new();
        builder.add_page(dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 1e12f32.into(), 1e12f32.into()],
        });
        let mut doc = builder.finish();
        let bytes = pdf::save(&mut doc).unwrap();

        let err = PlaceholderRenderer::new().render_all(&bytes, 1, THUMBNAIL_SCALE).unwrap_err();
        assert!(matches!(err, PageMillError::RenderFailed { page_number: 1, .. }));
    }

    #[test]
    fn test_raster_size_limits() {
        assert_eq!(raster_size(1, 612.0, 792.0, 0.5).unwrap(), (306, 396));
        assert_eq!(raster_size(1, 0.0, 0.4, 1.0).unwrap(), (1, 1));
        assert!(raster_size(1, f32::NAN, 10.0, 1.0).is_err());
        assert!(raster_size(1, 20_000.0, 20_000.0, 1.0).is_err());
    }

    #[test]
    fn test_placeholder_is_flagged() {
        assert!(PlaceholderRenderer::new().is_placeholder());
        #[cfg(not(feature = "mupdf"))]
        assert!(default_renderer().is_placeholder());
    }

    #[test]
    fn test_render_garbage_fails() {
        let renderer = PlaceholderRenderer::new();
        assert!(renderer.render_all(b"%PDF-garbage", 1, 1.0).is_err());
    }
}
