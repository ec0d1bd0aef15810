//! Turning input files into PDF sources.
//!
//! Every accepted input becomes PDF bytes: PDFs pass through untouched, PNG
//! and JPEG images are wrapped in a one-page document, and plain text or HTML
//! is laid out as simple Helvetica pages. Inputs of any other media type are
//! not an error; [`convert`] returns `None` and the caller skips them.

mod raster;
mod text;

use std::fmt;
use std::path::Path;

use crate::error::{PageMillError, Result};
use crate::pdf;

/// Media types accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// `application/pdf`
    Pdf,
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `text/plain`
    PlainText,
    /// `text/html`
    Html,
}

impl MediaType {
    /// Map a MIME type string to a supported media type.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "text/plain" => Some(Self::PlainText),
            "text/html" => Some(Self::Html),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
        }
    }

    /// Whether inputs of this type are synthesized from a raster image.
    pub fn is_image(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// One file handed to [`Workspace::ingest`](crate::Workspace::ingest).
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Display name, usually the file name.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Declared MIME type.
    pub mime: String,
}

impl InputFile {
    /// Create an input with an explicit MIME type.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime: mime.into(),
        }
    }

    /// Create an input whose MIME type is guessed from the name's extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which ingestion
    /// skips.
    pub fn guessed(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(Path::new(&name))
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self { name, bytes, mime }
    }

    /// The supported media type of this input, if any.
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_mime(&self.mime)
    }
}

/// An input converted to PDF bytes.
#[derive(Debug)]
pub(crate) struct Converted {
    pub(crate) bytes: Vec<u8>,
    pub(crate) page_count: u32,
    pub(crate) is_image_derived: bool,
}

/// Convert an input to PDF bytes.
///
/// Returns `Ok(None)` for unsupported media types.
///
/// # Errors
///
/// Returns [`PageMillError::IngestFailed`] if a supported input cannot be
/// parsed or decoded.
pub(crate) fn convert(input: &InputFile) -> Result<Option<Converted>> {
    let Some(media_type) = input.media_type() else {
        log::debug!("Skipping {} ({}): unsupported media type", input.name, input.mime);
        return Ok(None);
    };

    let bytes = match media_type {
        MediaType::Pdf => input.bytes.clone(),
        MediaType::Png | MediaType::Jpeg => raster::image_to_pdf(&input.bytes, media_type)?,
        MediaType::PlainText => text::text_to_pdf(&String::from_utf8_lossy(&input.bytes))?,
        MediaType::Html => text::text_to_pdf(&text::html_to_text(&String::from_utf8_lossy(&input.bytes))?)?,
    };

    let page_count = count_pages(&bytes)?;
    log::debug!("Converted {} ({media_type}): {page_count} pages", input.name);

    Ok(Some(Converted {
        bytes,
        page_count,
        is_image_derived: media_type.is_image(),
    }))
}

fn count_pages(bytes: &[u8]) -> Result<u32> {
    let doc = pdf::load(bytes).map_err(PageMillError::ingest_failed)?;
    let page_count = doc.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PageMillError::ingest_failed("document has no pages"));
    }
    Ok(page_count)
}
