//! Wrapping PNG and JPEG images in a one-page PDF.

use image::{ColorType, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, Stream, dictionary};

use super::MediaType;
use crate::error::{PageMillError, Result};
use crate::pdf::{self, PdfBuilder};

/// Build a PDF with a single page the size of the image in pixels, with the
/// image drawn at the origin.
///
/// 8-bit RGB and grayscale JPEGs are embedded as-is (`DCTDecode`); every
/// other image is decoded and stored as raw RGB. Alpha is dropped.
pub(super) fn image_to_pdf(bytes: &[u8], media_type: MediaType) -> Result<Vec<u8>> {
    let format = match media_type {
        MediaType::Jpeg => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    };
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PageMillError::ingest_failed(format!("cannot decode image: {e}")))?;
    let (width, height) = (decoded.width(), decoded.height());

    let image_stream = match (format, decoded.color()) {
        (ImageFormat::Jpeg, ColorType::Rgb8) => jpeg_stream(bytes.to_vec(), width, height, "DeviceRGB"),
        (ImageFormat::Jpeg, ColorType::L8) => jpeg_stream(bytes.to_vec(), width, height, "DeviceGray"),
        _ => Stream::new(
            image_dictionary(width, height, "DeviceRGB"),
            decoded.to_rgb8().into_raw(),
        ),
    };

    let mut builder = PdfBuilder::new();
    let image_id = builder.add_object(image_stream);

    let (w, h) = (width as f32, height as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| PageMillError::ingest_failed(e.to_string()))?;
    let content_id = builder.add_object(Stream::new(Dictionary::new(), encoded));

    builder.add_page(dictionary! {
        "MediaBox" => pdf::rectangle(w, h),
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "Contents" => content_id,
    });

    let mut doc = builder.finish();
    doc.compress();
    pdf::save(&mut doc).map_err(PageMillError::ingest_failed)
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8,
    }
}

fn jpeg_stream(bytes: Vec<u8>, width: u32, height: u32, color_space: &str) -> Stream {
    let mut dict = image_dictionary(width, height, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    // Already compressed; keep `compress()` from wrapping it in Flate.
    Stream::new(dict, bytes).with_compression(false)
}
