//! Shared fixtures for integration tests. PDFs are generated in-process.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

use pagemill::ingest::InputFile;
use pagemill::render::PlaceholderRenderer;
use pagemill::{SourceId, Workspace};

/// A PDF with `pages` pages of `width` x `height` points.
pub fn pdf_bytes(pages: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("0 0 m {n} {n} l S");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A Letter-sized PDF input named `name`.
pub fn pdf_input(name: &str, pages: usize) -> InputFile {
    InputFile::new(name, pdf_bytes(pages, 612, 792), "application/pdf")
}

/// A solid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let raster = RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(raster)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// A workspace holding one PDF source per entry of `page_counts`.
pub fn workspace_with(page_counts: &[usize]) -> (Workspace, Vec<SourceId>) {
    let mut workspace = Workspace::new();
    let batch = page_counts
        .iter()
        .enumerate()
        .map(|(i, &pages)| pdf_input(&format!("doc{}.pdf", i + 1), pages));
    let summary = workspace.ingest(batch, &PlaceholderRenderer).unwrap();
    (workspace, summary.sources_added)
}

/// Page count of a PDF.
pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

/// `/Rotate` of every page, in order.
pub fn rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            doc.get_dictionary(*id)
                .unwrap()
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .unwrap_or(0)
        })
        .collect()
}

/// Entry names of a ZIP archive, in order.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Path for an output file inside a fresh temporary directory.
///
/// The directory is kept alive by the returned guard.
pub fn temp_output_path(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}
