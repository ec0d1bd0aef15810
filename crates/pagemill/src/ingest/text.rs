//! Plain text and HTML inputs laid out as simple Helvetica pages.
//!
//! This is a best-effort conversion: HTML is reduced to its text with line
//! breaks at block elements, then wrapped at a fixed character width. There
//! is no font metrics, styling or image support.

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, doc_text, element, rewrite_str};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, Stream, StringFormat, dictionary};

use crate::error::{PageMillError, Result};
use crate::pdf::{self, PdfBuilder};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const FONT_SIZE: f32 = 11.0;
const LEADING: f32 = 14.0;

/// Characters per line; Helvetica averages about half an em per glyph.
const LINE_WIDTH_CHARS: usize = ((PAGE_WIDTH - 2.0 * MARGIN) / (FONT_SIZE * 0.5)) as usize;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING) as usize;

/// Lay out `text` on Letter pages. Empty text still yields one blank page.
pub(super) fn text_to_pdf(text: &str) -> Result<Vec<u8>> {
    let lines = wrap(text, LINE_WIDTH_CHARS);

    let mut builder = PdfBuilder::new();
    let font_id = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut chunks: Vec<&[String]> = lines.chunks(LINES_PER_PAGE).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    for chunk in chunks {
        let content = page_content(chunk)
            .encode()
            .map_err(|e| PageMillError::ingest_failed(e.to_string()))?;
        let content_id = builder.add_object(Stream::new(Dictionary::new(), content));
        builder.add_page(dictionary! {
            "MediaBox" => pdf::rectangle(PAGE_WIDTH, PAGE_HEIGHT),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
    }

    let mut doc = builder.finish();
    doc.compress();
    pdf::save(&mut doc).map_err(PageMillError::ingest_failed)
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()]),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(pdf::win_ansi(line), StringFormat::Literal)],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..width).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let word_len = word.chars().count();
            if !line.is_empty() && line.chars().count() + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    // Drop trailing blank lines.
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Elements whose content never reaches the page.
const HIDDEN_ELEMENTS: [&str; 5] = ["head", "script", "style", "template", "noscript"];

/// Elements that start and end on their own line.
const BLOCK_ELEMENTS: [&str; 11] = ["br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Reduce HTML to text, breaking lines at block elements.
///
/// Hidden elements are dropped and line breaks inserted in a first pass;
/// the second pass keeps only text nodes, so markup, attributes and
/// comments never leak into the output.
pub(super) fn html_to_text(html: &str) -> Result<String> {
    let hidden = HIDDEN_ELEMENTS.iter().map(|name| {
        element!(*name, |el| {
            el.remove();
            Ok(())
        })
    });
    let blocks = BLOCK_ELEMENTS.iter().map(|name| {
        element!(*name, |el| {
            el.before("\n", ContentType::Text);
            if el.can_have_content() {
                el.after("\n", ContentType::Text);
            }
            Ok(())
        })
    });

    let laid_out = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: hidden.chain(blocks).collect(),
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| PageMillError::ingest_failed(format!("HTML could not be parsed: {e}")))?;

    let mut text = String::new();
    rewrite_str(
        &laid_out,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                text.push_str(chunk.as_str());
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| PageMillError::ingest_failed(format!("HTML could not be parsed: {e}")))?;

    Ok(html_escape::decode_html_entities(&text).into_owned())
}
