//! Content extraction: PDF, DOCX or plain text → [`DocumentContent`].
//!
//! Extraction is synchronous and CPU-bound; [`crate::generate`] runs it
//! inside `spawn_blocking`.
//!
//! | Kind | Text | Images |
//! |------|------|--------|
//! | PDF  | `lopdf` text of every page, newline-joined | `/Subtype /Image` XObjects referenced from each page's own resources |
//! | DOCX | `w:t` runs of every `w:p` in `word/document.xml` | none |
//! | TXT  | UTF-8 (lossy on invalid bytes) | none |
//!
//! Images are only collected from PDFs. JPEG streams are kept as-is;
//! 8-bit RGB or grey pixel streams (raw or Flate) become [`DynamicImage`]s.
//! Anything else (CCITT, JBIG2, indexed colour, inherited resources) is
//! skipped.

use super::input::DocumentKind;
use crate::error::McqError;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// An image found inside the source document.
#[derive(Debug, Clone)]
pub enum EmbeddedImage {
    /// A DCT-encoded stream, forwarded without re-encoding.
    Jpeg { page: u32, data: Vec<u8> },
    /// Decoded pixels.
    Raster { page: u32, image: DynamicImage },
}

impl EmbeddedImage {
    /// 1-indexed page the image was found on.
    pub fn page(&self) -> u32 {
        match self {
            EmbeddedImage::Jpeg { page, .. } | EmbeddedImage::Raster { page, .. } => *page,
        }
    }
}

/// Text and images pulled out of one input document.
#[derive(Debug, Clone, Default)]
pub struct DocumentContent {
    pub text: String,
    pub images: Vec<EmbeddedImage>,
    /// Page count, for PDFs.
    pub page_count: Option<usize>,
}

/// Extraction switches.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub include_images: bool,
    pub max_images: usize,
}

/// Extract content from `path` according to its kind.
pub fn extract(
    path: &Path,
    kind: DocumentKind,
    opts: ExtractOptions,
) -> Result<DocumentContent, McqError> {
    let content = match kind {
        DocumentKind::Pdf => extract_pdf(path, opts)?,
        DocumentKind::Docx => DocumentContent {
            text: extract_docx(path)?,
            ..Default::default()
        },
        DocumentKind::Text => DocumentContent {
            text: extract_txt(path)?,
            ..Default::default()
        },
    };
    info!(
        "Extracted {} chars and {} images from {}",
        content.text.chars().count(),
        content.images.len(),
        path.display()
    );
    Ok(content)
}

// ── PDF ──────────────────────────────────────────────────────────────────

fn extract_pdf(path: &Path, opts: ExtractOptions) -> Result<DocumentContent, McqError> {
    let doc = Document::load(path).map_err(|e| McqError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let mut text = String::new();
    let mut images = Vec::new();

    for (&page_num, &page_id) in pages.iter() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!("Failed to extract text from page {}: {}", page_num, e),
        }

        if opts.include_images && images.len() < opts.max_images {
            for img in page_images(&doc, page_num, page_id) {
                if images.len() >= opts.max_images {
                    debug!("Image limit {} reached", opts.max_images);
                    break;
                }
                images.push(img);
            }
        }
    }

    Ok(DocumentContent {
        text,
        images,
        page_count: Some(pages.len()),
    })
}

fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    doc.dereference(obj).ok().map(|(_, o)| o)
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|o| deref(doc, o))
}

fn page_images(doc: &Document, page_num: u32, page_id: ObjectId) -> Vec<EmbeddedImage> {
    let xobjects = doc
        .get_object(page_id)
        .ok()
        .and_then(|o| o.as_dict().ok())
        .and_then(|page| dict_entry(doc, page, b"Resources"))
        .and_then(|o| o.as_dict().ok())
        .and_then(|res| dict_entry(doc, res, b"XObject"))
        .and_then(|o| o.as_dict().ok());

    let Some(xobjects) = xobjects else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(name, obj)| {
            let stream = deref(doc, obj)?.as_stream().ok()?;
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .is_ok_and(|s| s == b"Image");
            if !is_image {
                return None;
            }
            let img = decode_image_stream(doc, page_num, stream);
            if img.is_none() {
                debug!(
                    "Page {}: skipping unsupported image /{}",
                    page_num,
                    String::from_utf8_lossy(name)
                );
            }
            img
        })
        .collect()
}

fn filter_names(doc: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict_entry(doc, dict, b"Filter") {
        Some(Object::Name(n)) => vec![n.clone()],
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_image_stream(doc: &Document, page: u32, stream: &lopdf::Stream) -> Option<EmbeddedImage> {
    let dict = &stream.dict;
    let filters = filter_names(doc, dict);

    if matches!(filters.as_slice(), [f] if f.as_slice() == b"DCTDecode") {
        return Some(EmbeddedImage::Jpeg {
            page,
            data: stream.content.clone(),
        });
    }

    let pixels = match filters.as_slice() {
        [] => stream.content.clone(),
        [f] if f.as_slice() == b"FlateDecode" => stream.decompressed_content().ok()?,
        _ => return None,
    };

    let width = u32::try_from(dict_entry(doc, dict, b"Width")?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict_entry(doc, dict, b"Height")?.as_i64().ok()?).ok()?;
    let bpc = dict_entry(doc, dict, b"BitsPerComponent")?.as_i64().ok()?;
    if bpc != 8 {
        return None;
    }

    let colour = dict_entry(doc, dict, b"ColorSpace")?.as_name().ok()?;
    let image = match colour {
        b"DeviceRGB" => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, pixels)?),
        b"DeviceGray" => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, pixels)?),
        _ => return None,
    };
    Some(EmbeddedImage::Raster { page, image })
}

// ── DOCX ─────────────────────────────────────────────────────────────────

fn extract_docx(path: &Path) -> Result<String, McqError> {
    let failed = |detail: String| McqError::ExtractionFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = std::fs::File::open(path).map_err(|e| failed(e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(std::io::BufReader::new(file)).map_err(|e| failed(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| failed(format!("Cannot find word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| failed(e.to_string()))?;

    docx_paragraphs(&xml)
        .map(|paras| paras.join("\n"))
        .map_err(failed)
}

/// Paragraph texts of a WordprocessingML body, in document order.
pub(crate) fn docx_paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

// ── TXT ──────────────────────────────────────────────────────────────────

fn extract_txt(path: &Path) -> Result<String, McqError> {
    let bytes = std::fs::read(path).map_err(|e| McqError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                "{} is not valid UTF-8; invalid bytes replaced",
                path.display()
            );
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
