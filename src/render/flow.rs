//! Flowing-text PDF layout on top of `lopdf`.
//!
//! [`FlowDocument`] is a small page-layout engine: callers push styled
//! paragraphs and vertical gaps, and the engine owns everything positional.
//! It wraps each paragraph to the text width, starts a new page when a line
//! would cross the bottom margin, centres lines when asked, and assembles
//! the page tree, fonts and info dictionary.
//!
//! Text is set in the standard Type1 Helvetica faces with
//! `WinAnsiEncoding`, so nothing is embedded. Characters outside WinAnsi
//! are replaced by [`PLACEHOLDER`] and counted; see
//! [`FlowDocument::replaced_chars`].
//!
//! Wrapping breaks at spaces and drops the run of spaces it breaks on.
//! Spaces inside a line are kept as written. A word wider than the text
//! width is split by character.

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 56.0;
pub const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Line height as a multiple of the font size.
const LEADING: f32 = 1.3;

/// Substituted for characters the fonts cannot show.
pub const PLACEHOLDER: u8 = b'?';

/// The two faces the engine sets text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

impl Weight {
    /// Font resource name used in content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Weight::Regular => "F1",
            Weight::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Weight::Regular => "Helvetica",
            Weight::Bold => "Helvetica-Bold",
        }
    }

    /// Advance width of a WinAnsi byte, in 1/1000 em.
    fn width(self, byte: u8) -> u16 {
        let table = match self {
            Weight::Regular => &HELVETICA_WIDTHS,
            Weight::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => 556,
        }
    }

    fn text_width(self, bytes: &[u8], size: f32) -> f32 {
        bytes.iter().map(|&b| self.width(b) as f32).sum::<f32>() * size / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// How one paragraph is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub weight: Weight,
    pub size: f32,
    pub rgb: [u8; 3],
    pub align: Align,
}

impl Style {
    pub const fn regular(size: f32) -> Self {
        Self {
            weight: Weight::Regular,
            size,
            rgb: [0, 0, 0],
            align: Align::Left,
        }
    }

    pub const fn bold(self) -> Self {
        Self {
            weight: Weight::Bold,
            ..self
        }
    }

    pub const fn coloured(self, rgb: [u8; 3]) -> Self {
        Self { rgb, ..self }
    }

    pub const fn centred(self) -> Self {
        Self {
            align: Align::Center,
            ..self
        }
    }
}

/// A document being laid out, one paragraph at a time.
#[derive(Debug)]
pub struct FlowDocument {
    pages: Vec<Vec<Operation>>,
    y: f32,
    replaced: usize,
}

impl Default for FlowDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowDocument {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
            replaced: 0,
        }
    }

    /// Set `text` as one paragraph, continuing on new pages as needed.
    pub fn paragraph(&mut self, text: &str, style: Style) {
        let encoded = self.encode(text);
        let line_height = style.size * LEADING;
        for line in wrap(&encoded, style.weight, style.size, TEXT_WIDTH) {
            if self.y - line_height < MARGIN {
                self.pages.push(Vec::new());
                self.y = PAGE_HEIGHT - MARGIN;
            }
            self.y -= line_height;
            let x = match style.align {
                Align::Left => MARGIN,
                Align::Center => {
                    MARGIN + (TEXT_WIDTH - style.weight.text_width(&line, style.size)) / 2.0
                }
            };
            let ops = show_line(line, &style, x, self.y);
            if let Some(page) = self.pages.last_mut() {
                page.extend(ops);
            }
        }
    }

    /// Vertical gap below the last paragraph. Never carries over a page break.
    pub fn gap(&mut self, points: f32) {
        self.y = (self.y - points).max(MARGIN);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Characters replaced by [`PLACEHOLDER`] so far.
    pub fn replaced_chars(&self) -> usize {
        self.replaced
    }

    /// Serialise the pages into a complete PDF file.
    pub fn finish(self, title: &str, created: NaiveDateTime) -> Result<Vec<u8>, String> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let fonts = [Weight::Regular, Weight::Bold].map(|weight| {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => weight.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            (weight.resource_name(), id)
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                fonts[0].0 => fonts[0].1,
                fonts[1].0 => fonts[1].1,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| format!("content stream encoding failed: {e}"))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH as i64),
                    Object::Integer(PAGE_HEIGHT as i64),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let producer = concat!("edgequake-mcq ", env!("CARGO_PKG_VERSION"));
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal(producer),
            "CreationDate" => Object::string_literal(
                created.format("D:%Y%m%d%H%M%S").to_string()
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| format!("serialisation failed: {e}"))?;
        Ok(buf)
    }

    /// Lossy UTF-8 → WinAnsi.
    fn encode(&mut self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| {
                winansi_byte(c).unwrap_or_else(|| {
                    self.replaced += 1;
                    PLACEHOLDER
                })
            })
            .collect()
    }
}

/// Greedy wrap at spaces; words wider than a line are split by character.
fn wrap(text: &[u8], weight: Weight, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let width = |bytes: &[u8]| weight.text_width(bytes, size);
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut spaces: &[u8] = &[];

    for run in text.chunk_by(|a, b| (*a == b' ') == (*b == b' ')) {
        if run[0] == b' ' {
            spaces = run;
            continue;
        }
        // Spaces a break lands on are dropped; leading spaces of the paragraph are kept.
        let gap = if current.is_empty() && !lines.is_empty() {
            &[][..]
        } else {
            spaces
        };
        spaces = &[];

        if width(&current) + width(gap) + width(run) <= max_width {
            current.extend_from_slice(gap);
            current.extend_from_slice(run);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for &b in run {
            if !current.is_empty() && width(&current) + width(&[b]) > max_width {
                lines.push(std::mem::take(&mut current));
            }
            current.push(b);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn show_line(line: Vec<u8>, style: &Style, x: f32, y: f32) -> Vec<Operation> {
    let [r, g, b] = style.rgb;
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![style.weight.resource_name().into(), style.size.into()],
        ),
        Operation::new(
            "rg",
            vec![
                (r as f32 / 255.0).into(),
                (g as f32 / 255.0).into(),
                (b as f32 / 255.0).into(),
            ],
        ),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(line)]),
        Operation::new("ET", vec![]),
    ]
}

fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\t' => b' ',
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

// Standard 14 font metrics for ASCII 32..=126 (Adobe AFM).
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
