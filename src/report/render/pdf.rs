//! Self-contained PDF output built with `lopdf`.
//!
//! Uses the base-14 Helvetica faces with WinAnsi encoding. Text outside
//! that code page (Hangul, CJK, most symbols) fails the render with
//! `RenderError::UnsupportedText`; the remote backend handles full Unicode.

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::{DocumentRenderer, PageGeometry, RenderError};
use crate::report::types::ReportRecord;

const BODY_SIZE: f32 = 10.5;
const HEADING_SIZE: f32 = 13.0;
const TITLE_SIZE: f32 = 18.0;
const LINE_SPACING: f32 = 1.45;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(&self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    face: Face,
    size: f32,
}

#[derive(Debug, Clone)]
pub struct NativePdfRenderer {
    geometry: PageGeometry,
}

impl NativePdfRenderer {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    fn layout(&self, report: &ReportRecord) -> Vec<Line> {
        let width = self.geometry.content_width();
        let mut lines = Vec::new();
        let info = &report.info;
        let result = &report.result;

        push_wrapped(&mut lines, &info.report, Face::Bold, TITLE_SIZE, width);
        blank(&mut lines);

        for (label, value) in [
            ("Applicant", &info.name),
            ("Organization", &info.company),
            ("Filing date", &info.register_date),
            ("Report date", &info.now_date),
            ("Registration", &info.registration),
        ] {
            if !value.is_empty() {
                push_wrapped(&mut lines, &format!("{}: {}", label, value), Face::Regular, BODY_SIZE, width);
            }
        }

        heading(&mut lines, "Summary");
        push_paragraphs(&mut lines, &info.summary, width);

        heading(&mut lines, "Cited prior art");
        if result.other_patents.is_empty() {
            push_wrapped(&mut lines, "No prior-art records were retrieved.", Face::Regular, BODY_SIZE, width);
        }
        for (i, entry) in result.other_patents.iter().enumerate() {
            let mut text = format!("{}. [{}]", i + 1, entry.index);
            if !entry.registration.is_empty() {
                text.push_str(&format!(" {}", entry.registration));
            }
            if !entry.name.is_empty() {
                text.push_str(&format!(" - {}", entry.name));
            }
            if let Some(similarity) = &entry.similarity {
                text.push_str(&format!(" (similarity {})", similarity));
            }
            push_wrapped(&mut lines, &text, Face::Regular, BODY_SIZE, width);
        }

        heading(&mut lines, "Opinion");
        push_paragraphs(&mut lines, &result.opinion, width);

        if let Some(probability) = &result.probability {
            heading(&mut lines, "Registration probability");
            push_wrapped(&mut lines, probability, Face::Regular, BODY_SIZE, width);
        }

        lines
    }

    /// Splits laid-out lines into per-page content operations.
    fn paginate(&self, lines: &[Line]) -> Result<Vec<Vec<Operation>>, RenderError> {
        let top = self.geometry.height - self.geometry.margin;
        let bottom = self.geometry.margin;
        let left = self.geometry.margin;

        let mut pages = Vec::new();
        let mut ops = Vec::new();
        let mut y = top;

        for line in lines {
            let advance = line.size * LINE_SPACING;
            if y - advance < bottom && !ops.is_empty() {
                pages.push(std::mem::take(&mut ops));
                y = top;
            }
            y -= advance;
            if line.text.is_empty() {
                continue;
            }
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![line.face.resource().into(), line.size.into()],
            ));
            ops.push(Operation::new("Td", vec![left.into(), y.into()]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text)?)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
        if !ops.is_empty() || pages.is_empty() {
            pages.push(ops);
        }
        Ok(pages)
    }

    fn build(&self, report: &ReportRecord) -> Result<Vec<u8>, RenderError> {
        let pages = self.paginate(&self.layout(report))?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let encoded = content.encode().map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.0f32.into(),
            0.0f32.into(),
            self.geometry.width.into(),
            self.geometry.height.into(),
        ];
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

#[async_trait]
impl DocumentRenderer for NativePdfRenderer {
    fn name(&self) -> &str {
        "native"
    }

    async fn render(&self, report: &ReportRecord) -> Result<Vec<u8>, RenderError> {
        let renderer = self.clone();
        let report = report.clone();
        tokio::task::spawn_blocking(move || renderer.build(&report))
            .await
            .map_err(|e| RenderError::Pdf(e.to_string()))?
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn blank(lines: &mut Vec<Line>) {
    lines.push(Line {
        text: String::new(),
        face: Face::Regular,
        size: BODY_SIZE,
    });
}

fn heading(lines: &mut Vec<Line>, text: &str) {
    blank(lines);
    lines.push(Line {
        text: text.to_string(),
        face: Face::Bold,
        size: HEADING_SIZE,
    });
}

fn push_paragraphs(lines: &mut Vec<Line>, text: &str, width: f32) {
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            blank(lines);
        } else {
            push_wrapped(lines, paragraph, Face::Regular, BODY_SIZE, width);
        }
    }
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, face: Face, size: f32, width: f32) {
    let max_chars = ((width / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    for wrapped in wrap_text(text, max_chars) {
        lines.push(Line {
            text: wrapped,
            face,
            size,
        });
    }
}

/// Greedy word wrap; words longer than a line are hard-split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            out.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        out.push(current);
    }
    out
}

fn encode_win_ansi(text: &str) -> Result<Vec<u8>, RenderError> {
    text.chars()
        .map(|c| win_ansi_byte(c).ok_or_else(|| RenderError::unsupported(c)))
        .collect()
}

/// WinAnsiEncoding (CP1252) byte for `c`, if it has one.
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(byte)
}
