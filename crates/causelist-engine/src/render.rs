//! PDF rendering of a cause list.
//!
//! Pages are A4 portrait with a ruled five-column table; the header row is
//! repeated on every page. Content streams are left uncompressed.

use causelist_common::protocol::{CaseRecord, DocumentMetadata};
use chrono::{Local, NaiveDateTime};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::config::OutputConfig;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 40;
const ROW_HEIGHT: i64 = 16;
const CELL_PADDING: i64 = 3;
const TEXT_SIZE: i64 = 8;
const TITLE_SIZE: i64 = 14;
const META_SIZE: i64 = 10;

const COLUMNS: [(&str, i64); 5] = [
    ("Sr. No.", 45),
    ("Case No.", 110),
    ("Petitioner", 135),
    ("Respondent", 135),
    ("Purpose", 90),
];

const NO_DATA: &str = "No case data found.";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct DocumentRenderer {
    output_dir: PathBuf,
    prefix: String,
}

impl DocumentRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.dir.clone(), config.prefix.clone())
    }

    /// `<prefix>_<state>_<district>_<YYYYMMDD_HHMMSS>.pdf`
    pub fn file_name(&self, metadata: &DocumentMetadata, timestamp: NaiveDateTime) -> String {
        format!(
            "{}_{}_{}_{}.pdf",
            self.prefix,
            path_component(&metadata.state, "XX"),
            path_component(&metadata.district, "YY"),
            timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    pub async fn render(
        &self,
        records: &[CaseRecord],
        metadata: &DocumentMetadata,
    ) -> Result<PathBuf, RenderError> {
        self.render_at(records, metadata, Local::now().naive_local())
            .await
    }

    /// Render with an explicit timestamp; returns the absolute path written.
    pub async fn render_at(
        &self,
        records: &[CaseRecord],
        metadata: &DocumentMetadata,
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf, RenderError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| RenderError::CreateDir {
                path: self.output_dir.clone(),
                source,
            })?;
        let dir = tokio::fs::canonicalize(&self.output_dir)
            .await
            .map_err(|source| RenderError::CreateDir {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = dir.join(self.file_name(metadata, timestamp));
        let bytes = build_pdf(records, metadata)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| RenderError::Write {
                path: path.clone(),
                source,
            })?;

        info!(
            "Rendered {} record(s) to {}",
            records.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Codes end up in a file name; anything but ASCII alphanumerics and '-' is replaced.
fn path_component(code: &str, empty: &str) -> String {
    let cleaned: String = code
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        empty.to_string()
    } else {
        cleaned
    }
}

pub fn build_pdf(
    records: &[CaseRecord],
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::new();
    for content in layout_pages(records, metadata) {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn layout_pages(records: &[CaseRecord], metadata: &DocumentMetadata) -> Vec<Content> {
    let mut page = PageBuilder::default();
    let mut top = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
    page.text(
        "F2",
        TITLE_SIZE,
        MARGIN,
        top,
        &format!("Cause List - {}", metadata.list_type),
    );
    top -= 24;
    page.text(
        "F1",
        META_SIZE,
        MARGIN,
        top,
        &format!(
            "State: {}    District: {}    Date: {}",
            metadata.state, metadata.district, metadata.date
        ),
    );
    top -= 20;

    if records.is_empty() {
        page.text("F1", META_SIZE, MARGIN, top - META_SIZE, NO_DATA);
        return vec![page.finish()];
    }

    let mut pages = Vec::new();
    let mut remaining = records;
    loop {
        let capacity = (((top - MARGIN) / ROW_HEIGHT) - 1).max(1) as usize;
        let take = capacity.min(remaining.len());
        let (chunk, rest) = remaining.split_at(take);
        page.table(top, chunk);
        pages.push(page.finish());

        remaining = rest;
        if remaining.is_empty() {
            break;
        }
        page = PageBuilder::default();
        top = PAGE_HEIGHT - MARGIN;
    }
    pages
}

#[derive(Default)]
struct PageBuilder {
    operations: Vec<Operation>,
}

impl PageBuilder {
    fn text(&mut self, font: &str, size: i64, x: i64, y: i64, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
            ),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn line(&mut self, from: (i64, i64), to: (i64, i64)) {
        self.operations.extend([
            Operation::new("m", vec![Object::Integer(from.0), Object::Integer(from.1)]),
            Operation::new("l", vec![Object::Integer(to.0), Object::Integer(to.1)]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Header row plus `records`, ruled, starting at `top`.
    fn table(&mut self, top: i64, records: &[CaseRecord]) {
        let rows = records.len() as i64 + 1;
        let bottom = top - rows * ROW_HEIGHT;
        let right = MARGIN + COLUMNS.iter().map(|(_, w)| w).sum::<i64>();

        for row in 0..=rows {
            let y = top - row * ROW_HEIGHT;
            self.line((MARGIN, y), (right, y));
        }
        let mut x = MARGIN;
        self.line((x, top), (x, bottom));
        for (_, width) in COLUMNS {
            x += width;
            self.line((x, top), (x, bottom));
        }

        let baseline = |row: i64| top - row * ROW_HEIGHT - (ROW_HEIGHT + TEXT_SIZE) / 2 + 1;
        let mut x = MARGIN;
        for (title, width) in COLUMNS {
            self.text("F2", TEXT_SIZE, x + CELL_PADDING, baseline(0), title);
            x += width;
        }

        for (index, record) in records.iter().enumerate() {
            let row = index as i64 + 1;
            let mut x = MARGIN;
            for ((_, width), cell) in COLUMNS.iter().zip(record.cells()) {
                self.text(
                    "F1",
                    TEXT_SIZE,
                    x + CELL_PADDING,
                    baseline(row),
                    &fit(cell, *width),
                );
                x += width;
            }
        }
    }

    fn finish(self) -> Content {
        Content {
            operations: self.operations,
        }
    }
}

/// Cut `text` so it fits a column of `width` points at the table font size.
fn fit(text: &str, width: i64) -> String {
    // Helvetica averages a little over half an em per glyph.
    let max_chars = (((width - 2 * CELL_PADDING) * 10) / (TEXT_SIZE * 55 / 10)).max(4) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}

/// WinAnsi bytes; characters the encoding cannot show become '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u8,
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
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}
