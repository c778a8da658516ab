//! PDF writer — serialises a `PaginatedDocument` with `lopdf`.
//!
//! Only the standard Type1 Helvetica faces are referenced, so no font data is
//! embedded. Strings are encoded as WinAnsi; characters outside it become `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use super::font_metrics::FontStyle;
use super::layout::{DrawOp, Page, PageGeometry, PaginatedDocument};
use super::RenderError;

const PDF_VERSION: &str = "1.5";

/// Encodes the document to PDF bytes.
pub fn write_pdf(document: &PaginatedDocument) -> Result<Vec<u8>, RenderError> {
    let geometry = document.geometry;
    let mut pdf = Document::with_version(PDF_VERSION);
    let pages_id = pdf.new_object_id();

    let mut fonts = Dictionary::new();
    for style in FontStyle::ALL {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(style.resource_name(), font_id);
    }
    let resources_id = pdf.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = page_content(page, geometry);
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = pdf.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.width),
                Object::Real(geometry.height),
            ],
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

/// Translates one page of draw ops into content-stream operations, flipping
/// `y` into PDF's bottom-left coordinate space.
fn page_content(page: &Page, geometry: PageGeometry) -> Content {
    let mut operations = Vec::with_capacity(page.ops.len() * 5);

    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, font, size, text } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), Object::Real(*size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(*x), Object::Real(geometry.height - y)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule { x1, x2, y, width } => {
                let pdf_y = geometry.height - y;
                operations.push(Operation::new("w", vec![Object::Real(*width)]));
                operations.push(Operation::new("m", vec![Object::Real(*x1), Object::Real(pdf_y)]));
                operations.push(Operation::new("l", vec![Object::Real(*x2), Object::Real(pdf_y)]));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }

    Content { operations }
}

/// Maps text to WinAnsiEncoding (CP1252) bytes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
