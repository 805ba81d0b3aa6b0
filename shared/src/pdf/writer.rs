//! Minimal PDF 1.4 serialization of a laid-out document
//!
//! Only the two base-14 Helvetica faces are used, so no font data is
//! embedded. Text is written as hex strings in WinAnsi encoding.

use super::layout::{DrawOp, Font, Page, PlanDocument, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use std::fmt::Write;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// WinAnsi byte for a character; unmappable characters become '?'
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '•' => 0x95,
        '—' => 0x97,
        '–' => 0x96,
        '“' => 0x93,
        '”' => 0x94,
        '‘' => 0x91,
        '’' => 0x92,
        '…' => 0x85,
        '€' => 0x80,
        _ => b'?',
    }
}

fn hex_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2 + 2);
    out.push('<');
    for c in text.chars() {
        let _ = write!(out, "{:02X}", win_ansi(c));
    }
    out.push('>');
    out
}

fn color(rgb: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        f64::from(rgb.0) / 255.0,
        f64::from(rgb.1) / 255.0,
        f64::from(rgb.2) / 255.0
    )
}

/// Content stream for one page, flipping y into PDF space
fn content_stream(page: &Page) -> String {
    let mut out = String::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color: rgb,
                text,
            } => {
                let face = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                let _ = writeln!(
                    out,
                    "BT /{} {:.2} Tf {} rg {:.2} {:.2} Td {} Tj ET",
                    face,
                    size,
                    color(*rgb),
                    x,
                    PAGE_HEIGHT - y,
                    hex_string(text)
                );
            }
            DrawOp::Rule {
                x1,
                y1,
                x2,
                y2,
                width,
                color: rgb,
            } => {
                let _ = writeln!(
                    out,
                    "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
                    color(*rgb),
                    width,
                    x1,
                    PAGE_HEIGHT - y1,
                    x2,
                    PAGE_HEIGHT - y2
                );
            }
            DrawOp::Bar {
                x,
                y,
                width,
                height,
                color: rgb,
            } => {
                let _ = writeln!(
                    out,
                    "{} rg {:.2} {:.2} {:.2} {:.2} re f",
                    color(*rgb),
                    x,
                    PAGE_HEIGHT - y - height,
                    width,
                    height
                );
            }
        }
    }
    out
}

struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append object `id`; objects must be written in id order
    fn object(&mut self, id: usize, body: &[u8]) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", count);
        for offset in &self.offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            count, CATALOG_ID, xref_offset
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

impl PlanDocument {
    /// Serialize to PDF bytes
    pub fn to_pdf_bytes(&self) -> Vec<u8> {
        let page_ids: Vec<usize> = (0..self.pages.len())
            .map(|i| FIRST_PAGE_ID + i * 2)
            .collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut writer = ObjectWriter::new();
        writer.object(
            CATALOG_ID,
            format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).as_bytes(),
        );
        writer.object(
            PAGES_ID,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).as_bytes(),
        );
        writer.object(
            REGULAR_FONT_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        writer.object(
            BOLD_FONT_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );

        for (page, id) in self.pages.iter().zip(&page_ids) {
            let content_id = id + 1;
            writer.object(
                *id,
                format!(
                    "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> /Contents {} 0 R >>",
                    PAGES_ID, PAGE_WIDTH, PAGE_HEIGHT, REGULAR_FONT_ID, BOLD_FONT_ID, content_id
                )
                .as_bytes(),
            );

            let stream = content_stream(page);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(stream.as_bytes());
            body.extend_from_slice(b"endstream");
            writer.object(content_id, &body);
        }

        writer.finish()
    }
}
