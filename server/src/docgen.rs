//! Assemble a `.docx` document from generated plain text.
//!
//! Each line of the body becomes a paragraph; a line starting with a
//! heading marker (`#`) becomes a Heading 1 paragraph with the marker
//! stripped; the title is emitted first as a Title paragraph.

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Classification of one body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocLine<'a> {
    Empty,
    Heading(&'a str),
    Body(&'a str),
}

pub fn classify_lines(corpo: &str) -> Vec<DocLine<'_>> {
    corpo
        .split('\n')
        .map(|line| {
            let txt = line.trim();
            if txt.is_empty() {
                DocLine::Empty
            } else if txt.starts_with('#') {
                DocLine::Heading(txt.trim_start_matches('#').trim_start())
            } else {
                DocLine::Body(txt)
            }
        })
        .collect()
}

/// Render the document to `.docx` bytes.
pub fn render_docx(titulo: &str, corpo: &str) -> anyhow::Result<Vec<u8>> {
    let mut docx = Docx::new()
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(56)
                .bold(),
        )
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_paragraph(
            Paragraph::new()
                .style("Title")
                .add_run(Run::new().add_text(titulo)),
        );

    for line in classify_lines(corpo) {
        docx = docx.add_paragraph(match line {
            DocLine::Empty => Paragraph::new(),
            DocLine::Heading(text) => Paragraph::new()
                .style("Heading1")
                .add_run(Run::new().add_text(text)),
            DocLine::Body(text) => Paragraph::new().add_run(Run::new().add_text(text)),
        });
    }

    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| anyhow::anyhow!("failed to pack docx: {e}"))?;
    Ok(cursor.into_inner())
}

// Same characters `encodeURIComponent` leaves unescaped.
const FILENAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// URL-escape the title for the attachment filename.
pub fn encode_filename(titulo: &str) -> String {
    utf8_percent_encode(titulo, FILENAME_SET).to_string()
}
