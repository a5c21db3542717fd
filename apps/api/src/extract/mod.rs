//! Document ingestion — byte-to-text conversion for uploaded CVs.
//!
//! Supported inputs: plain text, PDF (`pdf-extract`), and Word documents
//! (`docx-rs`). Dispatch is by declared MIME type, then file extension,
//! then magic-byte sniffing for unlabeled uploads. Unsupported or unreadable
//! documents degrade to empty text plus a user-visible warning; progression
//! is blocked later, at rating time, when the CV text turns out empty.

use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};
use tracing::warn;

const MIME_TEXT: &str = "text/plain";
const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extraction result: normalized text plus any warnings worth showing the
/// operator. `text` is empty when nothing could be extracted.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub text: String,
    pub warnings: Vec<String>,
}

impl ExtractedDocument {
    fn failed(warning: String) -> Self {
        warn!("document extraction failed: {warning}");
        Self {
            text: String::new(),
            warnings: vec![warning],
        }
    }
}

/// Extracts plain text from an uploaded document.
pub fn extract_text(
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> ExtractedDocument {
    if data.is_empty() {
        return ExtractedDocument::failed("The uploaded file is empty.".to_string());
    }

    let kind = detect_kind(filename, content_type, data);
    let result = match kind {
        Some(DocumentKind::Text) => Ok(decode_text(data)),
        Some(DocumentKind::Pdf) => extract_pdf(data),
        Some(DocumentKind::Docx) => extract_docx(data),
        None => {
            return ExtractedDocument::failed(
                "No text extracted: unsupported document type. Upload a .txt, .pdf, or .docx file."
                    .to_string(),
            )
        }
    };

    match result {
        Ok(text) => {
            let text = normalize_text(&text);
            let mut warnings = Vec::new();
            if text.is_empty() {
                warnings.push(
                    "No text extracted: the document appears to contain no readable text."
                        .to_string(),
                );
            }
            ExtractedDocument { text, warnings }
        }
        Err(message) => ExtractedDocument::failed(message),
    }
}

enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

fn detect_kind(
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Option<DocumentKind> {
    // drop any parameters ("text/plain; charset=utf-8") before matching
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some(MIME_TEXT) => return Some(DocumentKind::Text),
        Some(MIME_PDF) => return Some(DocumentKind::Pdf),
        Some(MIME_DOCX) => return Some(DocumentKind::Docx),
        _ => {}
    }

    let extension = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") => return Some(DocumentKind::Text),
        Some("pdf") => return Some(DocumentKind::Pdf),
        Some("docx") => return Some(DocumentKind::Docx),
        _ => {}
    }

    // magic-byte sniffing for unlabeled uploads
    if data.starts_with(b"%PDF-") {
        return Some(DocumentKind::Pdf);
    }
    if data.starts_with(b"PK") {
        return Some(DocumentKind::Docx);
    }
    if std::str::from_utf8(data).is_ok() {
        return Some(DocumentKind::Text);
    }
    None
}

fn decode_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn extract_pdf(data: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| format!("No text extracted: the PDF could not be read ({e})."))
}

fn extract_docx(data: &[u8]) -> Result<String, String> {
    let package =
        read_docx(data).map_err(|e| format!("No text extracted: the Word document could not be read ({e})."))?;
    let mut lines = Vec::new();
    for child in &package.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            if let Some(text) = paragraph_text(paragraph) {
                lines.push(text);
            }
        }
    }
    Ok(lines.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> Option<String> {
    let mut buffer = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text) = run_child {
                    buffer.push_str(&text.text);
                }
            }
        }
    }
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strips NUL bytes and a leading BOM, normalizes newlines, trims trailing
/// whitespace per line.
fn normalize_text(text: &str) -> String {
    let text = text.replace('\u{0000}', "");
    let text = text.trim_start_matches('\u{FEFF}');
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}
