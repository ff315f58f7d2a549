use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use cvsift_core::{BackendError, PdfBackend, join_pages};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// that the rest of the workspace does not transitively depend on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        if !path.is_file() {
            return Err(BackendError::Open(format!(
                "no such file: {}",
                path.display()
            )));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;

        // The document is closed when it drops, including on early returns below.
        let document = Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut pages_text = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::Extraction(e.to_string()))?
            .enumerate()
        {
            let page = page_result
                .map_err(|e| BackendError::Extraction(format!("page {}: {}", index + 1, e)))?;
            let text = page_text(&page)
                .map_err(|e| BackendError::Extraction(format!("page {}: {}", index + 1, e)))?;
            tracing::trace!(page = index + 1, chars = text.len(), "rendered page");
            pages_text.push(text);
        }

        tracing::debug!(
            path = %path.display(),
            pages = pages_text.len(),
            "extracted PDF text"
        );
        Ok(join_pages(pages_text))
    }
}

/// Render one page to plain text, one output line per layout line, with no
/// trailing newline.
fn page_text(page: &Page) -> Result<String, mupdf::Error> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;

    // Block/line iteration keeps reading order close to pdfplumber-style output
    let mut lines = Vec::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            lines.push(line_text);
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MupdfBackend::new()
            .extract_text(&dir.path().join("resume.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Open(_)), "{err}");
    }

    #[test]
    fn directory_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MupdfBackend::new().extract_text(dir.path()).unwrap_err();
        assert!(matches!(err, BackendError::Open(_)), "{err}");
    }

    /// Write a minimal Helvetica PDF, one page per entry, one text line per
    /// string.
    fn write_pdf(path: &Path, pages: &[&[&str]]) {
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                (0..pages.len())
                    .map(|i| format!("{} 0 R", 4 + 2 * i))
                    .collect::<Vec<_>>()
                    .join(" "),
                pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        for (i, lines) in pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            let stream: String = lines
                .iter()
                .enumerate()
                .map(|(j, line)| {
                    format!("BT /F1 12 Tf 72 {} Td ({line}) Tj ET\n", 720 - 24 * j)
                })
                .collect();
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}endstream",
                stream.len()
            ));
        }

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%EOF\n",
            objects.len() + 1
        ));
        std::fs::write(path, pdf).unwrap();
    }

    #[test]
    fn pages_joined_with_single_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        write_pdf(
            &path,
            &[&["Jane Roe", "Engineer"], &["Skills", "Rust"], &["RustConf"]],
        );

        let text = MupdfBackend::new().extract_text(&path).unwrap();
        assert_eq!(text, "Jane Roe\nEngineer\nSkills\nRust\nRustConf");
    }

    #[test]
    fn blank_page_contributes_empty_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        write_pdf(&path, &[&["Jane Roe"], &[], &["Rust"]]);

        let text = MupdfBackend::new().extract_text(&path).unwrap();
        assert_eq!(text, "Jane Roe\n\nRust");
    }
}
