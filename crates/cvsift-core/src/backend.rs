use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors render each page to plain text; field extraction lives in
/// `cvsift_extract::EntityExtractor`.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text of a PDF: pages in order, newline-separated,
    /// trimmed (see [`join_pages`]).
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// Concatenate per-page text with a newline after each page and trim the
/// result.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text.trim().to_string()
}
