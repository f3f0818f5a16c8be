//! Document reader traits and registry for format dispatch.
//!
//! Readers turn source bytes into raw text; everything downstream
//! (normalization, chunking, embedding) is format-agnostic. The registry
//! picks the first reader whose `supports` matches the hint, with the
//! passthrough reader as the final fallback.

mod markdown;
mod passthrough;
#[cfg(feature = "pdf_extract")]
mod pdf;

pub use markdown::MarkdownReader;
pub use passthrough::PassthroughReader;
#[cfg(feature = "pdf_extract")]
pub use pdf::PdfReader;

use crate::error::Result;

/// Soft classification of source formats used for reader dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Markdown,
    PlainText,
    Unknown,
}

impl DocumentFormat {
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "md" | "markdown" => Self::Markdown,
            "txt" | "text" => Self::PlainText,
            _ => Self::Unknown,
        }
    }
}

/// Hint provided to readers before extraction.
#[derive(Debug, Clone, Copy)]
pub struct ReaderHint<'a> {
    pub format: DocumentFormat,
    pub magic_bytes: Option<&'a [u8]>,
}

impl<'a> ReaderHint<'a> {
    #[must_use]
    pub fn new(format: DocumentFormat, magic_bytes: Option<&'a [u8]>) -> Self {
        Self {
            format,
            magic_bytes,
        }
    }
}

/// Trait implemented by readers that can extract raw text from a format.
pub trait DocumentReader: Send + Sync {
    /// Name used in diagnostics and extraction errors.
    fn name(&self) -> &'static str;

    /// Return true if this reader is a good match for the hint.
    fn supports(&self, hint: &ReaderHint<'_>) -> bool;

    /// Extract raw text from the source bytes.
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Ordered reader registry; first match wins.
pub struct ReaderRegistry {
    readers: Vec<Box<dyn DocumentReader>>,
}

impl ReaderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    pub fn register<R>(&mut self, reader: R)
    where
        R: DocumentReader + 'static,
    {
        self.readers.push(Box::new(reader));
    }

    #[must_use]
    pub fn find_reader<'a>(&'a self, hint: &ReaderHint<'_>) -> Option<&'a dyn DocumentReader> {
        self.readers
            .iter()
            .map(std::convert::AsRef::as_ref)
            .find(|reader| reader.supports(hint))
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "pdf_extract")]
        registry.register(PdfReader);
        registry.register(MarkdownReader::new());
        registry.register(PassthroughReader);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_routes_markdown_before_passthrough() {
        let registry = ReaderRegistry::default();
        let hint = ReaderHint::new(DocumentFormat::Markdown, None);
        let reader = registry.find_reader(&hint).expect("reader");
        assert_eq!(reader.name(), "markdown");
    }

    #[test]
    fn unknown_format_falls_back_to_passthrough() {
        let registry = ReaderRegistry::default();
        let hint = ReaderHint::new(DocumentFormat::Unknown, None);
        let reader = registry.find_reader(&hint).expect("reader");
        assert_eq!(reader.name(), "passthrough");
    }

    #[cfg(feature = "pdf_extract")]
    #[test]
    fn pdf_magic_routes_to_pdf_reader() {
        let registry = ReaderRegistry::default();
        let hint = ReaderHint::new(DocumentFormat::Unknown, Some(b"%PDF-1.7"));
        let reader = registry.find_reader(&hint).expect("reader");
        assert_eq!(reader.name(), "pdf");
    }
}
