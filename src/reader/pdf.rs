//! PDF reader backed by pure-Rust text extraction.

use std::path::PathBuf;

use crate::error::{Result, VaultError};
use crate::reader::{DocumentFormat, DocumentReader, ReaderHint};

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supports(&self, hint: &ReaderHint<'_>) -> bool {
        hint.format == DocumentFormat::Pdf
            || hint
                .magic_bytes
                .is_some_and(|magic| magic.starts_with(PDF_MAGIC))
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|err| VaultError::ExtractionFailed {
            path: PathBuf::new(),
            reason: format!("pdf text extraction failed: {err}"),
        })
    }
}
