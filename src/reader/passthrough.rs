//! Fallback reader for plain text sources.

use std::path::PathBuf;

use crate::error::{Result, VaultError};
use crate::reader::{DocumentReader, ReaderHint};

/// Treats the source bytes as UTF-8 text. Registered last, so it also
/// catches unknown formats.
pub struct PassthroughReader;

impl DocumentReader for PassthroughReader {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn supports(&self, _hint: &ReaderHint<'_>) -> bool {
        true
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|err| VaultError::ExtractionFailed {
            path: PathBuf::new(),
            reason: format!("source is not valid UTF-8: {err}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DocumentFormat;

    #[test]
    fn passes_utf8_through_unchanged() {
        let text = PassthroughReader
            .extract("plain text content".as_bytes())
            .expect("extract");
        assert_eq!(text, "plain text content");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = PassthroughReader
            .extract(&[0xFF, 0xFE, 0x00])
            .expect_err("bad bytes");
        assert!(matches!(err, VaultError::ExtractionFailed { .. }));
    }

    #[test]
    fn supports_everything() {
        assert!(PassthroughReader.supports(&ReaderHint::new(DocumentFormat::Unknown, None)));
    }
}
