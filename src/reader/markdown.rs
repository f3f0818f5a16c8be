//! Markdown reader: strips markup so only prose reaches the chunker.

use std::path::PathBuf;

use regex::Regex;

use crate::error::{Result, VaultError};
use crate::reader::{DocumentFormat, DocumentReader, ReaderHint};

pub struct MarkdownReader {
    code_fence: Regex,
    inline_code: Regex,
    image: Regex,
    link: Regex,
    heading: Regex,
    emphasis: Regex,
    list_marker: Regex,
}

impl MarkdownReader {
    /// The patterns are infallible literals; construction cannot fail at
    /// runtime for any input document.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            code_fence: Regex::new(r"(?s)```.*?```").expect("static regex"),
            inline_code: Regex::new(r"`([^`]*)`").expect("static regex"),
            image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("static regex"),
            link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("static regex"),
            heading: Regex::new(r"(?m)^#{1,6}\s+").expect("static regex"),
            emphasis: Regex::new(r"[*_]{1,3}([^*_]+)[*_]{1,3}").expect("static regex"),
            list_marker: Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("static regex"),
        }
    }
}

impl Default for MarkdownReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentReader for MarkdownReader {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn supports(&self, hint: &ReaderHint<'_>) -> bool {
        hint.format == DocumentFormat::Markdown
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let raw = String::from_utf8(bytes.to_vec()).map_err(|err| VaultError::ExtractionFailed {
            path: PathBuf::new(),
            reason: format!("markdown source is not valid UTF-8: {err}"),
        })?;

        let text = self.code_fence.replace_all(&raw, " ");
        let text = self.image.replace_all(&text, " ");
        let text = self.link.replace_all(&text, "$1");
        let text = self.inline_code.replace_all(&text, "$1");
        let text = self.heading.replace_all(&text, "");
        let text = self.emphasis.replace_all(&text, "$1");
        let text = self.list_marker.replace_all(&text, "");
        Ok(text.into_owned())
    }
}
