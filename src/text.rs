//! Text normalization applied before chunking.

use unicode_normalization::UnicodeNormalization;

/// Normalize extracted text: NFC composition, then whitespace runs collapsed
/// to single spaces with blank-line paragraph breaks preserved. Chunking and
/// content hashing both run over this form, so the same document extracted
/// twice hashes identically regardless of incidental whitespace.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfc().collect();
    let mut out = String::with_capacity(composed.len());

    for (i, paragraph) in composed
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .enumerate()
    {
        if i > 0 {
            out.push_str("\n\n");
        }
        let mut first = true;
        for word in paragraph.split_whitespace() {
            if !first {
                out.push(' ');
            }
            out.push_str(word);
            first = false;
        }
    }
    out
}
