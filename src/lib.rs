#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(clippy::uninlined_format_args, clippy::float_cmp)
)]
#![allow(clippy::module_name_repetitions)]
//
// Strategic lint exceptions - these are allowed project-wide for pragmatic reasons:
//
// Documentation lints: Many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: Positions and counts are bounded by in-memory vector sizes,
// so the u64/usize casts here cannot truncate in practice.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
//
// Style/complexity: Some store operations naturally require longer functions.
#![allow(clippy::too_many_lines)]
#![allow(clippy::similar_names)]

/// The chunkvault crate version (matches `Cargo.toml`).
pub const CHUNKVAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ask;
pub mod chunker;
pub mod constants;
pub mod error;
pub mod extract;
pub mod index;
pub mod reader;
mod store;
pub mod text;
pub mod types;
pub mod vault;

pub use ask::{AnswerGenerator, AskCitation, AskRequest, AskResponse};
pub use chunker::{ChunkConfig, chunk};
pub use error::{Result, VaultError};
pub use extract::{DocumentProcessor, ExtractedDocument, ProcessorConfig};
pub use index::FlatVecIndex;
pub use reader::{
    DocumentFormat, DocumentReader, MarkdownReader, PassthroughReader, ReaderHint, ReaderRegistry,
};
#[cfg(feature = "pdf_extract")]
pub use reader::PdfReader;
pub use text::normalize_text;
pub use types::{
    Chunk, ChunkId, Document, DocumentId, EmbeddingProvider, HashEmbedder, SearchHit, Stats,
};
pub use vault::{ChunkVault, LivenessMap, PositionState};
