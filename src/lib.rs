//! Lease-RAG: page-aware retrieval core for lease documents
//!
//! This crate turns the extracted text of a parsed PDF into overlapping,
//! sentence-aligned chunks tagged with their page of origin, embeds them
//! through an injected [`Embedder`], and answers top-K queries by cosine
//! similarity with a keyword fallback when embeddings are unavailable.
//! Retrieved chunks carry exact page numbers and character offsets so
//! downstream language-model callers can cite verbatim source text.
//!
//! # Quick Start
//!
//! ```rust
//! use lease_rag::{
//!     embed::MockEmbedder,
//!     pipeline::{RagSystem, RagSystemConfig},
//!     PageText,
//! };
//!
//! let pages = vec![PageText::new(
//!     1,
//!     "The tenant shall pay a security deposit of $1,500 to the landlord \
//!      upon execution of this lease. The deposit is refundable within 30 \
//!      days of the termination date, less any deductions for damages.",
//! )];
//!
//! let mut system = RagSystem::new(MockEmbedder::new(64), RagSystemConfig::default());
//! system.initialize(&pages).unwrap();
//!
//! let results = system.retrieve("security deposit", 3).unwrap();
//! assert!(!results.is_empty());
//! assert_eq!(results[0].page_number, 1);
//!
//! let context = system.build_context("security deposit", 3).unwrap();
//! assert!(context.contains("(Page 1)"));
//! ```
//!
//! # Retrieval modes
//!
//! - **Semantic**: query embedded via the [`Embedder`], chunks ranked by
//!   [`cosine_similarity`](embed::cosine_similarity).
//! - **Lexical fallback**: chunks ranked by the number of distinct query
//!   keywords they share with the [`ChunkIndex`](index::ChunkIndex); used
//!   whenever the chunk set carries no embeddings.
//!
//! # Source attribution
//!
//! [`RagSystem::find_source`](pipeline::RagSystem::find_source) maps an
//! arbitrary extracted fact back to the single best-matching chunk and its
//! page, or `None` when no chunk qualifies:
//!
//! ```rust
//! use lease_rag::{embed::MockEmbedder, pipeline::{RagSystem, RagSystemConfig}, PageText};
//!
//! let pages = vec![PageText::new(
//!     2,
//!     "Monthly rent in the amount of $1,500 is due on the first day of \
//!      each calendar month and payable to the property manager.",
//! )];
//! let mut system = RagSystem::new(MockEmbedder::new(64), RagSystemConfig::default());
//! system.initialize(&pages).unwrap();
//!
//! let source = system.find_source("monthly rent $1,500", "").unwrap();
//! assert_eq!(source.map(|s| s.page_number), Some(2));
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::map_unwrap_or)]

pub mod chunk;
pub mod embed;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod retrieve;

pub use chunk::{Chunk, ChunkId, ChunkerConfig, PageChunker, PersistedChunk};
pub use embed::{cosine_similarity, BatchConfig, Embedder, MockEmbedder};
pub use error::{Error, Result};
pub use index::ChunkIndex;
pub use pipeline::{IndexStats, RagSystem, RagSystemConfig, SourceMatch};
pub use retrieve::{RetrievedChunk, Retriever};

/// One page of extracted document text, in reading order.
///
/// Produced by an external PDF parser; this crate makes no assumption
/// about the document format beyond "text already extracted, ordered by
/// page". Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PageText {
    /// 1-based physical page number
    pub page_number: u32,
    /// Extracted text of the page
    pub text: String,
}

impl PageText {
    /// Create a new page from its number and extracted text
    #[must_use]
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Length of the page text in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_creation() {
        let page = PageText::new(3, "Lease agreement text");
        assert_eq!(page.page_number, 3);
        assert_eq!(page.text, "Lease agreement text");
    }

    #[test]
    fn test_page_text_char_len() {
        let page = PageText::new(1, "héllo");
        assert_eq!(page.char_len(), 5);
        assert_ne!(page.char_len(), page.text.len());
    }

    #[test]
    fn test_page_text_serialization() {
        let page = PageText::new(7, "Page seven content");
        let json = serde_json::to_string(&page).unwrap();
        let deserialized: PageText = serde_json::from_str(&json).unwrap();
        assert_eq!(page, deserialized);
    }
}
