//! The `RagSystem` orchestrator: chunk, index, embed, query

use crate::{
    chunk::{ChunkerConfig, PageChunker, PersistedChunk},
    embed::{embed_chunks, BatchConfig, Embedder},
    retrieve::{RetrievedChunk, Retriever},
    Error, PageText, Result,
};
use serde::{Deserialize, Serialize};

/// Typical number of chunks retrieved per query
pub const DEFAULT_TOP_K: usize = 5;

/// `RagSystem` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSystemConfig {
    /// Chunking parameters
    pub chunker: ChunkerConfig,
    /// Embedding batch parameters
    pub batch: BatchConfig,
    /// Whether to embed chunks on `initialize` and queries; when `false`
    /// the embedding provider is never touched and all retrieval is
    /// keyword based
    pub use_embeddings: bool,
}

impl Default for RagSystemConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            batch: BatchConfig::default(),
            use_embeddings: true,
        }
    }
}

/// A data point traced back to the verbatim chunk it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMatch {
    /// Verbatim chunk text the data point was derived from
    pub text: String,
    /// 1-based page the text appears on
    pub page_number: u32,
}

/// Read-only diagnostic snapshot of an initialized system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of chunks held
    pub total_chunks: usize,
    /// Number of chunks carrying an embedding
    pub chunks_with_embeddings: usize,
    /// Number of distinct pages with at least one chunk
    pub pages_indexed: usize,
    /// Mean chunk text length in characters
    pub average_chunk_length: f32,
}

/// Orchestrates chunking, indexing, embedding, and retrieval for one
/// document.
///
/// Lifecycle: constructed empty, populated exactly once by
/// [`RagSystem::initialize`] (or built directly from persisted records by
/// [`RagSystem::from_persisted_chunks`]), then read-only. All query
/// methods take `&self`, so an initialized system can serve concurrent
/// callers without locking.
pub struct RagSystem<E: Embedder> {
    embedder: E,
    config: RagSystemConfig,
    retriever: Option<Retriever>,
}

impl<E: Embedder> RagSystem<E> {
    /// Create an uninitialized system around an embedding provider
    #[must_use]
    pub fn new(embedder: E, config: RagSystemConfig) -> Self {
        Self {
            embedder,
            config,
            retriever: None,
        }
    }

    /// Rebuild a system directly from previously persisted chunk records,
    /// bypassing the chunker and the embedding provider.
    ///
    /// Records missing `chunk_index`, `start_index`, or `end_index`
    /// default to the record's list position, `0`, and the text length.
    /// An empty list is rejected; a list in which no record carries an
    /// embedding is accepted with a warning and falls back to keyword
    /// search transparently. Queries behave identically to a freshly
    /// initialized instance over the same chunks.
    pub fn from_persisted_chunks(
        records: Vec<PersistedChunk>,
        embedder: E,
        config: RagSystemConfig,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyChunkSet);
        }

        let mut chunks = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            chunks.push(record.into_chunk(position)?);
        }

        if !chunks.iter().any(crate::chunk::Chunk::has_embedding) {
            log::warn!(
                "no persisted chunk carries an embedding, queries will use keyword search"
            );
        }

        Ok(Self {
            embedder,
            config,
            retriever: Some(Retriever::new(chunks)),
        })
    }

    /// Whether `initialize` (or a rebuild) has completed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.retriever.is_some()
    }

    /// Chunk the pages, build the lexical index, and (when enabled) embed
    /// the chunks in batches.
    ///
    /// Must be called at most once; a second call fails with
    /// [`Error::AlreadyInitialized`] and leaves the existing state
    /// untouched. A failed call leaves the system uninitialized.
    pub fn initialize(&mut self, pages: &[PageText]) -> Result<()> {
        if self.retriever.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let chunker = PageChunker::with_config(self.config.chunker.clone());
        let mut chunks = chunker.chunk_pages(pages)?;

        if self.config.use_embeddings {
            let embedded = embed_chunks(&mut chunks, &self.embedder, &self.config.batch);
            log::debug!("embedded {embedded} of {} chunks", chunks.len());
        }

        self.retriever = Some(Retriever::new(chunks));
        Ok(())
    }

    fn retriever(&self) -> Result<&Retriever> {
        self.retriever.as_ref().ok_or(Error::NotInitialized)
    }

    /// Retrieve the top-K most relevant chunks for a natural-language
    /// query ([`DEFAULT_TOP_K`] is the customary `top_k`).
    ///
    /// An empty result is not an error; callers should treat it as "no
    /// relevant text found".
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let retriever = self.retriever()?;
        if self.config.use_embeddings {
            retriever.retrieve(&self.embedder, query, top_k)
        } else {
            Ok(retriever.retrieve_lexical(query, top_k))
        }
    }

    /// Retrieve up to `max_chunks` chunks and format them as a block
    /// ready for prompt injection: each chunk prefixed with its 1-based
    /// rank and page number, blocks separated by blank lines.
    pub fn build_context(&self, query: &str, max_chunks: usize) -> Result<String> {
        let results = self.retrieve(query, max_chunks)?;
        Ok(results
            .iter()
            .enumerate()
            .map(|(rank, r)| format!("[{}] (Page {})\n{}", rank + 1, r.page_number, r.text))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Trace an extracted data point back to the single best-matching
    /// chunk and its page, using `context` (if any) to sharpen the query.
    ///
    /// Returns `None` when no chunk qualifies; callers must treat that as
    /// "no citation available", not a failure.
    pub fn find_source(&self, data_point: &str, context: &str) -> Result<Option<SourceMatch>> {
        let query = if context.is_empty() {
            data_point.to_string()
        } else {
            format!("{data_point} {context}")
        };

        let mut results = self.retrieve(&query, 1)?;
        Ok(results.pop().map(|r| SourceMatch {
            text: r.text,
            page_number: r.page_number,
        }))
    }

    /// Read-only diagnostic snapshot
    pub fn stats(&self) -> Result<IndexStats> {
        let retriever = self.retriever()?;
        let chunks = retriever.chunks();
        let total_chunks = chunks.len();
        let average_chunk_length = if total_chunks == 0 {
            0.0
        } else {
            chunks.iter().map(crate::chunk::Chunk::char_len).sum::<usize>() as f32
                / total_chunks as f32
        };

        Ok(IndexStats {
            total_chunks,
            chunks_with_embeddings: retriever.embedded_count(),
            pages_indexed: retriever.index().pages(),
            average_chunk_length,
        })
    }

    /// Export the chunk set as persistable records, the inverse of
    /// [`RagSystem::from_persisted_chunks`]. The core performs no I/O;
    /// storing the records is the caller's concern.
    pub fn export_chunks(&self) -> Result<Vec<PersistedChunk>> {
        Ok(self
            .retriever()?
            .chunks()
            .iter()
            .map(PersistedChunk::from)
            .collect())
    }

    /// The injected embedding provider
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// The system configuration
    #[must_use]
    pub fn config(&self) -> &RagSystemConfig {
        &self.config
    }
}
