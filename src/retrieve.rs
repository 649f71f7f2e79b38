//! Top-K retrieval over chunks: cosine search with keyword fallback

use crate::{
    chunk::Chunk,
    embed::{cosine_similarity, Embedder},
    index::ChunkIndex,
    Result,
};
use serde::{Deserialize, Serialize};

/// Public view of a retrieved chunk.
///
/// Exposes everything a caller needs for prompt construction and
/// citation: the verbatim text, the source page, and the chunk's global
/// index and character offsets. The embedding vector is deliberately
/// omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Verbatim chunk text
    pub text: String,
    /// 1-based page of origin
    pub page_number: u32,
    /// Global chunk index
    pub chunk_index: usize,
    /// Start character offset in the source page
    pub start_index: usize,
    /// End character offset (exclusive) in the source page
    pub end_index: usize,
    /// Ranking score: cosine similarity in semantic mode, distinct
    /// keyword match count in lexical mode
    pub score: f32,
}

/// Holds a chunk set with its derived [`ChunkIndex`] and answers top-K
/// queries: by cosine similarity when embeddings are present, by keyword
/// overlap otherwise.
///
/// All query methods take `&self` over immutable data, so one retriever
/// may serve many concurrent callers once built.
#[derive(Debug, Clone)]
pub struct Retriever {
    chunks: Vec<Chunk>,
    index: ChunkIndex,
}

impl Retriever {
    /// Build a retriever over a chunk list, deriving the lexical index
    #[must_use]
    pub fn new(chunks: Vec<Chunk>) -> Self {
        let index = ChunkIndex::build(&chunks);
        Self { chunks, index }
    }

    /// The underlying chunks, in global order
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The derived lexical index
    #[must_use]
    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Number of chunks held
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the retriever holds no chunks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether the chunk set is embedded, judged from the first chunk as
    /// a representative sample. Chunks that individually lack an
    /// embedding (a failed batch) are simply skipped during scoring.
    #[must_use]
    pub fn has_embeddings(&self) -> bool {
        self.chunks.first().is_some_and(Chunk::has_embedding)
    }

    /// Number of chunks that actually carry an embedding
    #[must_use]
    pub fn embedded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.has_embedding()).count()
    }

    /// Retrieve the top-K most relevant chunks for a query.
    ///
    /// Embeds the query and ranks by cosine similarity when the chunk set
    /// is embedded; otherwise falls back to keyword search. The result
    /// may be shorter than `top_k` and is never padded.
    pub fn retrieve<E: Embedder + ?Sized>(
        &self,
        embedder: &E,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if self.has_embeddings() {
            let query_embedding = embedder.embed_query(query)?;
            Ok(self.retrieve_semantic(&query_embedding, top_k))
        } else {
            log::debug!("chunk set has no embeddings, using keyword search");
            Ok(self.retrieve_lexical(query, top_k))
        }
    }

    /// Rank every embedded chunk by cosine similarity to a query vector,
    /// descending, and return the first `top_k`
    #[must_use]
    pub fn retrieve_semantic(&self, query_embedding: &[f32], top_k: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(position, chunk)| {
                chunk
                    .embedding
                    .as_ref()
                    .map(|embedding| (position, cosine_similarity(query_embedding, embedding)))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(position, score)| self.view(position, score))
            .collect()
    }

    /// Rank chunks by distinct query keyword overlap (see
    /// [`ChunkIndex::search_by_keywords`])
    #[must_use]
    pub fn retrieve_lexical(&self, query: &str, top_k: usize) -> Vec<RetrievedChunk> {
        self.index
            .search_by_keywords(query, top_k)
            .into_iter()
            .map(|(position, matches)| self.view(position, matches as f32))
            .collect()
    }

    fn view(&self, position: usize, score: f32) -> RetrievedChunk {
        let chunk = &self.chunks[position];
        RetrievedChunk {
            text: chunk.text.clone(),
            page_number: chunk.page_number,
            chunk_index: chunk.chunk_index,
            start_index: chunk.start_index,
            end_index: chunk.end_index,
            score,
        }
    }
}
