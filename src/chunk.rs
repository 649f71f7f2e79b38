//! Page-aware chunking with sentence-boundary snapping and overlap

use crate::{Error, PageText, Result};
use serde::{Deserialize, Serialize};

/// Unique chunk identifier, derived deterministically from the chunk's
/// global index and source page (`chunk_<n>_page_<p>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(String);

impl ChunkId {
    /// Derive the id for a chunk from its global index and page number
    #[must_use]
    pub fn derive(chunk_index: usize, page_number: u32) -> Self {
        Self(format!("chunk_{chunk_index}_page_{page_number}"))
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded, page-attributed slice of document text, the unit of retrieval.
///
/// `start_index`/`end_index` are character offsets into the original page
/// text (end exclusive), taken before whitespace trimming, so a caller can
/// always recover the chunk's exact position in the source page. A chunk
/// is immutable after creation except for [`Chunk::set_embedding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic chunk identifier
    pub id: ChunkId,
    /// Trimmed chunk text, exactly as it appeared in the source page
    pub text: String,
    /// 1-based page of origin
    pub page_number: u32,
    /// Character offset of the chunk start in the original page text
    pub start_index: usize,
    /// Character offset of the chunk end (exclusive) in the original page text
    pub end_index: usize,
    /// Global creation order across all pages, strictly increasing
    pub chunk_index: usize,
    /// Embedding vector (populated after the embedding step)
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub fn new(
        chunk_index: usize,
        page_number: u32,
        text: String,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            id: ChunkId::derive(chunk_index, page_number),
            text,
            page_number,
            start_index,
            end_index,
            chunk_index,
            embedding: None,
        }
    }

    /// Length of the chunk text in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the embedding step has populated this chunk
    #[must_use]
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    /// Set the embedding vector
    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
    }
}

/// Persisted chunk record, the only storage layout the core cares about.
///
/// `text` and `page_number` are structurally required; the remaining
/// fields default on rebuild to the record's list position, `0`, the text
/// character length, and no embedding, respectively. Field names are
/// camelCase on the wire to match the records the web application stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedChunk {
    /// Chunk text
    pub text: String,
    /// 1-based page of origin
    pub page_number: u32,
    /// Global creation order (defaults to list position)
    pub chunk_index: Option<usize>,
    /// Start offset in the page text (defaults to 0)
    pub start_index: Option<usize>,
    /// End offset in the page text (defaults to the text length)
    pub end_index: Option<usize>,
    /// Embedding vector, if one was persisted
    pub embedding: Option<Vec<f32>>,
}

impl PersistedChunk {
    /// Rebuild a [`Chunk`] from this record.
    ///
    /// `position` is the record's index in the persisted list; it supplies
    /// the default `chunk_index` and is reported in validation errors.
    pub fn into_chunk(self, position: usize) -> Result<Chunk> {
        if self.text.trim().is_empty() {
            return Err(Error::MalformedRecord {
                position,
                reason: "empty text".to_string(),
            });
        }
        if self.page_number == 0 {
            return Err(Error::MalformedRecord {
                position,
                reason: "page number must be at least 1".to_string(),
            });
        }

        let char_len = self.text.chars().count();
        let chunk_index = self.chunk_index.unwrap_or(position);
        let start_index = self.start_index.unwrap_or(0);
        let end_index = self.end_index.unwrap_or(start_index + char_len);

        if start_index >= end_index {
            return Err(Error::MalformedRecord {
                position,
                reason: format!("start index {start_index} not before end index {end_index}"),
            });
        }

        let mut chunk = Chunk::new(
            chunk_index,
            self.page_number,
            self.text,
            start_index,
            end_index,
        );
        if let Some(embedding) = self.embedding {
            chunk.set_embedding(embedding);
        }
        Ok(chunk)
    }
}

impl From<&Chunk> for PersistedChunk {
    fn from(chunk: &Chunk) -> Self {
        Self {
            text: chunk.text.clone(),
            page_number: chunk.page_number,
            chunk_index: Some(chunk.chunk_index),
            start_index: Some(chunk.start_index),
            end_index: Some(chunk.end_index),
            embedding: chunk.embedding.clone(),
        }
    }
}

/// Chunker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters; must be
    /// strictly less than `chunk_size`
    pub overlap: usize,
    /// Candidate chunks whose trimmed length does not exceed this are
    /// discarded without consuming an id or index
    pub min_chunk_len: usize,
    /// How far back from a tentative cut to look for a sentence terminator
    pub boundary_window: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 150,
            min_chunk_len: 50,
            boundary_window: 100,
        }
    }
}

impl ChunkerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be non-zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({}) must be less than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits per-page text into overlapping, sentence-aligned chunks.
///
/// Pages are chunked independently but chunk numbering is global and
/// continues across pages. All offsets are character offsets, so the
/// chunker is safe on any UTF-8 input.
#[derive(Debug, Clone)]
pub struct PageChunker {
    config: ChunkerConfig,
}

impl PageChunker {
    /// Create a chunker with the given size and overlap, other settings defaulted
    #[must_use]
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            config: ChunkerConfig {
                chunk_size,
                overlap,
                ..ChunkerConfig::default()
            },
        }
    }

    /// Create a chunker from a full configuration
    #[must_use]
    pub fn with_config(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// The chunker's configuration
    #[must_use]
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk an ordered list of pages into a single globally-indexed chunk list
    pub fn chunk_pages(&self, pages: &[PageText]) -> Result<Vec<Chunk>> {
        self.config.validate()?;

        let mut chunks = Vec::new();
        let mut next_index = 0usize;
        for page in pages {
            self.chunk_page(page, &mut next_index, &mut chunks);
        }
        Ok(chunks)
    }

    fn chunk_page(&self, page: &PageText, next_index: &mut usize, out: &mut Vec<Chunk>) {
        let chars: Vec<char> = page.text.chars().collect();
        let len = chars.len();
        if len == 0 {
            return;
        }

        let ChunkerConfig {
            chunk_size,
            overlap,
            min_chunk_len,
            ..
        } = self.config;

        let mut start = 0usize;
        loop {
            let tentative = (start + chunk_size).min(len);
            let end = if tentative < len {
                self.snap_to_sentence(&chars, start, tentative)
            } else {
                tentative
            };

            let raw: String = chars[start..end].iter().collect();
            let trimmed = raw.trim();
            if trimmed.chars().count() > min_chunk_len {
                out.push(Chunk::new(
                    *next_index,
                    page.page_number,
                    trimmed.to_string(),
                    start,
                    end,
                ));
                *next_index += 1;
            }

            let mut next_start = end.saturating_sub(overlap);
            if next_start <= start && end < len {
                // Snap collapsed the step; fall back to the un-snapped stride
                // so the walk always makes progress.
                next_start = start + (chunk_size - overlap);
            }
            // A start inside the final overlap region would only produce a
            // tail duplicating the previous chunk; stop here instead.
            if next_start >= len.saturating_sub(overlap) {
                break;
            }
            start = next_start;
        }
    }

    /// Search the boundary window before a tentative cut for the last
    /// sentence terminator and snap the cut to just after it. Falls back
    /// to the hard cut when the window holds no terminator.
    fn snap_to_sentence(&self, chars: &[char], start: usize, tentative: usize) -> usize {
        let window_start = tentative.saturating_sub(self.config.boundary_window).max(start);
        for i in (window_start..tentative).rev() {
            if matches!(chars[i], '.' | '?' | '!') {
                return i + 1;
            }
        }
        tentative
    }
}

impl Default for PageChunker {
    fn default() -> Self {
        Self::with_config(ChunkerConfig::default())
    }
}
