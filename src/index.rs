//! Lexical indexing: page map and keyword inverted index over chunks

use crate::chunk::Chunk;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Tokens at or below this character count are too generic to index
const KEYWORD_MIN_CHARS: usize = 3;

/// Lowercase a text into the keyword tokens the index stores: whitespace
/// split, surrounding punctuation stripped, short tokens dropped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| token.chars().count() > KEYWORD_MIN_CHARS)
}

/// Derived, rebuildable index over a chunk list.
///
/// Holds two auxiliary maps: `page_map` groups chunk positions by page in
/// original order, and `keyword_index` maps each qualifying lowercase
/// token to the positions of the chunks containing it (set semantics, one
/// entry per chunk regardless of occurrence count). Positions refer into
/// the chunk list the index was built from; the index has no lifecycle of
/// its own and is rebuilt whenever the chunk set changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkIndex {
    page_map: BTreeMap<u32, Vec<usize>>,
    keyword_index: HashMap<String, Vec<usize>>,
}

impl ChunkIndex {
    /// Build the index over a chunk list
    #[must_use]
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut page_map: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut keyword_index: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, chunk) in chunks.iter().enumerate() {
            page_map.entry(chunk.page_number).or_default().push(position);

            for token in tokenize(&chunk.text) {
                let bucket = keyword_index.entry(token).or_default();
                // Positions arrive in ascending order, so dedup is a
                // last-entry check rather than a set lookup.
                if bucket.last() != Some(&position) {
                    bucket.push(position);
                }
            }
        }

        Self {
            page_map,
            keyword_index,
        }
    }

    /// Number of distinct pages with at least one chunk
    #[must_use]
    pub fn pages(&self) -> usize {
        self.page_map.len()
    }

    /// Number of distinct keywords indexed
    #[must_use]
    pub fn keywords(&self) -> usize {
        self.keyword_index.len()
    }

    /// Chunk positions for a page, in original order
    #[must_use]
    pub fn chunks_on_page(&self, page_number: u32) -> &[usize] {
        self.page_map
            .get(&page_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterator over the indexed page numbers, ascending
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.page_map.keys().copied()
    }

    /// Rank chunks by how many distinct query keywords they contain.
    ///
    /// Returns `(chunk position, distinct matching keyword count)` pairs,
    /// descending by count with ties broken by original chunk order.
    /// Chunks matching no keyword are excluded, so the result may be
    /// shorter than `top_k`.
    #[must_use]
    pub fn search_by_keywords(&self, query: &str, top_k: usize) -> Vec<(usize, usize)> {
        let query_tokens: HashSet<String> = tokenize(query).collect();
        if query_tokens.is_empty() {
            return Vec::new();
        }

        // BTreeMap keys keep candidates in original chunk order, which a
        // stable sort then preserves among equal counts.
        let mut match_counts: BTreeMap<usize, usize> = BTreeMap::new();
        for token in &query_tokens {
            if let Some(bucket) = self.keyword_index.get(token) {
                for &position in bucket {
                    *match_counts.entry(position).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = match_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(top_k);
        ranked
    }
}
