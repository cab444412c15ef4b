//! Fixed-width slicing of review corpora
//!
//! Slices are cut every `chunk_size` characters with no regard for sentence
//! boundaries. Sizes count Unicode scalar values, so CJK review text is cut
//! at the same visible length as Latin text.

use crate::analysis::types::{ReviewCorpus, Sentiment, TextChunk};

/// Split `text` into consecutive slices of at most `chunk_size` characters
///
/// Concatenating the result reproduces `text` exactly. Empty text yields no
/// slices.
pub fn split_fixed(text: &str, chunk_size: usize) -> Vec<&str> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            slices.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    slices.push(&text[start..]);
    slices
}

/// Chunk one corpus, keeping at most `max_chunks` slices
pub fn chunk_text(
    text: &str,
    sentiment: Sentiment,
    chunk_size: usize,
    max_chunks: usize,
) -> Vec<TextChunk> {
    let slices: Vec<&str> = split_fixed(text, chunk_size)
        .into_iter()
        .take(max_chunks)
        .collect();
    let total = slices.len();

    slices
        .into_iter()
        .enumerate()
        .map(|(index, slice)| TextChunk {
            sentiment,
            index,
            total,
            text: slice.to_string(),
        })
        .collect()
}

/// Chunk both classes: positive chunks first, then negative
///
/// An empty result means there is no work to do.
pub fn chunk_corpus(corpus: &ReviewCorpus, chunk_size: usize, max_chunks: usize) -> Vec<TextChunk> {
    Sentiment::ALL
        .iter()
        .flat_map(|&sentiment| {
            chunk_text(&corpus.joined(sentiment), sentiment, chunk_size, max_chunks)
        })
        .collect()
}
