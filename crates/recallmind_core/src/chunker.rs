//! crates/recallmind_core/src/chunker.rs
//!
//! Splits raw document text into overlapping fixed-size windows for the
//! vector store. Windows are measured in characters, not bytes, so slicing
//! never lands inside a UTF-8 sequence.

/// Error returned for an unusable chunking configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("Chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Splits `text` into windows of at most `chunk_size` characters, each
/// sharing `chunk_overlap` characters with its predecessor.
///
/// Every character of the input appears in at least one chunk. Text no
/// longer than `chunk_size` yields a single chunk; empty text yields none.
/// An overlap that is not strictly smaller than the chunk size would never
/// advance the window, so it is rejected up front.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<String>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    if chunk_overlap >= chunk_size {
        return Err(ChunkError::OverlapTooLarge {
            size: chunk_size,
            overlap: chunk_overlap,
        });
    }

    // Byte offset of every character boundary, plus the end of the text.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total_chars {
        let end = usize::min(start + chunk_size, total_chars);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == total_chars {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_yields_one_chunk() {
        let chunks = split_text("hello", 100, 20).unwrap();
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = split_text("", 100, 20).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let err = split_text("abc", 10, 10).unwrap_err();
        assert_eq!(
            err,
            ChunkError::OverlapTooLarge {
                size: 10,
                overlap: 10
            }
        );
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert_eq!(split_text("abc", 0, 0).unwrap_err(), ChunkError::ZeroChunkSize);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap() {
        let text = "abcdefghij";
        let chunks = split_text(text, 4, 2).unwrap();
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn every_character_is_covered() {
        let texts = [
            "the quick brown fox jumps over the lazy dog",
            "a",
            "日本語のテキストもちゃんと分割できるはずです。",
            "mixed ascii と multibyte content ❤ here",
        ];
        for text in texts {
            for (size, overlap) in [(5, 0), (5, 2), (7, 3), (100, 10), (1, 0)] {
                let chunks = split_text(text, size, overlap).unwrap();
                // With zero overlap the chunks must reassemble exactly.
                if overlap == 0 {
                    assert_eq!(chunks.concat(), text);
                }
                // First chunk starts at the start, last chunk ends at the end,
                // and each step advances by at most size - overlap characters.
                assert!(text.starts_with(chunks.first().map(String::as_str).unwrap_or("")));
                assert!(text.ends_with(chunks.last().map(String::as_str).unwrap_or("")));
                let covered: usize = chunks.iter().map(|c| c.chars().count()).sum();
                assert!(covered >= text.chars().count());
            }
        }
    }

    #[test]
    fn window_never_exceeds_chunk_size() {
        let chunks = split_text("abcdefghijklmnop", 6, 3).unwrap();
        assert!(chunks.iter().all(|c| c.chars().count() <= 6));
    }
}
