//! Fixed-size sliding-window text chunking

use ragserve_core::{Error, Result};

/// Split text into overlapping windows of at most `max_chars` characters.
///
/// Consecutive whitespace is collapsed to single spaces before splitting,
/// so chunk boundaries are stable regardless of the input's formatting.
/// Each window after the first starts `overlap` characters before the end
/// of the previous one. `overlap >= max_chars` would keep the start from
/// ever advancing, so it is rejected up front instead of looping.
///
/// Empty input yields an empty vector; no produced chunk is ever empty.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Result<Vec<String>> {
    if max_chars == 0 {
        return Err(Error::InvalidInput(
            "chunk size must be at least 1 character".to_string(),
        ));
    }
    if overlap >= max_chars {
        return Err(Error::InvalidInput(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({max_chars})"
        )));
    }

    let normalized: Vec<char> = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < normalized.len() {
        let end = (start + max_chars).min(normalized.len());
        chunks.push(normalized[start..end].iter().collect());
        if end == normalized.len() {
            break;
        }
        start = end - overlap;
    }

    Ok(chunks)
}
