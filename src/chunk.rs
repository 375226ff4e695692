//! Overlapping text splitter.
//!
//! Splits document bodies into fixed-size character windows with a
//! configurable overlap between adjacent windows. Window edges prefer
//! paragraph breaks (`\n\n`), then line breaks, then spaces, so chunks keep
//! some semantic coherence; a window with no such boundary is cut at the
//! size limit. Splitting is deterministic given its inputs, and every chunk
//! inherits the parent document's metadata.

use crate::models::Document;

/// Split every document into overlapping chunks, preserving metadata.
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Document> {
    documents
        .iter()
        .flat_map(|doc| {
            split_text(&doc.content, chunk_size, chunk_overlap)
                .into_iter()
                .map(|text| Document {
                    content: text,
                    metadata: doc.metadata.clone(),
                })
        })
        .collect()
}

/// Split text into windows of at most `chunk_size` characters, with adjacent
/// windows overlapping by roughly `chunk_overlap` characters. Blank input
/// yields no chunks.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    debug_assert!(chunk_size > 0);
    debug_assert!(chunk_overlap < chunk_size);

    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let mut hard_end = floor_char_boundary(text, start + chunk_size);
        if hard_end <= start {
            // A single multi-byte character wider than the window; take it whole.
            hard_end = ceil_char_boundary(text, start + 1);
        }

        if hard_end >= text.len() {
            push_trimmed(&mut chunks, &text[start..]);
            break;
        }

        let window = &text[start..hard_end];
        let end = split_point(window)
            .map(|rel| start + rel)
            .unwrap_or(hard_end);

        push_trimmed(&mut chunks, &text[start..end]);

        let mut next_start = floor_char_boundary(text, end.saturating_sub(chunk_overlap));
        if next_start <= start {
            next_start = end;
        }
        start = next_start;
    }

    chunks
}

/// Preferred cut position within a full window: just after the last paragraph
/// break, else the last line break, else the last space.
fn split_point(window: &str) -> Option<usize> {
    window
        .rfind("\n\n")
        .map(|pos| pos + 2)
        .or_else(|| window.rfind('\n').map(|pos| pos + 1))
        .or_else(|| window.rfind(' ').map(|pos| pos + 1))
        .filter(|&pos| pos > 0 && pos < window.len())
}

fn push_trimmed(chunks: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index.min(s.len())
}
