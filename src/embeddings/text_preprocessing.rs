//! Text preprocessing utilities for embedding generation
//!
//! Provides utilities for cleaning, normalizing, and chunking text before embedding generation.

use tracing::debug;
use tracing::warn;

use crate::errors::HealthRagError;

/// Longest text, in characters, sent to an embedding model
pub const MAX_EMBEDDING_CHARS: usize = 2000;

/// Preprocess text for embedding generation
///
/// This function handles:
/// - Normalizing whitespace and newlines
/// - Removing or replacing invalid characters
/// - Truncating long texts at a word boundary
pub fn preprocess_text_for_embedding(text: &str) -> Result<String, HealthRagError> {
    if text.is_empty() {
        return Err(HealthRagError::EmbeddingError(
            "Empty text provided".to_string(),
        ));
    }

    // Step 1: Normalize whitespace and newlines
    let normalized = normalize_whitespace(text);

    // Step 2: Remove invalid characters
    let sanitized = sanitize_text(&normalized);

    // Step 3: Final validation
    if sanitized.trim().is_empty() {
        return Err(HealthRagError::EmbeddingError(
            "Text contains only whitespace after preprocessing".to_string(),
        ));
    }

    // Step 4: Handle long text
    let char_count = sanitized.chars().count();
    if char_count > MAX_EMBEDDING_CHARS {
        warn!(
            "Text too long ({} chars), truncating to {}",
            char_count, MAX_EMBEDDING_CHARS
        );
        return Ok(smart_truncate_text(&sanitized, MAX_EMBEDDING_CHARS));
    }

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Ok(sanitized)
}

/// Normalize whitespace and newlines
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Sanitize text by replacing control characters
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Truncate at a word boundary, counting characters rather than bytes
fn smart_truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    if let Some(last_space) = truncated.rfind(' ') {
        // Only use word boundary if it's not too far back
        if truncated[..last_space].chars().count() > max_chars * 3 / 4 {
            return truncated[..last_space].to_string();
        }
    }

    truncated
}

/// Split a document into chunks of at most `max_chunk_chars` characters.
///
/// Paragraphs (separated by blank lines) are packed greedily; a paragraph
/// longer than the limit is split on sentence ends, then on word boundaries.
pub fn generate_text_chunks(
    text: &str,
    max_chunk_chars: usize,
) -> Result<Vec<String>, HealthRagError> {
    if text.trim().is_empty() {
        return Err(HealthRagError::InvalidInput(
            "Empty text provided".to_string(),
        ));
    }
    if max_chunk_chars == 0 {
        return Err(HealthRagError::InvalidInput(
            "Chunk size must be greater than zero".to_string(),
        ));
    }

    let mut pieces = Vec::new();
    for paragraph in split_paragraphs(text) {
        if paragraph.chars().count() <= max_chunk_chars {
            pieces.push(paragraph);
        } else {
            pieces.extend(split_long_paragraph(&paragraph, max_chunk_chars));
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        let needed = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + 2 + piece.chars().count()
        };
        if needed > max_chunk_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// Paragraphs separated by blank lines, with inner whitespace normalized
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(sanitize_text(&current.join(" ")));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(sanitize_text(&current.join(" ")));
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs
}

fn split_long_paragraph(paragraph: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for sentence in paragraph.split_inclusive(['.', '!', '?']) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        let mut sentence = sentence.to_string();
        while sentence.chars().count() > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            let head = smart_truncate_text(&sentence, max_chars);
            sentence = sentence[head.len()..].trim_start().to_string();
            parts.push(head);
        }
        if sentence.is_empty() {
            continue;
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + sentence.chars().count();
        if needed > max_chars && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts
}
